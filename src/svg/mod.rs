//! SVG document model and helpers.
//!
//! Everything the toolchain writes is built as an [`Element`] tree: keycap
//! groups, icons, masks and whole documents. The helpers here apply
//! transforms, rewrite color references and find the ids a fragment uses.

pub mod builder;
pub mod defs;
pub mod element;
pub mod symbols;

pub use builder::{build_palette_defs, build_swatch, swatch_style, SvgDocumentBuilder, SvgStyleBuilder};
pub use defs::DefsSet;
pub use element::{Element, Node};
pub use symbols::SymbolSet;

use indexmap::IndexMap;
use regex::Regex;
use std::collections::BTreeSet;

use crate::models::Transform;

/// Prepends `transform` to the element's existing `transform` attribute.
pub fn apply_transform(element: &mut Element, transform: &Transform) {
    let value = transform.to_svg_value();
    let combined = match element.attr("transform") {
        Some(existing) if !existing.is_empty() => format!("{value} {existing}"),
        _ => value,
    };
    let combined = combined.trim().to_string();
    if combined.is_empty() {
        element.remove_attr("transform");
    } else {
        element.set_attr("transform", combined);
    }
}

/// Adds an Inkscape layer label.
pub fn set_label(element: &mut Element, label: &str) {
    element.set_attr("inkscape:label", label);
}

/// Replaces every occurrence of the mapping keys in all attribute values of
/// `element` and its descendants.
///
/// Replacements happen simultaneously: with `a→b` and `b→c`, an `a` becomes
/// `b`, never `c`.
pub fn replace_in_attributes(element: &mut Element, mappings: &IndexMap<String, String>) {
    if mappings.is_empty() {
        return;
    }
    let pattern = mappings
        .keys()
        .map(|key| regex::escape(key))
        .collect::<Vec<_>>()
        .join("|");
    let Ok(regex) = Regex::new(&pattern) else {
        return;
    };

    element.visit_mut(&mut |e| {
        for (_, value) in &mut e.attributes {
            if regex.is_match(value) {
                *value = regex
                    .replace_all(value, |caps: &regex::Captures<'_>| {
                        mappings.get(&caps[0]).cloned().unwrap_or_default()
                    })
                    .into_owned();
            }
        }
    });
}

/// Every id referenced from `element`'s subtree through `url(#…)`, `href`
/// or `xlink:href`.
pub fn referenced_ids(element: &Element) -> BTreeSet<String> {
    let mut ids = BTreeSet::new();
    element.visit(&mut |e| {
        for (name, value) in &e.attributes {
            if name == "href" || name == "xlink:href" {
                if let Some(id) = value.strip_prefix('#') {
                    ids.insert(id.to_string());
                }
            }
            ids.extend(url_references(value).map(str::to_string));
        }
    });
    ids
}

/// Ids named by `url(#id)` or `url("#id")` in an attribute value.
pub fn url_references(value: &str) -> impl Iterator<Item = &str> {
    value.split("url(").skip(1).filter_map(|rest| {
        let inner = rest.split(')').next()?;
        let inner = inner.trim().trim_matches(|c: char| c == '"' || c == '\'');
        inner.strip_prefix('#').filter(|id| !id.is_empty())
    })
}
