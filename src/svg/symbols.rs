//! Keycap frame templates.
//!
//! The templates file holds one `<symbol id="_<size>u-top">` per keycap size
//! (the outline of the top surface, drawn in a `-50 -50 100 100` view box)
//! plus shared `<style>` and `<filter>` elements that composed documents
//! copy verbatim.

use anyhow::{Context, Result};
use indexmap::IndexMap;
use std::path::Path;

use super::element::Element;
use crate::models::KeycapGeometry;

/// Symbols, styles and filters read from a templates document.
#[derive(Debug, Clone, Default)]
pub struct SymbolSet {
    symbols: IndexMap<String, Element>,
    styles: Vec<Element>,
    filters: Vec<Element>,
}

impl SymbolSet {
    /// Loads a templates file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file can't be read or parsed.
    pub fn load_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .context(format!("Failed to read templates file: {}", path.display()))?;
        Self::parse(&content).context(format!("Invalid templates file: {}", path.display()))
    }

    /// Parses a templates document.
    ///
    /// Symbols, styles and filters are collected from the root and from its
    /// `<defs>` children.
    ///
    /// # Errors
    ///
    /// Returns an error if the XML is malformed or a symbol has no id.
    pub fn parse(content: &str) -> Result<Self> {
        let root = Element::parse(content)?;
        let mut set = Self::default();

        let top_level = root.elements().flat_map(|element| {
            if element.name == "defs" {
                element.elements().collect::<Vec<_>>()
            } else {
                vec![element]
            }
        });

        for element in top_level {
            match element.name.as_str() {
                "symbol" => {
                    let id = element.id().context("Template <symbol> without an id")?;
                    set.symbols.insert(id.to_string(), element.clone());
                }
                "style" => set.styles.push(element.clone()),
                "filter" => set.filters.push(element.clone()),
                _ => {}
            }
        }

        Ok(set)
    }

    /// Looks up a symbol by id.
    pub fn get(&self, id: &str) -> Option<&Element> {
        self.symbols.get(id)
    }

    /// Returns true if a symbol with this id exists.
    pub fn contains(&self, id: &str) -> bool {
        self.symbols.contains_key(id)
    }

    /// Id of the top-surface symbol for a geometry, e.g. `_1.5u-top`.
    pub fn top_surface_id(geometry: &KeycapGeometry) -> String {
        format!("_{}-top", geometry.size_u())
    }

    /// The outline `<path>` of the top surface for `geometry`, cloned.
    ///
    /// # Errors
    ///
    /// Returns an error if the symbol is missing or has no path.
    pub fn top_surface_path(&self, geometry: &KeycapGeometry) -> Result<Element> {
        let id = Self::top_surface_id(geometry);
        let symbol = self.get(&id).with_context(|| {
            format!(
                "The templates file has no entry for {} keys: could not find symbol element with id '{id}'",
                geometry.size_u()
            )
        })?;

        let mut path = None;
        symbol.visit(&mut |element| {
            if path.is_none() && element.name == "path" {
                path = Some(element.clone());
            }
        });
        path.with_context(|| format!("Template symbol '{id}' has no <path> element"))
    }

    /// Elements a composed document copies: styles, symbols, then filters.
    pub fn document_elements(&self) -> impl Iterator<Item = &Element> {
        self.styles
            .iter()
            .chain(self.symbols.values())
            .chain(self.filters.iter())
    }

    /// Number of symbols.
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    /// Returns true if no symbols were found.
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}
