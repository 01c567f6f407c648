//! Collecting the definitions an imported fragment depends on.

use std::collections::HashSet;

use super::element::Element;
use super::referenced_ids;

/// Definitions pulled out of source documents, deduplicated by id.
#[derive(Debug, Clone, Default)]
pub struct DefsSet {
    skipped_ids: HashSet<String>,
    seen_ids: HashSet<String>,
    defs: Vec<Element>,
}

impl DefsSet {
    /// Creates a set that never extracts the given ids (e.g. palette swatches,
    /// which the composed document provides itself).
    pub fn new(skipped_ids: impl IntoIterator<Item = String>) -> Self {
        Self {
            skipped_ids: skipped_ids.into_iter().collect(),
            ..Self::default()
        }
    }

    /// Copies every element that `fragment` references (directly or through
    /// other copied elements) out of `document`.
    ///
    /// References that resolve inside the fragment itself, skipped ids and
    /// ids that `document` doesn't define are ignored.
    pub fn extract_references(&mut self, fragment: &Element, document: &Element) {
        let mut pending: Vec<String> = referenced_ids(fragment).into_iter().collect();

        while let Some(id) = pending.pop() {
            if self.skipped_ids.contains(&id)
                || self.seen_ids.contains(&id)
                || fragment.find_by_id(&id).is_some()
            {
                continue;
            }
            let Some(definition) = document.find_by_id(&id) else {
                continue;
            };

            self.seen_ids.insert(id);
            pending.extend(referenced_ids(definition));
            self.defs.push(definition.clone());
        }
    }

    /// Extracted definitions in extraction order.
    pub fn defs(&self) -> &[Element] {
        &self.defs
    }

    /// Returns true if nothing was extracted.
    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn document() -> Element {
        Element::parse(
            r##"<svg xmlns="http://www.w3.org/2000/svg" xmlns:xlink="http://www.w3.org/1999/xlink">
  <defs>
    <linearGradient id="fg_main"/>
    <linearGradient id="shine" xlink:href="#base"/>
    <linearGradient id="base"/>
    <clipPath id="unused"/>
  </defs>
  <svg id="icon">
    <path fill="url(#shine)" stroke="url(#fg_main)"/>
    <circle id="local"/>
    <use href="#local"/>
  </svg>
</svg>"##,
        )
        .unwrap()
    }

    #[test]
    fn test_extracts_transitive_references() {
        let document = document();
        let icon = document.find_by_id("icon").unwrap();
        let mut defs = DefsSet::new(["fg_main".to_string()]);
        defs.extract_references(icon, &document);

        let mut ids: Vec<_> = defs.defs().iter().filter_map(Element::id).collect();
        ids.sort_unstable();
        assert_eq!(ids, ["base", "shine"]);
    }

    #[test]
    fn test_extraction_is_deduplicated() {
        let document = document();
        let icon = document.find_by_id("icon").unwrap();
        let mut defs = DefsSet::new(Vec::new());
        defs.extract_references(icon, &document);
        defs.extract_references(icon, &document);
        assert_eq!(defs.defs().len(), 3);
    }
}
