//! Per-key rendering inputs derived from a layout key.

use anyhow::{bail, Result};
use indexmap::IndexMap;

use crate::models::{Key, KeycapGeometry, Orientation, Palette, Vec2};

/// How a key's KLE text color (`t`) is interpreted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ForegroundSpec {
    /// `#000000`: use the theme's default foreground.
    Default,
    /// A palette color name for the generated text icon.
    Named(String),
    /// `a->b;c->d`: color references in the icon to swap.
    Mappings(Vec<(String, String)>),
}

/// Interprets a KLE text color.
///
/// A value containing `->` is a `;`-separated list of `old->new` pairs.
/// Pure black is KLE's default and selects the theme foreground; anything
/// else names a palette color.
///
/// # Examples
///
/// ```
/// use kittencaps::keycap::info::{parse_color_mappings, ForegroundSpec};
///
/// assert_eq!(parse_color_mappings("#000000"), ForegroundSpec::Default);
/// assert_eq!(parse_color_mappings("fg_2"), ForegroundSpec::Named("fg_2".into()));
/// assert_eq!(
///     parse_color_mappings("fg_main->fg_1"),
///     ForegroundSpec::Mappings(vec![("fg_main".into(), "fg_1".into())])
/// );
/// ```
#[must_use]
pub fn parse_color_mappings(text_color: &str) -> ForegroundSpec {
    if text_color.contains("->") {
        let mappings = text_color
            .split(';')
            .map(|pair| match pair.split_once("->") {
                Some((from, to)) => (from.trim().to_string(), to.trim().to_string()),
                None => (pair.trim().to_string(), String::new()),
            })
            .collect();
        ForegroundSpec::Mappings(mappings)
    } else if text_color == Key::DEFAULT_TEXT_COLOR {
        ForegroundSpec::Default
    } else {
        ForegroundSpec::Named(text_color.to_string())
    }
}

/// Everything the keycap factory needs to know about one key.
#[derive(Debug, Clone, PartialEq)]
pub struct KeycapInfo {
    /// Central legend: `[name]` selects an icon file, anything else is text
    pub icon_id: String,
    /// Size class
    pub geometry: KeycapGeometry,
    /// Keycap color name
    pub color: String,
    /// `#old` → `#new` replacements applied to the icon's attributes
    pub color_mappings: IndexMap<String, String>,
    /// Text color for generated icons; `None` uses the theme default
    pub foreground_color: Option<String>,
}

impl KeycapInfo {
    /// Derives the rendering inputs for `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the key isn't 1u in either dimension, its color
    /// isn't a palette name, or its color mappings are malformed.
    pub fn from_key(key: &Key, palette: &Palette) -> Result<Self> {
        let Some(geometry) = key.geometry() else {
            bail!(
                "Key '{}' is not 1u in either width or height, given key dimensions: ({}, {})",
                key.center_label(),
                key.width,
                key.height
            );
        };

        if !palette.contains(&key.color) {
            bail!(
                "Key '{}' uses the unknown keycap color '{}'",
                key.center_label(),
                key.color
            );
        }

        let (color_mappings, foreground_color) = match parse_color_mappings(&key.default_text_color) {
            ForegroundSpec::Mappings(pairs) => {
                let mut mappings = IndexMap::new();
                for (from, to) in pairs {
                    if from.is_empty() || to.is_empty() {
                        bail!(
                            "Key '{}' has a malformed color mapping '{}'",
                            key.center_label(),
                            key.default_text_color
                        );
                    }
                    mappings.insert(format!("#{from}"), format!("#{to}"));
                }
                (mappings, None)
            }
            ForegroundSpec::Named(name) => (IndexMap::new(), Some(name)),
            ForegroundSpec::Default => (IndexMap::new(), None),
        };

        Ok(Self {
            icon_id: key.center_label().to_string(),
            geometry,
            color: key.color.clone(),
            color_mappings,
            foreground_color,
        })
    }

    /// Width and height in u.
    #[must_use]
    pub fn size(&self) -> Vec2 {
        self.geometry.size()
    }

    /// Returns true for keys taller than they are wide.
    #[must_use]
    pub fn is_vertical(&self) -> bool {
        self.geometry.orientation == Orientation::Vertical
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Paint, RgbColor};

    fn palette() -> Palette {
        Palette::from_entries([
            ("bg_main", Paint::Color(RgbColor::new(0xee, 0xee, 0xee))),
            ("fg_main", Paint::Color(RgbColor::new(0x11, 0x11, 0x11))),
        ])
    }

    fn key(label: &str, color: &str, text_color: &str) -> Key {
        let mut key = Key {
            color: color.to_string(),
            default_text_color: text_color.to_string(),
            ..Key::default()
        };
        key.labels[4] = label.to_string();
        key
    }

    #[test]
    fn test_parse_multiple_mappings() {
        assert_eq!(
            parse_color_mappings("fg_main->fg_1;bg_main->fg_2"),
            ForegroundSpec::Mappings(vec![
                ("fg_main".into(), "fg_1".into()),
                ("bg_main".into(), "fg_2".into()),
            ])
        );
        assert_eq!(
            parse_color_mappings("a->b;c"),
            ForegroundSpec::Mappings(vec![("a".into(), "b".into()), ("c".into(), String::new())])
        );
    }

    #[test]
    fn test_from_key() {
        let info = KeycapInfo::from_key(&key("[esc]", "bg_main", "fg_main->bg_main"), &palette()).unwrap();
        assert_eq!(info.icon_id, "[esc]");
        assert_eq!(info.color_mappings.get("#fg_main").map(String::as_str), Some("#bg_main"));
        assert_eq!(info.foreground_color, None);
        assert!(!info.is_vertical());

        let info = KeycapInfo::from_key(&key("A", "bg_main", "fg_main"), &palette()).unwrap();
        assert_eq!(info.foreground_color.as_deref(), Some("fg_main"));
        assert!(info.color_mappings.is_empty());
    }

    #[test]
    fn test_from_key_rejects_bad_keys() {
        let err = KeycapInfo::from_key(&key("A", "nope", "#000000"), &palette()).unwrap_err();
        assert!(err.to_string().contains("nope"));

        let mut big = key("A", "bg_main", "#000000");
        big.width = 2.0;
        big.height = 2.0;
        assert!(KeycapInfo::from_key(&big, &palette()).is_err());

        assert!(KeycapInfo::from_key(&key("A", "bg_main", "a->"), &palette()).is_err());
    }

    #[test]
    fn test_vertical_key() {
        let mut tall = key("Enter", "bg_main", "#000000");
        tall.height = 2.0;
        let info = KeycapInfo::from_key(&tall, &palette()).unwrap();
        assert!(info.is_vertical());
        assert_eq!(info.size(), Vec2::new(1.0, 2.0));
    }
}
