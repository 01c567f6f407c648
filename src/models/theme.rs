//! Visual theme: font settings, keycap dimensions and the color palette.

use anyhow::{Context, Result};
use indexmap::IndexMap;
use serde_json::Value;
use std::path::Path;

use super::rgb::RgbColor;
use super::sp_color;
use crate::schema::{self, SchemaViolation};

/// A resolved palette entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Paint {
    /// A concrete sRGB color
    Color(RgbColor),
    /// Declared `{"hidden": true}`, or looked up but never declared
    Hidden,
}

impl Paint {
    /// Resolves a single color declaration.
    ///
    /// Accepts a CSS color string, `{"hidden": true}` or `{"SPColor": "<code>"}`.
    ///
    /// # Errors
    ///
    /// Returns an error for anything else, including unknown SP codes.
    pub fn from_declaration(declaration: &Value) -> Result<Self> {
        match declaration {
            Value::String(css) => Ok(Self::Color(RgbColor::from_css(css)?)),
            Value::Object(map) => {
                if let Some(code) = map.get("SPColor") {
                    let code = code
                        .as_str()
                        .context("SPColor code must be a string")?;
                    let color = sp_color::lookup(code)
                        .with_context(|| format!("Unknown Signature Plastics color code '{code}'"))?;
                    Ok(Self::Color(color))
                } else if map.get("hidden") == Some(&Value::Bool(true)) {
                    Ok(Self::Hidden)
                } else {
                    anyhow::bail!(
                        "Color object must be {{\"hidden\": true}} or {{\"SPColor\": \"<code>\"}}"
                    )
                }
            }
            other => anyhow::bail!("Expected a color string or object, got {other}"),
        }
    }

    /// CSS value: `#RRGGBB`, or `none` when hidden.
    #[must_use]
    pub fn css_value(&self) -> String {
        match self {
            Self::Color(color) => color.to_hex(),
            Self::Hidden => "none".to_string(),
        }
    }

    /// Returns true for the hidden sentinel.
    #[must_use]
    pub const fn is_hidden(&self) -> bool {
        matches!(self, Self::Hidden)
    }
}

/// Insertion-ordered map from symbolic color name to paint.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Palette {
    colors: IndexMap<String, Paint>,
}

impl Palette {
    /// Resolves every declaration of a theme's `colors` object.
    ///
    /// # Errors
    ///
    /// Returns an error naming the first color that fails to resolve.
    pub fn resolve(declarations: &serde_json::Map<String, Value>) -> Result<Self> {
        let mut colors = IndexMap::with_capacity(declarations.len());
        for (name, declaration) in declarations {
            let paint = Paint::from_declaration(declaration)
                .with_context(|| format!("Failed to resolve color '{name}'"))?;
            colors.insert(name.clone(), paint);
        }
        Ok(Self { colors })
    }

    /// Builds a palette from already resolved entries.
    pub fn from_entries<N: Into<String>>(entries: impl IntoIterator<Item = (N, Paint)>) -> Self {
        Self {
            colors: entries.into_iter().map(|(n, p)| (n.into(), p)).collect(),
        }
    }

    /// Looks up a color by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Paint> {
        self.colors.get(name).copied()
    }

    /// Looks up a color by name; undeclared names resolve to [`Paint::Hidden`].
    #[must_use]
    pub fn paint_or_hidden(&self, name: &str) -> Paint {
        self.get(name).unwrap_or(Paint::Hidden)
    }

    /// CSS value of a color; undeclared names yield `none`.
    #[must_use]
    pub fn css_value(&self, name: &str) -> String {
        self.paint_or_hidden(name).css_value()
    }

    /// Returns true if `name` is declared.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.colors.contains_key(name)
    }

    /// Color names in declaration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.colors.keys().map(String::as_str)
    }

    /// All entries in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Paint)> {
        self.colors.iter().map(|(n, p)| (n.as_str(), *p))
    }

    /// Keycap (plastic) colors: the names starting with `bg_`.
    pub fn keycap_colors(&self) -> impl Iterator<Item = (&str, Paint)> {
        self.iter().filter(|(name, _)| name.starts_with("bg_"))
    }

    /// Every entry mapped to its CSS value, in declaration order.
    #[must_use]
    pub fn css_colors(&self) -> IndexMap<String, String> {
        self.colors
            .iter()
            .map(|(name, paint)| (name.clone(), paint.css_value()))
            .collect()
    }

    /// Number of declared colors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.colors.len()
    }

    /// Returns true if no colors are declared.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }
}

/// A validated theme.
#[derive(Debug, Clone, PartialEq)]
pub struct Theme {
    /// Font family used for text labels
    pub font_family: String,
    /// Default font weight (1..=1000)
    pub font_weight: u16,
    /// Label font size in px at 1u = 100px
    pub font_size_px: f64,
    /// Side length of one unit in px
    pub unit_size: f64,
    /// Side length of a keycap's base in px
    pub base_size: f64,
    /// Side length of a keycap's top surface in px
    pub top_size: f64,
    /// Named colors
    pub palette: Palette,
}

impl Theme {
    /// Loads, validates and resolves a theme file (JSON or JSON5).
    ///
    /// # Errors
    ///
    /// Returns an error if the file can't be read or parsed. Validation
    /// failures carry a [`SchemaViolation`] naming every offending field.
    pub fn load_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .context(format!("Failed to read theme file: {}", path.display()))?;
        let value: Value = json5::from_str(&content)
            .context(format!("Failed to parse theme file: {}", path.display()))?;
        Self::from_value(&value, &path.display().to_string())
    }

    /// Validates and resolves an already parsed theme document.
    ///
    /// `document` names the source in error messages.
    ///
    /// # Errors
    ///
    /// Returns a [`SchemaViolation`] if the document fails validation.
    pub fn from_value(value: &Value, document: &str) -> Result<Self> {
        let report = schema::validate_theme_value(value);
        for warning in &report.warnings {
            tracing::warn!("{}: {}", document, warning);
        }
        report.into_result(document)?;

        // Validation guarantees the shape below.
        let object = value.as_object().ok_or_else(|| invalid(document))?;
        let number = |field: &str| -> Result<f64> {
            object
                .get(field)
                .and_then(Value::as_f64)
                .ok_or_else(|| invalid(document))
        };

        let font_weight = object
            .get("font_weight")
            .and_then(Value::as_u64)
            .and_then(|w| u16::try_from(w).ok())
            .ok_or_else(|| invalid(document))?;
        let colors = object
            .get("colors")
            .and_then(Value::as_object)
            .ok_or_else(|| invalid(document))?;

        Ok(Self {
            font_family: object
                .get("font_family")
                .and_then(Value::as_str)
                .ok_or_else(|| invalid(document))?
                .to_string(),
            font_weight,
            font_size_px: number("font_size_px")?,
            unit_size: number("unit_size")?,
            base_size: number("base_size")?,
            top_size: number("top_size")?,
            palette: Palette::resolve(colors)?,
        })
    }
}

fn invalid(document: &str) -> anyhow::Error {
    anyhow::anyhow!("Theme {document} changed shape after validation")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_theme() -> Value {
        json!({
            "font_family": "Nunito",
            "font_weight": 700,
            "font_size_px": 40,
            "unit_size": 100,
            "base_size": 95,
            "top_size": 75,
            "colors": {
                "bg_main": {"SPColor": "WAN"},
                "bg_accent": "#ff8800",
                "fg_main": "black",
                "outline_frame": {"hidden": true}
            }
        })
    }

    #[test]
    fn test_from_value_resolves_palette() {
        let theme = Theme::from_value(&sample_theme(), "sample").unwrap();
        assert_eq!(theme.font_family, "Nunito");
        assert_eq!(theme.font_weight, 700);
        assert_eq!(theme.palette.len(), 4);
        assert_eq!(
            theme.palette.get("bg_accent"),
            Some(Paint::Color(RgbColor::new(0xff, 0x88, 0x00)))
        );
        assert_eq!(theme.palette.get("outline_frame"), Some(Paint::Hidden));
        assert!(matches!(theme.palette.get("bg_main"), Some(Paint::Color(_))));
    }

    #[test]
    fn test_palette_keeps_declaration_order() {
        let theme = Theme::from_value(&sample_theme(), "sample").unwrap();
        let names: Vec<_> = theme.palette.names().collect();
        assert_eq!(names, ["bg_main", "bg_accent", "fg_main", "outline_frame"]);
        let keycap: Vec<_> = theme.palette.keycap_colors().map(|(n, _)| n).collect();
        assert_eq!(keycap, ["bg_main", "bg_accent"]);
    }

    #[test]
    fn test_undeclared_color_is_hidden() {
        let theme = Theme::from_value(&sample_theme(), "sample").unwrap();
        assert_eq!(theme.palette.paint_or_hidden("fg_9"), Paint::Hidden);
        assert_eq!(theme.palette.css_value("fg_9"), "none");
        assert_eq!(theme.palette.css_value("fg_main"), "#000000");
    }

    #[test]
    fn test_missing_font_family_is_schema_violation() {
        let mut value = sample_theme();
        value.as_object_mut().unwrap().remove("font_family");
        let err = Theme::from_value(&value, "broken.json").unwrap_err();
        let violation = err.downcast_ref::<SchemaViolation>().unwrap();
        assert!(violation.report.has_error_for("font_family"));
    }

    #[test]
    fn test_paint_declarations() {
        assert_eq!(
            Paint::from_declaration(&json!({"hidden": true})).unwrap(),
            Paint::Hidden
        );
        assert!(Paint::from_declaration(&json!({"SPColor": "NOPE"})).is_err());
        assert!(Paint::from_declaration(&json!({"hidden": false})).is_err());
        assert!(Paint::from_declaration(&json!(42)).is_err());
    }
}
