//! Layout validation against a theme palette.

use super::{ValidationError, ValidationErrorKind, ValidationReport, ValidationWarning};
use crate::keycap::info::{parse_color_mappings, ForegroundSpec};
use crate::models::{Key, Keyboard, Palette};

/// Validates every key of a layout for use with a palette.
///
/// Errors: a key that isn't 1u in either dimension, or whose keycap color
/// isn't a palette name. Warnings: foreground colors the palette doesn't
/// declare (they render hidden) and keys without a central legend.
#[must_use]
pub fn validate_layout(keyboard: &Keyboard, palette: &Palette) -> ValidationReport {
    let mut report = ValidationReport::new();

    if keyboard.keys.is_empty() {
        report.add_warning(ValidationWarning::new("layout contains no keys"));
    }

    for (index, key) in keyboard.keys.iter().enumerate() {
        validate_key(index, key, palette, &mut report);
    }

    report
}

fn validate_key(index: usize, key: &Key, palette: &Palette, report: &mut ValidationReport) {
    let field = |name: &str| format!("keys[{index}].{name}");

    if key.geometry().is_none() {
        report.add_error(
            ValidationError::new(
                ValidationErrorKind::UnsupportedKeySize,
                field("size"),
                format!(
                    "key '{}' is {}x{}u; one dimension must be 1u",
                    key.center_label(),
                    key.width,
                    key.height
                ),
            )
            .with_suggestion("Split the key or set its width or height to 1"),
        );
    }

    if !palette.contains(&key.color) {
        report.add_error(
            ValidationError::new(
                ValidationErrorKind::UnknownColor,
                field("color"),
                format!("keycap color '{}' is not part of the theme palette", key.color),
            )
            .with_suggestion(format!(
                "Use one of: {}",
                palette.names().collect::<Vec<_>>().join(", ")
            )),
        );
    }

    match parse_color_mappings(&key.default_text_color) {
        ForegroundSpec::Mappings(mappings) => {
            for (from, to) in mappings {
                if from.is_empty() || to.is_empty() {
                    report.add_error(ValidationError::new(
                        ValidationErrorKind::InvalidValue,
                        field("text_color"),
                        format!("color mapping '{from}->{to}' has an empty side"),
                    ));
                }
            }
        }
        ForegroundSpec::Named(name) if !palette.contains(&name) => {
            report.add_warning(ValidationWarning::new(format!(
                "key {index} ('{}'): foreground color '{name}' is not in the palette and will be hidden",
                key.center_label()
            )));
        }
        ForegroundSpec::Named(_) | ForegroundSpec::Default => {}
    }

    if key.center_label().is_empty() {
        report.add_warning(ValidationWarning::new(format!(
            "key {index} at ({}, {}) has no central legend",
            key.x, key.y
        )));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Paint, RgbColor};

    fn palette() -> Palette {
        Palette::from_entries([
            ("bg_main", Paint::Color(RgbColor::new(255, 255, 255))),
            ("fg_main", Paint::Color(RgbColor::new(0, 0, 0))),
        ])
    }

    fn key(label: &str) -> Key {
        let mut key = Key {
            color: "bg_main".to_string(),
            ..Key::default()
        };
        key.labels[crate::models::layout::CENTER_LABEL] = label.to_string();
        key
    }

    #[test]
    fn test_valid_layout() {
        let keyboard = Keyboard {
            keys: vec![key("A"), key("[esc]")],
            ..Keyboard::default()
        };
        let report = validate_layout(&keyboard, &palette());
        assert!(report.is_valid());
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn test_unknown_keycap_color() {
        let mut k = key("A");
        k.color = "#cccccc".to_string();
        let keyboard = Keyboard {
            keys: vec![k],
            ..Keyboard::default()
        };
        let report = validate_layout(&keyboard, &palette());
        assert!(report.has_error_for("keys[0].color"));
    }

    #[test]
    fn test_square_non_unit_key() {
        let mut k = key("A");
        k.width = 2.0;
        k.height = 2.0;
        let keyboard = Keyboard {
            keys: vec![key("B"), k],
            ..Keyboard::default()
        };
        let report = validate_layout(&keyboard, &palette());
        assert!(report.has_error_for("keys[1].size"));
    }

    #[test]
    fn test_unknown_foreground_is_warning() {
        let mut k = key("A");
        k.default_text_color = "fg_7".to_string();
        let keyboard = Keyboard {
            keys: vec![k],
            ..Keyboard::default()
        };
        let report = validate_layout(&keyboard, &palette());
        assert!(report.is_valid());
        assert_eq!(report.warnings.len(), 1);
    }
}
