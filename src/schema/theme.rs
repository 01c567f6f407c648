//! Theme document validation.

use serde_json::Value;

use super::{field_path, ValidationError, ValidationErrorKind, ValidationReport, ValidationWarning};
use crate::models::{sp_color, RgbColor};

/// Numeric theme fields that must be positive.
const POSITIVE_NUMBERS: &[&str] = &["font_size_px", "unit_size", "base_size", "top_size"];

/// Validates a parsed theme document.
///
/// Checks that `font_family`, `font_weight`, `font_size_px`, `unit_size`,
/// `base_size`, `top_size` and `colors` are present and well typed, and that
/// every color declaration resolves.
///
/// # Examples
///
/// ```
/// use kittencaps::schema::validate_theme_value;
/// use serde_json::json;
///
/// let report = validate_theme_value(&json!({"font_weight": 400}));
/// assert!(report.has_error_for("font_family"));
/// ```
#[must_use]
pub fn validate_theme_value(value: &Value) -> ValidationReport {
    let mut report = ValidationReport::new();

    let Some(object) = value.as_object() else {
        report.add_error(ValidationError::new(
            ValidationErrorKind::InvalidType,
            "",
            "theme must be a JSON object",
        ));
        return report;
    };

    match object.get("font_family") {
        None => report.add_error(missing("font_family", "\"font_family\": \"Nunito\"")),
        Some(Value::String(family)) if family.trim().is_empty() => {
            report.add_error(ValidationError::new(
                ValidationErrorKind::InvalidValue,
                "font_family",
                "font family must not be empty",
            ));
        }
        Some(Value::String(_)) => {}
        Some(_) => report.add_error(wrong_type("font_family", "a string")),
    }

    match object.get("font_weight") {
        None => report.add_error(missing("font_weight", "\"font_weight\": 400")),
        Some(weight) => match weight.as_u64() {
            Some(1..=1000) => {}
            Some(_) => report.add_error(
                ValidationError::new(
                    ValidationErrorKind::InvalidValue,
                    "font_weight",
                    format!("font weight {weight} is out of range"),
                )
                .with_suggestion("Use a weight between 1 and 1000, e.g. 400 or 700"),
            ),
            None => report.add_error(wrong_type("font_weight", "an integer")),
        },
    }

    for field in POSITIVE_NUMBERS {
        match object.get(*field) {
            None => report.add_error(missing(field, &format!("\"{field}\": 100"))),
            Some(number) => match number.as_f64() {
                Some(n) if n > 0.0 => {}
                Some(n) => report.add_error(ValidationError::new(
                    ValidationErrorKind::InvalidValue,
                    *field,
                    format!("must be positive, got {n}"),
                )),
                None => report.add_error(wrong_type(field, "a number")),
            },
        }
    }

    match object.get("colors") {
        None => report.add_error(missing("colors", "\"colors\": {\"bg_main\": \"#ffffff\"}")),
        Some(Value::Object(colors)) => {
            if colors.is_empty() {
                report.add_warning(ValidationWarning::new("theme declares no colors"));
            }
            for (name, declaration) in colors {
                validate_color(&field_path("colors", name), declaration, &mut report);
            }
        }
        Some(_) => report.add_error(wrong_type("colors", "an object")),
    }

    report
}

fn validate_color(field: &str, declaration: &Value, report: &mut ValidationReport) {
    match declaration {
        Value::String(css) => {
            if RgbColor::from_css(css).is_err() {
                report.add_error(
                    ValidationError::new(
                        ValidationErrorKind::InvalidValue,
                        field,
                        format!("'{css}' is not a CSS color"),
                    )
                    .with_suggestion("Use a value like \"#ffcc00\", \"rgb(1, 2, 3)\" or \"white\""),
                );
            }
        }
        Value::Object(map) => {
            if let Some(code) = map.get("SPColor") {
                let sp_field = field_path(field, "SPColor");
                match code.as_str() {
                    Some(code) if sp_color::lookup(code).is_some() => {}
                    Some(code) => report.add_error(
                        ValidationError::new(
                            ValidationErrorKind::InvalidValue,
                            sp_field,
                            format!("unknown Signature Plastics color code '{code}'"),
                        )
                        .with_suggestion(format!(
                            "Known codes include {}",
                            sp_color::codes().take(5).collect::<Vec<_>>().join(", ")
                        )),
                    ),
                    None => report.add_error(wrong_type(&sp_field, "a string")),
                }
            } else if let Some(hidden) = map.get("hidden") {
                if hidden != &Value::Bool(true) {
                    report.add_error(ValidationError::new(
                        ValidationErrorKind::InvalidValue,
                        field_path(field, "hidden"),
                        "must be true",
                    ));
                }
            } else {
                report.add_error(ValidationError::new(
                    ValidationErrorKind::InvalidValue,
                    field,
                    "color object must contain \"hidden\" or \"SPColor\"",
                ));
            }
        }
        _ => report.add_error(wrong_type(field, "a color string or object")),
    }
}

fn missing(field: &str, example: &str) -> ValidationError {
    ValidationError::new(
        ValidationErrorKind::MissingField,
        field,
        "required field is missing",
    )
    .with_suggestion(format!("Add {example}"))
}

fn wrong_type(field: &str, expected: &str) -> ValidationError {
    ValidationError::new(
        ValidationErrorKind::InvalidType,
        field,
        format!("expected {expected}"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn valid_theme() -> Value {
        json!({
            "font_family": "Nunito",
            "font_weight": 400,
            "font_size_px": 40,
            "unit_size": 100,
            "base_size": 95,
            "top_size": 75,
            "colors": {
                "bg_main": {"SPColor": "WAN"},
                "fg_main": "#222222",
                "fg_1": {"hidden": true}
            }
        })
    }

    #[test]
    fn test_valid_theme() {
        let report = validate_theme_value(&valid_theme());
        assert!(report.is_valid(), "{}", report.format_message());
    }

    #[test]
    fn test_missing_font_family() {
        let mut theme = valid_theme();
        theme.as_object_mut().unwrap().remove("font_family");
        let report = validate_theme_value(&theme);
        assert!(!report.is_valid());
        assert!(report.has_error_for("font_family"));
        assert_eq!(report.errors.len(), 1);
    }

    #[test]
    fn test_unknown_sp_color_names_nested_field() {
        let mut theme = valid_theme();
        theme["colors"]["bg_main"] = json!({"SPColor": "NOPE"});
        let report = validate_theme_value(&theme);
        assert!(report.has_error_for("colors.bg_main.SPColor"));
    }

    #[test]
    fn test_reports_every_offending_field() {
        let theme = json!({
            "font_family": 12,
            "font_weight": 2000,
            "font_size_px": -1,
            "unit_size": "big",
            "base_size": 95,
            "top_size": 75,
            "colors": {"fg_main": "not a color", "fg_1": {"hidden": false}}
        });
        let report = validate_theme_value(&theme);
        for field in [
            "font_family",
            "font_weight",
            "font_size_px",
            "unit_size",
            "colors.fg_main",
            "colors.fg_1.hidden",
        ] {
            assert!(report.has_error_for(field), "no error for {field}");
        }
    }

    #[test]
    fn test_non_object_theme() {
        let report = validate_theme_value(&json!([1, 2, 3]));
        assert!(!report.is_valid());
    }
}
