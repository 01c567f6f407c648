//! Generation metadata validation.

use serde_json::Value;

use super::{field_path, ValidationError, ValidationErrorKind, ValidationReport};

const SCALE_FIELDS: &[&str] = &[
    "preview_scale",
    "texture_scale",
    "print_outlined_scale",
    "print_scale",
    "overview_scale",
];

/// Validates a parsed `metadata.json5` document.
#[must_use]
pub fn validate_metadata_value(value: &Value) -> ValidationReport {
    let mut report = ValidationReport::new();

    let Some(object) = value.as_object() else {
        report.add_error(ValidationError::new(
            ValidationErrorKind::InvalidType,
            "",
            "metadata must be a JSON object",
        ));
        return report;
    };

    for field in ["layout_path", "theme_path"] {
        match object.get(field) {
            Some(Value::String(_)) => {}
            Some(_) => report.add_error(ValidationError::new(
                ValidationErrorKind::InvalidType,
                field,
                "expected a path string",
            )),
            None => report.add_error(ValidationError::new(
                ValidationErrorKind::MissingField,
                field,
                "required field is missing",
            )),
        }
    }

    match object.get("args") {
        None => report.add_error(ValidationError::new(
            ValidationErrorKind::MissingField,
            "args",
            "required field is missing",
        )),
        Some(Value::Object(args)) => {
            for field in SCALE_FIELDS {
                match args.get(*field) {
                    None | Some(Value::Null) => {}
                    Some(scale) => match scale.as_f64() {
                        Some(s) if s > 0.0 => {}
                        _ => report.add_error(ValidationError::new(
                            ValidationErrorKind::InvalidValue,
                            field_path("args", field),
                            "scale must be a positive number or null",
                        )),
                    },
                }
            }
        }
        Some(_) => report.add_error(ValidationError::new(
            ValidationErrorKind::InvalidType,
            "args",
            "expected an object",
        )),
    }

    report
}
