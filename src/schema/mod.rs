//! Validation of hand-written input documents.
//!
//! Themes, layouts and generation metadata are checked field by field before
//! anything is generated. Problems are collected into a [`ValidationReport`]
//! so that every offending field is reported at once; a failed report is
//! turned into a [`SchemaViolation`] error that callers can downcast to.

// Allow format! appended to String - more readable for building messages
#![allow(clippy::format_push_string)]

pub mod layout;
pub mod metadata;
pub mod theme;

pub use layout::validate_layout;
pub use metadata::validate_metadata_value;
pub use theme::validate_theme_value;

use std::fmt;

/// Validation result with specific errors and warnings.
#[derive(Debug, Clone)]
pub struct ValidationReport {
    /// Errors that prevent generation
    pub errors: Vec<ValidationError>,
    /// Non-critical warnings
    pub warnings: Vec<ValidationWarning>,
}

impl ValidationReport {
    /// Creates a new empty validation report.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// Returns true if there are no errors (warnings are allowed).
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Adds an error to the report.
    pub fn add_error(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    /// Adds a warning to the report.
    pub fn add_warning(&mut self, warning: ValidationWarning) {
        self.warnings.push(warning);
    }

    /// Returns true if any error concerns the given field path.
    #[must_use]
    pub fn has_error_for(&self, field: &str) -> bool {
        self.errors.iter().any(|e| e.field == field)
    }

    /// Formats the report as a user-friendly error message.
    #[must_use]
    pub fn format_message(&self) -> String {
        let mut message = String::new();

        if !self.errors.is_empty() {
            message.push_str(&format!("❌ {} validation errors:\n", self.errors.len()));
            for (idx, error) in self.errors.iter().enumerate() {
                message.push_str(&format!("  {}. {}\n", idx + 1, error));
            }
        }

        if !self.warnings.is_empty() {
            message.push_str(&format!("\n⚠️  {} warnings:\n", self.warnings.len()));
            for (idx, warning) in self.warnings.iter().enumerate() {
                message.push_str(&format!("  {}. {}\n", idx + 1, warning));
            }
        }

        message
    }

    /// Converts the report into an error if it contains any errors.
    pub fn into_result(self, document: impl Into<String>) -> Result<Self, SchemaViolation> {
        if self.is_valid() {
            Ok(self)
        } else {
            Err(SchemaViolation {
                document: document.into(),
                report: self,
            })
        }
    }
}

impl Default for ValidationReport {
    fn default() -> Self {
        Self::new()
    }
}

/// Validation error with context.
#[derive(Debug, Clone)]
pub struct ValidationError {
    /// Type of validation error
    pub kind: ValidationErrorKind,
    /// Dotted path of the offending field, e.g. `colors.bg_main.SPColor`
    pub field: String,
    /// Human-readable error message
    pub message: String,
    /// Optional suggestion for fixing the error
    pub suggestion: Option<String>,
}

impl ValidationError {
    /// Creates a new validation error for a field.
    pub fn new(
        kind: ValidationErrorKind,
        field: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            field: field.into(),
            message: message.into(),
            suggestion: None,
        }
    }

    /// Sets a suggestion for fixing the error.
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.field.is_empty() {
            write!(f, "{}: {}", self.kind, self.message)?;
        } else {
            write!(f, "[{}] {}: {}", self.field, self.kind, self.message)?;
        }

        if let Some(suggestion) = &self.suggestion {
            write!(f, "\n    → {suggestion}")?;
        }

        Ok(())
    }
}

/// Types of validation errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// A required field is absent
    MissingField,
    /// A field has the wrong JSON type
    InvalidType,
    /// A field has the right type but an unusable value
    InvalidValue,
    /// A color name is not part of the theme palette
    UnknownColor,
    /// A key is not 1u in either dimension
    UnsupportedKeySize,
}

impl fmt::Display for ValidationErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingField => write!(f, "Missing Field"),
            Self::InvalidType => write!(f, "Invalid Type"),
            Self::InvalidValue => write!(f, "Invalid Value"),
            Self::UnknownColor => write!(f, "Unknown Color"),
            Self::UnsupportedKeySize => write!(f, "Unsupported Key Size"),
        }
    }
}

/// Validation warning (non-blocking).
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    /// Warning message
    pub message: String,
}

impl ValidationWarning {
    /// Creates a new validation warning
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

/// A document failed validation.
///
/// Carried inside `anyhow::Error`; recover it with `downcast_ref`.
#[derive(Debug, Clone)]
pub struct SchemaViolation {
    /// Which document was being validated (usually its path)
    pub document: String,
    /// The failed report
    pub report: ValidationReport,
}

impl fmt::Display for SchemaViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} is invalid:\n{}",
            self.document,
            self.report.format_message().trim_end()
        )
    }
}

impl std::error::Error for SchemaViolation {}

/// Joins a parent field path and a child key.
pub(crate) fn field_path(parent: &str, child: &str) -> String {
    if parent.is_empty() {
        child.to_string()
    } else {
        format!("{parent}.{child}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_report_is_valid() {
        let report = ValidationReport::new();
        assert!(report.is_valid());
        assert!(report.format_message().is_empty());
        assert!(report.into_result("theme.json").is_ok());
    }

    #[test]
    fn test_failed_report_becomes_violation() {
        let mut report = ValidationReport::new();
        report.add_error(
            ValidationError::new(
                ValidationErrorKind::MissingField,
                "font_family",
                "required field is missing",
            )
            .with_suggestion("Add \"font_family\": \"Nunito\""),
        );
        report.add_warning(ValidationWarning::new("unused color 'bg_x'"));

        assert!(report.has_error_for("font_family"));
        let violation = report.into_result("theme.json").unwrap_err();
        let text = violation.to_string();
        assert!(text.contains("theme.json is invalid"));
        assert!(text.contains("[font_family] Missing Field"));
        assert!(text.contains("→ Add"));
        assert!(text.contains("1 warnings"));
    }

    #[test]
    fn test_violation_survives_anyhow_downcast() {
        let mut report = ValidationReport::new();
        report.add_error(ValidationError::new(
            ValidationErrorKind::InvalidType,
            "unit_size",
            "expected a number",
        ));
        let err: anyhow::Error = report.into_result("t.json").unwrap_err().into();
        let err = err.context("Failed to load theme");
        let violation = err.downcast_ref::<SchemaViolation>().unwrap();
        assert!(violation.report.has_error_for("unit_size"));
    }

    #[test]
    fn test_field_path() {
        assert_eq!(field_path("", "colors"), "colors");
        assert_eq!(field_path("colors", "bg_main"), "colors.bg_main");
    }
}
