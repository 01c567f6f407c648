//! Validation command for themes, layouts and generation metadata.

use clap::Args;
use serde::Serialize;
use serde_json::Value;
use std::path::{Path, PathBuf};

use crate::cli::common::{load_project_config, CliError, CliResult};
use crate::models::Theme;
use crate::parser::kle::parse_layout_file;
use crate::schema::{validate_layout, validate_metadata_value, validate_theme_value, ValidationReport};

/// Validate theme, layout and metadata files
#[derive(Debug, Clone, Args)]
pub struct ValidateArgs {
    /// Theme file; also supplies the palette for --layout (default: paths.default_theme)
    #[arg(long, value_name = "FILE")]
    pub theme: Option<PathBuf>,

    /// KLE layout file
    #[arg(long, value_name = "FILE")]
    pub layout: Option<PathBuf>,

    /// Generation metadata file
    #[arg(long, value_name = "FILE")]
    pub metadata: Option<PathBuf>,

    /// Output results as JSON
    #[arg(long)]
    pub json: bool,

    /// Treat warnings as errors (exit non-zero)
    #[arg(long)]
    pub strict: bool,
}

/// Validation outcome of one document.
#[derive(Debug, Serialize)]
struct DocumentResult {
    document: String,
    kind: &'static str,
    valid: bool,
    errors: Vec<ValidationMessage>,
    warnings: Vec<String>,
}

#[derive(Debug, Serialize)]
struct ValidationMessage {
    field: String,
    kind: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    suggestion: Option<String>,
}

#[derive(Debug, Serialize)]
struct ValidationResponse {
    valid: bool,
    documents: Vec<DocumentResult>,
}

impl DocumentResult {
    fn new(path: &Path, kind: &'static str, report: &ValidationReport) -> Self {
        Self {
            document: path.display().to_string(),
            kind,
            valid: report.is_valid(),
            errors: report
                .errors
                .iter()
                .map(|e| ValidationMessage {
                    field: e.field.clone(),
                    kind: e.kind.to_string(),
                    message: e.message.clone(),
                    suggestion: e.suggestion.clone(),
                })
                .collect(),
            warnings: report.warnings.iter().map(ToString::to_string).collect(),
        }
    }
}

impl ValidateArgs {
    /// Execute the validate command
    pub fn execute(&self) -> CliResult<()> {
        if self.theme.is_none() && self.layout.is_none() && self.metadata.is_none() {
            return Err(CliError::validation(
                "At least one document must be specified: --theme, --layout or --metadata",
            ));
        }

        let mut documents = Vec::new();

        let theme_path = match (&self.theme, &self.layout) {
            (Some(path), _) => Some(path.clone()),
            (None, Some(_)) => Some(load_project_config()?.default_theme()),
            (None, None) => None,
        };

        let mut theme = None;
        if let Some(path) = &theme_path {
            let value = read_json5(path, "theme")?;
            let report = validate_theme_value(&value);
            if report.is_valid() {
                theme = Theme::from_value(&value, &path.display().to_string()).ok();
            }
            documents.push(DocumentResult::new(path, "theme", &report));
        }

        if let Some(path) = &self.layout {
            let keyboard = parse_layout_file(path)
                .map_err(|e| CliError::validation(format!("Invalid layout: {e:#}")))?;
            match &theme {
                Some(theme) => {
                    let report = validate_layout(&keyboard, &theme.palette);
                    documents.push(DocumentResult::new(path, "layout", &report));
                }
                None => tracing::warn!(
                    "Skipping layout color checks for {}: the theme is invalid",
                    path.display()
                ),
            }
        }

        if let Some(path) = &self.metadata {
            let value = read_json5(path, "metadata")?;
            let report = validate_metadata_value(&value);
            documents.push(DocumentResult::new(path, "metadata", &report));
        }

        let response = ValidationResponse {
            valid: documents.iter().all(|d| d.valid),
            documents,
        };

        if self.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&response)
                    .map_err(|e| CliError::io(format!("Failed to serialize JSON: {e}")))?
            );
        } else {
            print_human_readable(&response);
        }

        if !response.valid {
            return Err(CliError::validation("Validation failed"));
        }

        if self.strict && response.documents.iter().any(|d| !d.warnings.is_empty()) {
            return Err(CliError::validation("Warnings found in strict mode"));
        }

        Ok(())
    }
}

fn read_json5(path: &Path, kind: &str) -> CliResult<Value> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| CliError::io(format!("Failed to read {kind} file {}: {e}", path.display())))?;
    json5::from_str(&content)
        .map_err(|e| CliError::validation(format!("Failed to parse {kind} file {}: {e}", path.display())))
}

fn print_human_readable(response: &ValidationResponse) {
    for document in &response.documents {
        if document.valid {
            println!("✓ {} ({}) is valid", document.document, document.kind);
        } else {
            println!("✗ {} ({}) is invalid", document.document, document.kind);
        }

        for error in &document.errors {
            if error.field.is_empty() {
                println!("  ✗ {}: {}", error.kind, error.message);
            } else {
                println!("  ✗ [{}] {}: {}", error.field, error.kind, error.message);
            }
            if let Some(suggestion) = &error.suggestion {
                println!("    → {suggestion}");
            }
        }
        for warning in &document.warnings {
            println!("  ⚠ {warning}");
        }
    }
}
