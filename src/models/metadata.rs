//! Generation metadata written next to every generated keycap set.
//!
//! The record says which layout and theme produced the outputs and with
//! which scale arguments, so an archive can later be rebuilt from it.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::layout::Keyboard;
use crate::schema;

/// File name of the metadata record inside an output directory.
pub const METADATA_FILE_NAME: &str = "metadata.json5";

/// Render scale overrides, each optional.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ScaleArgs {
    /// Scale of `preview.png`
    #[serde(default)]
    pub preview_scale: Option<f64>,
    /// Scale of `texture.png`
    #[serde(default)]
    pub texture_scale: Option<f64>,
    /// Scale of `print-outlined.png`
    #[serde(default)]
    pub print_outlined_scale: Option<f64>,
    /// Scale of `print.png`
    #[serde(default)]
    pub print_scale: Option<f64>,
    /// Scale of the archive's `overview.png`
    #[serde(default)]
    pub overview_scale: Option<f64>,
}

/// Scales after falling back to the layout's default.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedScales {
    /// Scale of `preview.png`
    pub preview: f64,
    /// Scale of `texture.png`
    pub texture: f64,
    /// Scale of `print-outlined.png`
    pub print_outlined: f64,
    /// Scale of `print.png`
    pub print: f64,
    /// Scale of the archive's `overview.png`
    pub overview: f64,
}

impl ScaleArgs {
    /// Resolves every scale: the per-variant value wins, then `fallback`
    /// (the `--scale` flag), then the layout's own `scale`.
    #[must_use]
    pub fn resolve(&self, fallback: Option<f64>, layout: &Keyboard) -> ResolvedScales {
        let pick = |value: Option<f64>| value.or(fallback).unwrap_or(layout.scale);
        ResolvedScales {
            preview: pick(self.preview_scale),
            texture: pick(self.texture_scale),
            print_outlined: pick(self.print_outlined_scale),
            print: pick(self.print_scale),
            overview: pick(self.overview_scale),
        }
    }
}

/// Which inputs produced a generated keycap set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationMetadata {
    /// Layout file used
    pub layout_path: PathBuf,
    /// Theme file used
    pub theme_path: PathBuf,
    /// Scale arguments given on the command line
    #[serde(default)]
    pub args: ScaleArgs,
}

impl GenerationMetadata {
    /// Reads and validates a metadata file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file can't be read, isn't JSON5, or fails
    /// validation (wrapped [`schema::SchemaViolation`]).
    pub fn load_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .context(format!("Failed to read metadata file: {}", path.display()))?;
        let value: serde_json::Value = json5::from_str(&content)
            .context(format!("Failed to parse metadata file: {}", path.display()))?;

        schema::validate_metadata_value(&value).into_result(path.display().to_string())?;

        serde_json::from_value(value)
            .context(format!("Failed to decode metadata file: {}", path.display()))
    }

    /// Writes the record as pretty JSON (a JSON5 subset).
    ///
    /// # Errors
    ///
    /// Returns an error if the file can't be written.
    pub fn store_at(&self, path: &Path) -> Result<()> {
        let content =
            serde_json::to_string_pretty(self).context("Failed to serialize metadata")?;
        std::fs::write(path, content + "\n")
            .context(format!("Failed to write metadata file: {}", path.display()))
    }
}
