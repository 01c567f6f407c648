//! The font-baseline command.

use clap::Args;
use std::path::PathBuf;

use crate::cli::common::{load_project_config, CliError, CliResult};
use crate::font::{centered_baseline, FontCatalog, FontFace};
use crate::models::geometry::fmt_num;

/// Print the baseline offset that visually centers `H` in a box
#[derive(Debug, Clone, Args)]
pub struct FontBaselineArgs {
    /// Height of the box, in any unit
    #[arg(long, value_name = "SIZE")]
    pub height: f64,

    /// Font size, in the same unit as --height
    #[arg(long, value_name = "SIZE")]
    pub font_size: f64,

    /// Installed font family to measure
    #[arg(long, value_name = "FAMILY", required_unless_present = "font", conflicts_with = "font")]
    pub family: Option<String>,

    /// Font weight (default: 400, else the first installed weight)
    #[arg(long, value_name = "WEIGHT", requires = "family")]
    pub weight: Option<u16>,

    /// Measure this font file instead of an installed family
    #[arg(long, value_name = "FILE")]
    pub font: Option<PathBuf>,
}

impl FontBaselineArgs {
    /// Execute the font-baseline command
    pub fn execute(&self) -> CliResult<()> {
        for (flag, value) in [("--height", self.height), ("--font-size", self.font_size)] {
            if !value.is_finite() || value <= 0.0 {
                return Err(CliError::validation(format!(
                    "{flag} must be a positive number, got {value}"
                )));
            }
        }

        let face = self.face()?;
        tracing::debug!("Measuring {} ({})", face.family, face.weight);
        println!(
            "{}",
            fmt_num(centered_baseline(self.height, self.font_size, &face.metrics))
        );
        Ok(())
    }

    fn face(&self) -> CliResult<FontFace> {
        if let Some(path) = &self.font {
            return FontFace::from_file(path).map_err(|e| CliError::io(format!("{e:#}")));
        }
        let Some(family) = &self.family else {
            return Err(CliError::validation("Either --family or --font is required"));
        };
        let config = load_project_config()?;
        FontCatalog::new(Some(&config.fonts_dir()))
            .find_face(family, self.weight)
            .map_err(|e| CliError::validation(format!("{e:#}")))
    }
}
