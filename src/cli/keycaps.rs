//! The generate-keycaps command.

use clap::Args;
use serde::Serialize;
use std::path::PathBuf;

use crate::cli::common::{load_project_config, path_or, CliError, CliResult, ScaleOptions};
use crate::font::FontCatalog;
use crate::keycap::IconLibrary;
use crate::services::{
    package_keycaps, ExternalTool, PackageInputs, PackageOptions, PackageRequest, Rasterizer,
};

/// Assemble the keycap set images for a layout and theme
#[derive(Debug, Clone, Args)]
pub struct GenerateKeycapsArgs {
    /// KLE layout file
    #[arg(value_name = "LAYOUT")]
    pub layout: PathBuf,

    /// Theme file (default: paths.default_theme)
    #[arg(long, value_name = "FILE")]
    pub theme: Option<PathBuf>,

    /// Keycap frame templates (default: paths.templates)
    #[arg(long, value_name = "FILE")]
    pub templates: Option<PathBuf>,

    /// Directory to write the generated files to
    #[arg(long, value_name = "DIR")]
    pub out: PathBuf,

    #[command(flatten)]
    pub scales: ScaleOptions,

    /// Also render every SVG to PNG
    #[arg(long)]
    pub render: bool,

    /// Convert text to paths with Inkscape in the texture and print variants
    #[arg(long)]
    pub text_to_path: bool,

    /// Output the report as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Serialize)]
struct GenerateResponse {
    out_dir: String,
    key_count: usize,
    files: Vec<String>,
    warnings: Vec<String>,
}

impl GenerateKeycapsArgs {
    /// Execute the generate-keycaps command
    pub fn execute(&self) -> CliResult<()> {
        self.scales.validate()?;
        let config = load_project_config()?;

        let request = PackageRequest {
            layout_path: self.layout.clone(),
            theme_path: path_or(self.theme.as_ref(), config.default_theme()),
            templates_path: path_or(self.templates.as_ref(), config.templates()),
            out_dir: self.out.clone(),
            scale: self.scales.scale,
            scales: self.scales.overrides(),
        };

        // Validation happens before anything is written.
        let inputs = PackageInputs::load(&request)
            .map_err(|e| CliError::from_anyhow("Invalid input", &e))?;

        let catalog = FontCatalog::new(Some(&config.fonts_dir()));
        let fonts = catalog
            .theme_fonts(&inputs.theme)
            .map_err(|e| CliError::validation(format!("{e:#}")))?;
        let icons = IconLibrary::new(config.icons_dir());
        let inkscape = ExternalTool::inkscape(&config.tools.inkscape);
        let rasterizer: &dyn Rasterizer = &catalog;
        let options = PackageOptions {
            rasterizer: self.render.then_some(rasterizer),
            inkscape: self.text_to_path.then_some(&inkscape),
        };

        let report = package_keycaps(&request, &inputs, &fonts, &icons, options)
            .map_err(|e| CliError::from_anyhow("Failed to generate keycaps", &e))?;

        if self.json {
            let response = GenerateResponse {
                out_dir: report.out_dir.display().to_string(),
                key_count: report.key_count,
                files: report.files.iter().map(|p| p.display().to_string()).collect(),
                warnings: report.warnings.clone(),
            };
            println!(
                "{}",
                serde_json::to_string_pretty(&response)
                    .map_err(|e| CliError::io(format!("Failed to serialize JSON: {e}")))?
            );
        } else {
            println!(
                "✓ Generated {} keycaps into {}",
                report.key_count,
                report.out_dir.display()
            );
            for file in &report.files {
                println!("  {}", file.display());
            }
            for warning in &report.warnings {
                println!("  ⚠ {warning}");
            }
        }

        Ok(())
    }
}
