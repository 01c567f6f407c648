//! The sync command.

use clap::Args;

use crate::cli::common::{load_project_config, CliError, CliResult};
use crate::font::FontCatalog;
use crate::services::{sync_all, ExternalTool, PackageOptions, Rasterizer};

/// Regenerate every layout × theme combination and refresh icon palettes
#[derive(Debug, Clone, Args)]
pub struct SyncArgs {
    /// Also render every SVG to PNG
    #[arg(long)]
    pub render: bool,

    /// Convert text to paths with Inkscape in the texture and print variants
    #[arg(long)]
    pub text_to_path: bool,
}

impl SyncArgs {
    /// Execute the sync command
    pub fn execute(&self) -> CliResult<()> {
        let config = load_project_config()?;
        config
            .validate()
            .map_err(|e| CliError::validation(format!("Invalid configuration: {e:#}")))?;

        let catalog = FontCatalog::new(Some(&config.fonts_dir()));
        let inkscape = ExternalTool::inkscape(&config.tools.inkscape);
        let rasterizer: &dyn Rasterizer = &catalog;
        let options = PackageOptions {
            rasterizer: self.render.then_some(rasterizer),
            inkscape: self.text_to_path.then_some(&inkscape),
        };

        let report = sync_all(&config, |theme| catalog.theme_fonts(theme), options)
            .map_err(|e| CliError::from_anyhow("Sync failed", &e))?;

        for package in &report.packages {
            println!("✓ {}", package.out_dir.display());
            for warning in &package.warnings {
                println!("  ⚠ {warning}");
            }
        }
        println!(
            "✓ Checked {} icons, {} palettes updated",
            report.palettes.checked.len(),
            report.palettes.changed.len()
        );
        Ok(())
    }
}
