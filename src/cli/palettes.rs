//! The update-icon-palettes command.

use clap::Args;
use serde::Serialize;
use std::path::PathBuf;

use crate::cli::common::{load_project_config, path_or, CliError, CliResult};
use crate::keycap::IconLibrary;
use crate::models::Theme;
use crate::services::update_icon_palettes;

/// Refresh the palette swatches embedded in icon files
#[derive(Debug, Clone, Args)]
pub struct UpdateIconPalettesArgs {
    /// Icon name patterns, e.g. `esc` or `arrow*` (default: all icons)
    #[arg(value_name = "PATTERN", default_value = "*")]
    pub patterns: Vec<String>,

    /// Theme providing the palette (default: paths.default_theme)
    #[arg(long, value_name = "FILE")]
    pub theme: Option<PathBuf>,

    /// Output results as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Serialize)]
struct PaletteResponse {
    checked: usize,
    changed: Vec<String>,
}

impl UpdateIconPalettesArgs {
    /// Execute the update-icon-palettes command
    pub fn execute(&self) -> CliResult<()> {
        let config = load_project_config()?;
        let theme_path = path_or(self.theme.as_ref(), config.default_theme());
        let theme = Theme::load_file(&theme_path)
            .map_err(|e| CliError::from_anyhow("Failed to load theme", &e))?;
        let library = IconLibrary::new(config.icons_dir());

        let report = update_icon_palettes(&library, &self.patterns, &theme.palette)
            .map_err(|e| CliError::io(format!("Failed to update icon palettes: {e:#}")))?;

        if self.json {
            let response = PaletteResponse {
                checked: report.checked.len(),
                changed: report.changed.iter().map(|p| p.display().to_string()).collect(),
            };
            println!(
                "{}",
                serde_json::to_string_pretty(&response)
                    .map_err(|e| CliError::io(format!("Failed to serialize JSON: {e}")))?
            );
        } else {
            for path in &report.changed {
                println!("  updated {}", path.display());
            }
            println!(
                "✓ Checked {} icons, {} changed",
                report.checked.len(),
                report.changed.len()
            );
        }
        Ok(())
    }
}
