//! The package-archive command.

use clap::Args;
use std::path::PathBuf;

use crate::cli::common::{load_project_config, path_or, CliError, CliResult, ScaleOptions};
use crate::font::FontCatalog;
use crate::keycap::{IconLibrary, KeycapAssets};
use crate::models::{GenerationMetadata, ScaleArgs};
use crate::services::{package_archive, PackageInputs};

/// Create a ZIP archive with every keycap rendered as its own image
#[derive(Debug, Clone, Args)]
pub struct PackageArchiveArgs {
    /// Path the ZIP archive is written to
    #[arg(value_name = "OUT")]
    pub out: PathBuf,

    /// KLE layout file
    #[arg(long, value_name = "FILE", required_unless_present = "metadata")]
    pub layout: Option<PathBuf>,

    /// Rebuild from a generated set's metadata.json5 (layout, theme and scales)
    #[arg(long, value_name = "FILE", conflicts_with = "layout")]
    pub metadata: Option<PathBuf>,

    /// Theme file (default: from --metadata, else paths.default_theme)
    #[arg(long, value_name = "FILE")]
    pub theme: Option<PathBuf>,

    /// Keycap frame templates (default: paths.templates)
    #[arg(long, value_name = "FILE")]
    pub templates: Option<PathBuf>,

    #[command(flatten)]
    pub scales: ScaleOptions,
}

impl PackageArchiveArgs {
    /// Execute the package-archive command
    pub fn execute(&self) -> CliResult<()> {
        self.scales.validate()?;
        let config = load_project_config()?;

        let metadata = self
            .metadata
            .as_ref()
            .map(|path| GenerationMetadata::load_file(path))
            .transpose()
            .map_err(|e| CliError::from_anyhow("Failed to load metadata", &e))?;

        let layout_path = match (&self.layout, &metadata) {
            (Some(layout), _) => layout.clone(),
            (None, Some(metadata)) => metadata.layout_path.clone(),
            (None, None) => return Err(CliError::validation("Either --layout or --metadata is required")),
        };
        let theme_path = match (&self.theme, &metadata) {
            (Some(theme), _) => theme.clone(),
            (None, Some(metadata)) => metadata.theme_path.clone(),
            (None, None) => config.default_theme(),
        };
        let recorded = metadata.map(|m| m.args).unwrap_or_default();
        let overrides = self.scales.overrides();
        let args = ScaleArgs {
            preview_scale: overrides.preview_scale.or(recorded.preview_scale),
            texture_scale: overrides.texture_scale.or(recorded.texture_scale),
            print_outlined_scale: overrides.print_outlined_scale.or(recorded.print_outlined_scale),
            print_scale: overrides.print_scale.or(recorded.print_scale),
            overview_scale: overrides.overview_scale.or(recorded.overview_scale),
        };

        let templates_path = path_or(self.templates.as_ref(), config.templates());
        let inputs = PackageInputs::load_files(&layout_path, &theme_path, &templates_path)
            .map_err(|e| CliError::from_anyhow("Invalid input", &e))?;
        let scales = args.resolve(self.scales.scale, &inputs.keyboard);

        let catalog = FontCatalog::new(Some(&config.fonts_dir()));
        let fonts = catalog
            .theme_fonts(&inputs.theme)
            .map_err(|e| CliError::validation(format!("{e:#}")))?
            .without_embedding();
        let icons = IconLibrary::new(config.icons_dir());
        let assets = KeycapAssets {
            theme: &inputs.theme,
            font: &fonts.default,
            templates: &inputs.templates,
            icons: &icons,
        };

        let file = std::fs::File::create(&self.out)
            .map_err(|e| CliError::io(format!("Failed to create {}: {e}", self.out.display())))?;
        let report = package_archive(file, &inputs.keyboard, assets, &fonts, &scales, &catalog)
            .map_err(|e| CliError::from_anyhow("Failed to package archive", &e))?;

        println!(
            "✓ Archive written to {} ({} images)",
            self.out.display(),
            report.entries.len()
        );
        for warning in &report.warnings {
            println!("  ⚠ {warning}");
        }
        Ok(())
    }
}
