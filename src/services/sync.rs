//! Regenerating every generated file of the project.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use super::packager::{package_keycaps, PackageInputs, PackageOptions, PackageReport, PackageRequest};
use super::palette_updater::{update_icon_palettes, PaletteUpdateReport};
use crate::config::Config;
use crate::font::FontSet;
use crate::keycap::IconLibrary;
use crate::models::{ScaleArgs, Theme};

/// Outcome of a sync run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SyncReport {
    /// One entry per layout × theme combination, in generation order
    pub packages: Vec<PackageReport>,
    /// Result of refreshing the icon palettes
    pub palettes: PaletteUpdateReport,
}

/// Files in `dir` with a `.json` or `.json5` extension, sorted by path.
///
/// # Errors
///
/// Returns an error if the directory can't be read.
pub fn list_documents(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = std::fs::read_dir(dir)
        .context(format!("Failed to read directory: {}", dir.display()))?;

    let mut paths = Vec::new();
    for entry in entries {
        let path = entry.context("Failed to read directory entry")?.path();
        let is_document = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e == "json" || e == "json5");
        if path.is_file() && is_document {
            paths.push(path);
        }
    }
    paths.sort();
    Ok(paths)
}

fn file_stem(path: &Path) -> Result<&str> {
    path.file_stem()
        .and_then(|s| s.to_str())
        .with_context(|| format!("Invalid file name: {}", path.display()))
}

/// Generates the keycap set of every layout × theme combination into
/// `<output_dir>/<layout>/<theme>/`, then refreshes the palettes of all
/// icons with the default theme.
///
/// Runs sequentially and stops at the first failure.
///
/// # Arguments
///
/// * `config` - Project configuration
/// * `fonts` - Resolves the fonts of each theme
/// * `options` - Rendering and text conversion for every package
///
/// # Errors
///
/// Returns the first error any step produces.
pub fn sync_all<F>(config: &Config, mut fonts: F, options: PackageOptions<'_>) -> Result<SyncReport>
where
    F: FnMut(&Theme) -> Result<FontSet>,
{
    let layouts = list_documents(&config.layouts_dir())?;
    let themes = list_documents(&config.themes_dir())?;
    let icons = IconLibrary::new(config.icons_dir());
    let mut report = SyncReport::default();

    for layout in &layouts {
        for theme in &themes {
            let layout_name = file_stem(layout)?;
            let theme_name = file_stem(theme)?;
            tracing::info!("Generating layout {layout_name} as {theme_name}");

            let request = PackageRequest {
                layout_path: layout.clone(),
                theme_path: theme.clone(),
                templates_path: config.templates(),
                out_dir: config.output_dir().join(layout_name).join(theme_name),
                scale: None,
                scales: ScaleArgs::default(),
            };
            let inputs = PackageInputs::load(&request)?;
            let font_set = fonts(&inputs.theme)?;
            let package = package_keycaps(&request, &inputs, &font_set, &icons, options)
                .with_context(|| format!("Failed to generate {layout_name} as {theme_name}"))?;
            report.packages.push(package);
        }
    }

    tracing::info!("Updating icon SVG colors");
    let theme = Theme::load_file(&config.default_theme())?;
    report.palettes = update_icon_palettes(&icons, &["*".to_string()], &theme.palette)?;

    Ok(report)
}
