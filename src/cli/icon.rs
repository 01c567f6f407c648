//! Icon commands: generating, creating and editing icon files.

use clap::Args;
use std::path::{Path, PathBuf};

use crate::cli::common::{load_project_config, path_or, CliError, CliResult};
use crate::config::Config;
use crate::font::FontSet;
use crate::keycap::IconLibrary;
use crate::models::Theme;
use crate::services::{generate_icon_document, open_in_editor, parse_icon_size, ExternalTool, IconRequest};
use crate::svg::{Element, SymbolSet};

/// Options shared by `generate-icon` and `create-icon`.
#[derive(Debug, Clone, Args)]
pub struct IconDocumentArgs {
    /// Keycap size in u, e.g. 1u, 1.5u or 1x2u (one dimension must be 1)
    #[arg(long, value_name = "SIZE", default_value = "1u")]
    pub size: String,

    /// Palette color of a visible background rect (hidden when not given)
    #[arg(long, value_name = "COLOR")]
    pub bg_color: Option<String>,

    /// Extra space around the icon in px
    #[arg(long, value_name = "PX", default_value_t = 0.0)]
    pub margin: f64,

    /// Font file to embed; may be repeated, the first one sets the placeholder
    #[arg(long, value_name = "FILE", required = true)]
    pub font: Vec<PathBuf>,

    /// Theme file (default: paths.default_theme)
    #[arg(long, value_name = "FILE")]
    pub theme: Option<PathBuf>,

    /// Keycap frame templates (default: paths.templates)
    #[arg(long, value_name = "FILE")]
    pub templates: Option<PathBuf>,
}

impl IconDocumentArgs {
    fn build(&self, config: &Config) -> CliResult<Element> {
        let size = parse_icon_size(&self.size).map_err(|e| CliError::validation(format!("{e:#}")))?;
        if !self.margin.is_finite() || self.margin < 0.0 {
            return Err(CliError::validation(format!(
                "--margin must not be negative, got {}",
                self.margin
            )));
        }

        let theme_path = path_or(self.theme.as_ref(), config.default_theme());
        let theme = Theme::load_file(&theme_path)
            .map_err(|e| CliError::from_anyhow("Failed to load theme", &e))?;
        let templates_path = path_or(self.templates.as_ref(), config.templates());
        let templates = SymbolSet::load_file(&templates_path)
            .map_err(|e| CliError::io(format!("Failed to load templates: {e:#}")))?;
        let fonts = FontSet::from_files(&self.font)
            .map_err(|e| CliError::io(format!("Failed to load fonts: {e:#}")))?;

        if let Some(bg) = &self.bg_color {
            if !theme.palette.contains(bg) {
                return Err(CliError::validation(format!(
                    "The specified background color '{bg}' could not be found in the theme"
                )));
            }
        }

        let request = IconRequest {
            size,
            background: self.bg_color.as_deref(),
            margin: self.margin,
        };
        generate_icon_document(&request, &fonts, &theme, &templates)
            .map_err(|e| CliError::io(format!("Failed to generate icon: {e:#}")))
    }
}

/// Generate an empty icon SVG with the given fonts embedded
#[derive(Debug, Clone, Args)]
pub struct GenerateIconArgs {
    #[command(flatten)]
    pub document: IconDocumentArgs,

    /// Write the SVG here instead of stdout
    #[arg(long, value_name = "FILE")]
    pub out: Option<PathBuf>,
}

impl GenerateIconArgs {
    /// Execute the generate-icon command
    pub fn execute(&self) -> CliResult<()> {
        let config = load_project_config()?;
        let document = self.document.build(&config)?.to_document(true);

        match &self.out {
            Some(path) => {
                write_new_file(path, &document)?;
                eprintln!("✓ Icon written to {}", path.display());
            }
            None => println!("{document}"),
        }
        Ok(())
    }
}

/// Create a new icon file in the icons directory
#[derive(Debug, Clone, Args)]
pub struct CreateIconArgs {
    /// Icon name; the file is `[NAME].svg`
    #[arg(value_name = "NAME")]
    pub name: String,

    #[command(flatten)]
    pub document: IconDocumentArgs,

    /// Overwrite an existing icon
    #[arg(long)]
    pub force: bool,

    /// Open the new icon in the configured editor
    #[arg(long)]
    pub edit: bool,
}

impl CreateIconArgs {
    /// Execute the create-icon command
    pub fn execute(&self) -> CliResult<()> {
        validate_icon_name(&self.name)?;
        let config = load_project_config()?;
        let library = IconLibrary::new(config.icons_dir());
        let path = library.icon_path(&self.name);

        if path.exists() && !self.force {
            return Err(CliError::validation(format!(
                "Icon already exists: {} (use --force to overwrite)",
                path.display()
            )));
        }

        let document = self.document.build(&config)?.to_document(true);
        std::fs::create_dir_all(library.dir())
            .map_err(|e| CliError::io(format!("Failed to create icons directory: {e}")))?;
        write_new_file(&path, &document)?;
        println!("✓ Created icon '{}' at {}", self.name, path.display());

        if self.edit {
            let editor = ExternalTool::editor(&config.tools.editor);
            open_in_editor(&editor, &path).map_err(|e| CliError::from_anyhow("Failed to open editor", &e))?;
        }
        Ok(())
    }
}

/// Open an existing icon in the configured editor
#[derive(Debug, Clone, Args)]
pub struct EditIconArgs {
    /// Icon name, as in `[NAME].svg`
    #[arg(value_name = "NAME")]
    pub name: String,
}

impl EditIconArgs {
    /// Execute the edit-icon command
    pub fn execute(&self) -> CliResult<()> {
        validate_icon_name(&self.name)?;
        let config = load_project_config()?;
        let path = IconLibrary::new(config.icons_dir()).icon_path(&self.name);
        if !path.is_file() {
            return Err(CliError::validation(format!(
                "Icon '{}' not found at {}",
                self.name,
                path.display()
            )));
        }

        let editor = ExternalTool::editor(&config.tools.editor);
        open_in_editor(&editor, &path).map_err(|e| CliError::from_anyhow("Failed to open editor", &e))
    }
}

fn validate_icon_name(name: &str) -> CliResult<()> {
    if name.is_empty() || name.contains(['/', '\\', '[', ']']) {
        return Err(CliError::validation(format!(
            "Invalid icon name '{name}': must be non-empty and contain no '/', '\\', '[' or ']'"
        )));
    }
    Ok(())
}

fn write_new_file(path: &Path, content: &str) -> CliResult<()> {
    std::fs::write(path, content)
        .map_err(|e| CliError::io(format!("Failed to write {}: {e}", path.display())))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_icon_name() {
        assert!(validate_icon_name("esc").is_ok());
        assert!(validate_icon_name("arrow up").is_ok());
        assert!(validate_icon_name("").is_err());
        assert!(validate_icon_name("../x").is_err());
        assert!(validate_icon_name("[x]").is_err());
    }
}
