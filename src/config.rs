//! Project configuration.
//!
//! A project is the directory holding `kittencaps.toml`. The file is looked
//! up from the working directory upwards; every relative path in it is
//! resolved against the directory the file was found in. Without a file the
//! defaults apply, relative to the working directory.
//!
//! ```toml
//! [paths]
//! icons_dir = "assets/icons"
//! themes_dir = "assets/themes"
//! layouts_dir = "assets/layouts"
//! templates = "assets/templates/frame-templates.svg"
//! fonts_dir = "assets/fonts"
//! output_dir = "generated"
//! default_theme = "assets/themes/standard.json"
//!
//! [tools]
//! editor = "inkscape"
//! inkscape = "inkscape"
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::constants::CONFIG_FILE_NAME;

/// Locations of project assets and outputs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathConfig {
    /// Directory of `[name].svg` icon files
    pub icons_dir: PathBuf,
    /// Directory of theme files
    pub themes_dir: PathBuf,
    /// Directory of KLE layout files
    pub layouts_dir: PathBuf,
    /// Keycap frame templates file
    pub templates: PathBuf,
    /// Extra fonts searched besides the system fonts
    pub fonts_dir: PathBuf,
    /// Where `sync` writes generated keycap sets
    pub output_dir: PathBuf,
    /// Theme used when none is given
    pub default_theme: PathBuf,
}

impl Default for PathConfig {
    fn default() -> Self {
        Self {
            icons_dir: PathBuf::from("assets/icons"),
            themes_dir: PathBuf::from("assets/themes"),
            layouts_dir: PathBuf::from("assets/layouts"),
            templates: PathBuf::from("assets/templates/frame-templates.svg"),
            fonts_dir: PathBuf::from("assets/fonts"),
            output_dir: PathBuf::from("generated"),
            default_theme: PathBuf::from("assets/themes/standard.json"),
        }
    }
}

/// Commands of external programs.
///
/// A command may include leading arguments, e.g.
/// `flatpak run org.inkscape.Inkscape`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolsConfig {
    /// Program used to edit icons
    pub editor: String,
    /// Inkscape, for converting text to paths
    pub inkscape: String,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            editor: "inkscape".to_string(),
            inkscape: "inkscape".to_string(),
        }
    }
}

/// Project configuration.
///
/// # Validation
///
/// - `icons_dir`, `themes_dir` and `layouts_dir` must be directories if they exist
/// - `templates` and `default_theme` must be files if they exist
/// - tool commands must not be empty
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Config {
    /// Asset and output locations
    #[serde(default)]
    pub paths: PathConfig,
    /// External programs
    #[serde(default)]
    pub tools: ToolsConfig,
    /// Directory relative paths are resolved against
    #[serde(skip)]
    pub root: PathBuf,
}

impl Config {
    /// Creates a default configuration rooted at `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ..Self::default()
        }
    }

    /// Finds `kittencaps.toml` in `start` or one of its ancestors.
    #[must_use]
    pub fn find_file(start: &Path) -> Option<PathBuf> {
        start
            .ancestors()
            .map(|dir| dir.join(CONFIG_FILE_NAME))
            .find(|path| path.is_file())
    }

    /// Loads the configuration of the project containing `start`.
    ///
    /// Falls back to the defaults rooted at `start` if no config file exists.
    ///
    /// # Errors
    ///
    /// Returns an error if a config file exists but can't be read or parsed.
    pub fn discover(start: &Path) -> Result<Self> {
        match Self::find_file(start) {
            Some(path) => Self::load_from(&path),
            None => {
                tracing::debug!(
                    "No {} found above {}, using defaults",
                    CONFIG_FILE_NAME,
                    start.display()
                );
                Ok(Self::new(start))
            }
        }
    }

    /// Loads a config file; its directory becomes the project root.
    ///
    /// # Errors
    ///
    /// Returns an error if the file can't be read or isn't valid TOML.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .context(format!("Failed to read config file: {}", path.display()))?;
        let mut config: Self = toml::from_str(&content)
            .context(format!("Failed to parse config file: {}", path.display()))?;
        config.root = path
            .parent()
            .map_or_else(|| PathBuf::from("."), Path::to_path_buf);
        tracing::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Saves the configuration to `path` using atomic write.
    ///
    /// Uses temp file + rename pattern for atomic writes.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or the file can't
    /// be written.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        self.validate()?;

        if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            fs::create_dir_all(dir)
                .context(format!("Failed to create config directory: {}", dir.display()))?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize configuration")?;
        let temp_path = path.with_extension("toml.tmp");

        fs::write(&temp_path, content).context(format!(
            "Failed to write temp config file: {}",
            temp_path.display()
        ))?;

        fs::rename(&temp_path, path).context(format!(
            "Failed to rename temp config file to: {}",
            path.display()
        ))?;

        Ok(())
    }

    /// Validates configuration values.
    ///
    /// Paths that don't exist yet are accepted; paths that exist must have
    /// the right kind.
    ///
    /// # Errors
    ///
    /// Returns an error naming the first offending key.
    pub fn validate(&self) -> Result<()> {
        let dirs = [
            ("paths.icons_dir", &self.paths.icons_dir),
            ("paths.themes_dir", &self.paths.themes_dir),
            ("paths.layouts_dir", &self.paths.layouts_dir),
            ("paths.fonts_dir", &self.paths.fonts_dir),
            ("paths.output_dir", &self.paths.output_dir),
        ];
        for (key, path) in dirs {
            let resolved = self.resolve(path);
            if resolved.exists() && !resolved.is_dir() {
                anyhow::bail!("{key} is not a directory: {}", resolved.display());
            }
        }

        let files = [
            ("paths.templates", &self.paths.templates),
            ("paths.default_theme", &self.paths.default_theme),
        ];
        for (key, path) in files {
            let resolved = self.resolve(path);
            if resolved.exists() && !resolved.is_file() {
                anyhow::bail!("{key} is not a file: {}", resolved.display());
            }
        }

        for (key, command) in [
            ("tools.editor", &self.tools.editor),
            ("tools.inkscape", &self.tools.inkscape),
        ] {
            if command.trim().is_empty() {
                anyhow::bail!("{key} must not be empty");
            }
        }

        Ok(())
    }

    /// Resolves a path against the project root.
    #[must_use]
    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }

    /// Resolved icons directory.
    #[must_use]
    pub fn icons_dir(&self) -> PathBuf {
        self.resolve(&self.paths.icons_dir)
    }

    /// Resolved themes directory.
    #[must_use]
    pub fn themes_dir(&self) -> PathBuf {
        self.resolve(&self.paths.themes_dir)
    }

    /// Resolved layouts directory.
    #[must_use]
    pub fn layouts_dir(&self) -> PathBuf {
        self.resolve(&self.paths.layouts_dir)
    }

    /// Resolved templates file.
    #[must_use]
    pub fn templates(&self) -> PathBuf {
        self.resolve(&self.paths.templates)
    }

    /// Resolved fonts directory.
    #[must_use]
    pub fn fonts_dir(&self) -> PathBuf {
        self.resolve(&self.paths.fonts_dir)
    }

    /// Resolved output directory.
    #[must_use]
    pub fn output_dir(&self) -> PathBuf {
        self.resolve(&self.paths.output_dir)
    }

    /// Resolved default theme file.
    #[must_use]
    pub fn default_theme(&self) -> PathBuf {
        self.resolve(&self.paths.default_theme)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_config_defaults() {
        let config = Config::new("/project");
        assert_eq!(config.icons_dir(), PathBuf::from("/project/assets/icons"));
        assert_eq!(
            config.templates(),
            PathBuf::from("/project/assets/templates/frame-templates.svg")
        );
        assert_eq!(config.tools.inkscape, "inkscape");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_discover_walks_up() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(
            temp_dir.path().join(CONFIG_FILE_NAME),
            "[paths]\nicons_dir = \"icons\"\n\n[tools]\neditor = \"boxy-svg\"\n",
        )
        .unwrap();
        let nested = temp_dir.path().join("a/b");
        fs::create_dir_all(&nested).unwrap();

        let config = Config::discover(&nested).unwrap();
        assert_eq!(config.root, temp_dir.path());
        assert_eq!(config.icons_dir(), temp_dir.path().join("icons"));
        assert_eq!(config.tools.editor, "boxy-svg");
        // Unset keys keep their defaults
        assert_eq!(config.paths.themes_dir, PathBuf::from("assets/themes"));
        assert_eq!(config.tools.inkscape, "inkscape");
    }

    #[test]
    fn test_discover_without_file() {
        let temp_dir = TempDir::new().unwrap();
        let config = Config::discover(temp_dir.path()).unwrap();
        assert_eq!(config.root, temp_dir.path());
        assert_eq!(config.paths, PathConfig::default());
    }

    #[test]
    fn test_config_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join(CONFIG_FILE_NAME);

        let mut config = Config::new(temp_dir.path());
        config.paths.output_dir = PathBuf::from("out");
        config.save_to(&path).unwrap();
        assert!(!path.with_extension("toml.tmp").exists());

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_config_validate() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("icons"), "").unwrap();

        let mut config = Config::new(temp_dir.path());
        config.paths.icons_dir = PathBuf::from("icons");
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("paths.icons_dir"));

        let mut config = Config::new(temp_dir.path());
        config.tools.editor = " ".to_string();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("tools.editor"));
    }

    #[test]
    fn test_invalid_toml() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join(CONFIG_FILE_NAME);
        fs::write(&path, "[paths\n").unwrap();
        assert!(Config::load_from(&path).is_err());
    }
}
