//! Installed font lookup.
//!
//! The catalog indexes system fonts plus the project's fonts directory with
//! `fontdb`, the same database the rasterizer uses, so that what is measured
//! is what gets rendered.

use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;
use usvg::fontdb;

use super::metrics::FontFace;
use crate::models::Theme;

/// Weight picked when none is requested.
const REGULAR_WEIGHT: u16 = 400;

/// Index of available fonts.
#[derive(Clone)]
pub struct FontCatalog {
    db: Arc<fontdb::Database>,
}

impl std::fmt::Debug for FontCatalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontCatalog")
            .field("faces", &self.db.len())
            .finish()
    }
}

impl FontCatalog {
    /// Indexes the system fonts and every font below `fonts_dir`.
    #[must_use]
    pub fn new(fonts_dir: Option<&Path>) -> Self {
        let mut db = fontdb::Database::new();
        db.load_system_fonts();
        if let Some(dir) = fonts_dir {
            load_fonts_from_dir(&mut db, dir);
        }
        debug!("Font catalog holds {} faces", db.len());
        Self { db: Arc::new(db) }
    }

    /// Indexes only the given directories, without system fonts.
    #[must_use]
    pub fn from_dirs(dirs: &[&Path]) -> Self {
        let mut db = fontdb::Database::new();
        for dir in dirs {
            load_fonts_from_dir(&mut db, dir);
        }
        Self { db: Arc::new(db) }
    }

    /// Shared font database, for handing to the rasterizer.
    #[must_use]
    pub fn database(&self) -> Arc<fontdb::Database> {
        Arc::clone(&self.db)
    }

    /// All upright faces of `family`, one per weight, sorted by weight.
    ///
    /// Faces that can't be parsed are skipped.
    pub fn find_family(&self, family: &str) -> Vec<FontFace> {
        let mut by_weight: BTreeMap<u16, FontFace> = BTreeMap::new();

        for info in self.db.faces() {
            if info.style != fontdb::Style::Normal
                || !info
                    .families
                    .iter()
                    .any(|(name, _)| name.eq_ignore_ascii_case(family))
            {
                continue;
            }

            let path = source_path(&info.source);
            let parsed = self
                .db
                .with_face_data(info.id, |data, index| FontFace::from_data(data, index, path));

            match parsed {
                Some(Ok(face)) => {
                    by_weight.entry(face.weight).or_insert(face);
                }
                Some(Err(e)) => debug!("Skipping face of '{}': {:#}", family, e),
                None => {}
            }
        }

        by_weight.into_values().collect()
    }

    /// Finds a face of `family`.
    ///
    /// With a weight, that exact weight must be installed. Without one,
    /// the regular weight (400) is preferred, else the lightest installed.
    ///
    /// # Errors
    ///
    /// Returns an error if the family isn't installed, or the requested
    /// weight isn't; the message lists the weights that were found.
    pub fn find_face(&self, family: &str, weight: Option<u16>) -> Result<FontFace> {
        let faces = self.find_family(family);
        let wanted = weight.unwrap_or(REGULAR_WEIGHT);
        if let Some(face) = faces.iter().find(|f| f.weight == wanted) {
            return Ok(face.clone());
        }
        if weight.is_none() || faces.is_empty() {
            return faces
                .first()
                .cloned()
                .with_context(|| format!("Font '{family}' is not installed"));
        }

        anyhow::bail!(
            "Font weight '{wanted}' is not installed for font '{family}'. Found weights: {:?}",
            faces.iter().map(|f| f.weight).collect::<Vec<_>>()
        )
    }

    /// Resolves the fonts a theme needs: its whole family for embedding and
    /// the face of its declared weight as the default.
    ///
    /// # Errors
    ///
    /// Returns an error if the family or the theme's weight isn't installed.
    pub fn theme_fonts(&self, theme: &Theme) -> Result<FontSet> {
        let default = self
            .find_face(&theme.font_family, Some(theme.font_weight))
            .context("Theme font is unavailable")?;
        let faces = self.find_family(&theme.font_family);
        Ok(FontSet {
            default,
            faces,
            embed: true,
        })
    }
}

/// The fonts a document uses.
#[derive(Debug, Clone, PartialEq)]
pub struct FontSet {
    /// Face used for label text
    pub default: FontFace,
    /// Every face to embed
    pub faces: Vec<FontFace>,
    /// Whether the document should embed the faces
    pub embed: bool,
}

impl FontSet {
    /// A set made of font files given explicitly; the first is the default.
    ///
    /// # Errors
    ///
    /// Returns an error if no files are given or one fails to load.
    pub fn from_files(paths: &[PathBuf]) -> Result<Self> {
        let faces = paths
            .iter()
            .map(|path| FontFace::from_file(path))
            .collect::<Result<Vec<_>>>()?;
        let default = faces.first().cloned().context("At least one font file is required")?;
        Ok(Self {
            default,
            faces,
            embed: true,
        })
    }

    /// Same fonts, but documents won't embed them.
    #[must_use]
    pub fn without_embedding(mut self) -> Self {
        self.embed = false;
        self
    }

    /// `@font-face` rules for every face, or none when embedding is off.
    ///
    /// # Errors
    ///
    /// Returns an error if a font file can't be read.
    pub fn css_rules(&self) -> Result<Vec<String>> {
        if !self.embed {
            return Ok(Vec::new());
        }
        self.faces.iter().map(FontFace::css_rule).collect()
    }
}

fn source_path(source: &fontdb::Source) -> Option<PathBuf> {
    match source {
        fontdb::Source::File(path) | fontdb::Source::SharedFile(path, _) => Some(path.clone()),
        fontdb::Source::Binary(_) => None,
    }
}

/// Loads every TrueType/OpenType font below `dir`, recursively.
fn load_fonts_from_dir(db: &mut fontdb::Database, dir: &Path) {
    let Ok(rd) = std::fs::read_dir(dir) else {
        return;
    };

    for entry in rd.flatten() {
        let path = entry.path();
        if path.is_dir() {
            load_fonts_from_dir(db, &path);
            continue;
        }
        let Some(ext) = path.extension().and_then(|s| s.to_str()) else {
            continue;
        };
        let ext = ext.to_ascii_lowercase();
        if !matches!(ext.as_str(), "ttf" | "otf" | "ttc" | "otc") {
            continue;
        }
        if let Err(e) = db.load_font_file(&path) {
            debug!("Failed to load font {}: {}", path.display(), e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::font::GlyphMetrics;
    use tempfile::TempDir;

    fn face(weight: u16) -> FontFace {
        FontFace {
            family: "Demo".to_string(),
            weight,
            path: None,
            metrics: GlyphMetrics {
                units_per_em: 1000,
                cap_y_min: 0,
                cap_y_max: 700,
            },
        }
    }

    #[test]
    fn test_empty_catalog_reports_missing_family() {
        let temp = TempDir::new().unwrap();
        let catalog = FontCatalog::from_dirs(&[temp.path()]);
        assert!(catalog.find_family("Nunito").is_empty());
        let err = catalog.find_face("Nunito", None).unwrap_err();
        assert!(err.to_string().contains("not installed"));
        let err = catalog.find_face("Nunito", Some(700)).unwrap_err();
        assert_eq!(err.to_string(), "Font 'Nunito' is not installed");
    }

    #[test]
    fn test_non_font_files_are_ignored() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("notes.txt"), "hi").unwrap();
        std::fs::write(temp.path().join("broken.ttf"), "not a font").unwrap();
        let catalog = FontCatalog::from_dirs(&[temp.path()]);
        assert!(catalog.find_family("broken").is_empty());
    }

    #[test]
    fn test_font_set_without_embedding_has_no_rules() {
        let set = FontSet {
            default: face(400),
            faces: vec![face(400), face(700)],
            embed: true,
        }
        .without_embedding();
        assert!(set.css_rules().unwrap().is_empty());
    }

    #[test]
    fn test_from_files_requires_one_file() {
        assert!(FontSet::from_files(&[]).is_err());
    }
}
