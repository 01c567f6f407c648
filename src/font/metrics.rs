//! Font faces and the glyph metrics used to center label text.

use anyhow::{Context, Result};
use base64::Engine;
use std::path::{Path, PathBuf};

/// Glyph used to measure the cap height.
const CAP_GLYPH: char = 'H';

/// Vertical extent of the cap glyph, in font units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GlyphMetrics {
    /// Font units per em
    pub units_per_em: u16,
    /// Lowest point of `H` relative to the baseline
    pub cap_y_min: i16,
    /// Highest point of `H` relative to the baseline
    pub cap_y_max: i16,
}

impl GlyphMetrics {
    /// Offset of the center of `H`'s bounding box from the baseline, in em.
    #[must_use]
    pub fn cap_center_offset(&self) -> f64 {
        (f64::from(self.cap_y_min) + f64::from(self.cap_y_max))
            / 2.0
            / f64::from(self.units_per_em)
    }
}

/// Baseline position, from the top of a box of `height`, that visually
/// centers `H` set at `font_size`.
///
/// # Examples
///
/// ```
/// use kittencaps::font::{centered_baseline, GlyphMetrics};
///
/// let metrics = GlyphMetrics { units_per_em: 1000, cap_y_min: 0, cap_y_max: 700 };
/// assert_eq!(centered_baseline(100.0, 40.0, &metrics), 64.0);
/// ```
#[must_use]
pub fn centered_baseline(height: f64, font_size: f64, metrics: &GlyphMetrics) -> f64 {
    height / 2.0 + font_size * metrics.cap_center_offset()
}

/// A single font face: family, weight and metrics.
#[derive(Debug, Clone, PartialEq)]
pub struct FontFace {
    /// Family name (typographic family if present)
    pub family: String,
    /// CSS weight (1..=1000)
    pub weight: u16,
    /// File the face was loaded from, needed for embedding
    pub path: Option<PathBuf>,
    /// Cap glyph metrics
    pub metrics: GlyphMetrics,
}

impl FontFace {
    /// Reads a font file and extracts family, weight and `H` metrics.
    ///
    /// # Errors
    ///
    /// Returns an error if the file can't be read, isn't a TrueType/OpenType
    /// font, or has no outline for `H`.
    pub fn from_file(path: &Path) -> Result<Self> {
        let data = std::fs::read(path)
            .context(format!("Failed to read font file: {}", path.display()))?;
        Self::from_data(&data, 0, Some(path.to_path_buf()))
            .context(format!("Failed to load font: {}", path.display()))
    }

    /// Parses a face from raw font data (`index` selects a face in a collection).
    ///
    /// # Errors
    ///
    /// Returns an error if the data can't be parsed or lacks `H`.
    pub fn from_data(data: &[u8], index: u32, path: Option<PathBuf>) -> Result<Self> {
        let face = ttf_parser::Face::parse(data, index)
            .map_err(|e| anyhow::anyhow!("Unsupported or corrupt font data: {e}"))?;

        let family = family_name(&face).context("Font has no family name")?;
        let glyph = face
            .glyph_index(CAP_GLYPH)
            .with_context(|| format!("Font '{family}' has no glyph for '{CAP_GLYPH}'"))?;
        let bbox = face
            .glyph_bounding_box(glyph)
            .with_context(|| format!("Glyph '{CAP_GLYPH}' of font '{family}' has no outline"))?;

        Ok(Self {
            weight: face.weight().to_number(),
            metrics: GlyphMetrics {
                units_per_em: face.units_per_em(),
                cap_y_min: bbox.y_min,
                cap_y_max: bbox.y_max,
            },
            family,
            path,
        })
    }

    /// Builds the `@font-face` rule embedding this face as a base64 data URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the face wasn't loaded from a file or the file
    /// can't be read.
    pub fn css_rule(&self) -> Result<String> {
        let path = self.path.as_deref().with_context(|| {
            format!(
                "Font '{}' ({}) wasn't loaded from a file and can't be embedded",
                self.family, self.weight
            )
        })?;
        let data = std::fs::read(path)
            .context(format!("Failed to read font file: {}", path.display()))?;
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("ttf")
            .to_ascii_lowercase();
        let encoded = base64::engine::general_purpose::STANDARD.encode(data);

        Ok(format!(
            "@font-face {{\n  font-family: \"{}\";\n  font-weight: {};\n  src: url(data:font/{};base64,{})\n}}",
            self.family, self.weight, extension, encoded
        ))
    }
}

/// Typographic family (name id 16) if present, else the legacy family (name id 1).
fn family_name(face: &ttf_parser::Face<'_>) -> Option<String> {
    let lookup = |id: u16| {
        face.names()
            .into_iter()
            .filter(|name| name.name_id == id && name.is_unicode())
            .find_map(|name| name.to_string())
    };
    lookup(ttf_parser::name_id::TYPOGRAPHIC_FAMILY).or_else(|| lookup(ttf_parser::name_id::FAMILY))
}
