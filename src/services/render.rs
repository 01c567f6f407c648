//! Rasterizing SVG documents to PNG.

use anyhow::{bail, Context, Result};
use std::path::Path;

use crate::constants::MAX_RENDER_DIMENSION;
use crate::font::FontCatalog;

/// Pixel size of a document rendered at `scale`.
///
/// # Errors
///
/// Returns an error if the size is degenerate or exceeds the rasterizer's
/// limit.
pub fn raster_size(tree: &usvg::Tree, scale: f64) -> Result<(u32, u32)> {
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn to_px(value: f64) -> Result<u32> {
        if !value.is_finite() || value <= 0.0 {
            bail!("Document has an invalid size at this scale: {value}");
        }
        Ok((value.ceil() as u32).max(1))
    }

    let size = tree.size();
    let width = to_px(f64::from(size.width()) * scale)?;
    let height = to_px(f64::from(size.height()) * scale)?;
    if width > MAX_RENDER_DIMENSION || height > MAX_RENDER_DIMENSION {
        bail!(
            "Raster size too large: {width}x{height} (max {MAX_RENDER_DIMENSION}x{MAX_RENDER_DIMENSION}); lower the scale"
        );
    }
    Ok((width, height))
}

/// Parses an SVG document, resolving text against `fonts`.
///
/// # Errors
///
/// Returns an error if the document can't be parsed.
pub fn parse_svg(svg: &str, fonts: &FontCatalog) -> Result<usvg::Tree> {
    let options = usvg::Options {
        fontdb: fonts.database(),
        ..usvg::Options::default()
    };
    usvg::Tree::from_str(svg, &options).context("Failed to parse SVG for rendering")
}

/// Renders an SVG document to PNG bytes at `scale`.
///
/// # Errors
///
/// Returns an error if the document can't be parsed or is too large, or if
/// the crate was built without the `render` feature.
pub fn render_svg_to_png(svg: &str, scale: f64, fonts: &FontCatalog) -> Result<Vec<u8>> {
    let tree = parse_svg(svg, fonts)?;
    let (width, height) = raster_size(&tree, scale)?;
    rasterize(&tree, width, height)
}

/// Turns SVG documents into PNG images.
pub trait Rasterizer {
    /// Renders `svg` at `scale` and returns the encoded PNG.
    ///
    /// # Errors
    ///
    /// Returns an error if the document can't be rendered.
    fn rasterize(&self, svg: &str, scale: f64) -> Result<Vec<u8>>;
}

impl Rasterizer for FontCatalog {
    fn rasterize(&self, svg: &str, scale: f64) -> Result<Vec<u8>> {
        render_svg_to_png(svg, scale, self)
    }
}

/// Renders the SVG file at `svg_path` into `png_path`.
///
/// # Errors
///
/// Returns an error if either file can't be accessed or rendering fails.
pub fn render_file(
    rasterizer: &dyn Rasterizer,
    svg_path: &Path,
    png_path: &Path,
    scale: f64,
) -> Result<()> {
    let svg = std::fs::read_to_string(svg_path)
        .context(format!("Failed to read SVG file: {}", svg_path.display()))?;
    let png = rasterizer
        .rasterize(&svg, scale)
        .context(format!("Failed to render {}", svg_path.display()))?;
    std::fs::write(png_path, png)
        .context(format!("Failed to write PNG file: {}", png_path.display()))?;
    tracing::info!("Rendered {}", png_path.display());
    Ok(())
}

#[cfg(feature = "render")]
#[allow(clippy::cast_precision_loss)]
fn rasterize(tree: &usvg::Tree, width: u32, height: u32) -> Result<Vec<u8>> {
    let mut pixmap = resvg::tiny_skia::Pixmap::new(width, height)
        .with_context(|| format!("Failed to allocate a {width}x{height} pixmap"))?;

    let sx = width as f32 / tree.size().width();
    let sy = height as f32 / tree.size().height();
    resvg::render(
        tree,
        resvg::tiny_skia::Transform::from_scale(sx, sy),
        &mut pixmap.as_mut(),
    );
    pixmap
        .encode_png()
        .map_err(|e| anyhow::anyhow!("Failed to encode PNG: {e}"))
}

#[cfg(not(feature = "render"))]
fn rasterize(_tree: &usvg::Tree, _width: u32, _height: u32) -> Result<Vec<u8>> {
    bail!("PNG rendering is unavailable: kittencaps was built without the `render` feature")
}

#[cfg(test)]
mod tests {
    use super::*;

    const SVG: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 40 20" width="40" height="20">
  <rect width="40" height="20" fill="#ff0000"/>
</svg>"##;

    #[test]
    fn test_raster_size() {
        let fonts = FontCatalog::from_dirs(&[]);
        let tree = parse_svg(SVG, &fonts).unwrap();
        assert_eq!(raster_size(&tree, 1.5).unwrap(), (60, 30));
        assert!(raster_size(&tree, 1000.0).is_err());
        assert!(raster_size(&tree, 0.0).is_err());
    }

    #[cfg(feature = "render")]
    #[test]
    fn test_render_png() {
        let fonts = FontCatalog::from_dirs(&[]);
        let png = render_svg_to_png(SVG, 2.0, &fonts).unwrap();
        assert_eq!(&png[..8], b"\x89PNG\r\n\x1a\n");
        let width = u32::from_be_bytes([png[16], png[17], png[18], png[19]]);
        let height = u32::from_be_bytes([png[20], png[21], png[22], png[23]]);
        assert_eq!((width, height), (80, 40));
    }
}
