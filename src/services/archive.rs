//! ZIP archive with one rendered image per keycap.
//!
//! Layout of the archive:
//!
//! ```text
//! print/print_<x>_<y>.png        keycap without outline
//! outlined/outlined_<x>_<y>.png  keycap with its top-surface outline
//! overview.png                   the whole print-packed sheet
//! ```

use anyhow::{bail, Context, Result};
use std::io::{Seek, Write};
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

use super::normalize::{
    inline_palette_references, reduce_color_spaces_to_srgb, reduce_transform_origin, show_outlines,
};
use super::render::Rasterizer;
use crate::font::FontSet;
use crate::keycap::keyboard::FACTORY_DEFS_ID;
use crate::keycap::{
    pack_keys_for_print, KeyboardBuilder, KeycapAssets, KeycapFactory, KeycapInfo, KeycapRenderingOptions,
    OutlineOption,
};
use crate::models::geometry::{fmt_num, round_significant};
use crate::models::{Key, Keyboard, ResolvedScales, Vec2, ViewBox};
use crate::svg::{Element, SvgDocumentBuilder};

/// What went into an archive.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArchiveReport {
    /// Entry names in write order
    pub entries: Vec<String>,
    /// Non-fatal problems, such as missing icon files
    pub warnings: Vec<String>,
}

/// File name for the key at `position` (in u): both coordinates with three
/// significant digits (ties to even) and `.` replaced by `-`.
///
/// # Examples
///
/// ```
/// use kittencaps::models::Vec2;
/// use kittencaps::services::archive::archive_image_name;
///
/// assert_eq!(archive_image_name(Vec2::new(1.5, 0.0)), "1-5_0.png");
/// assert_eq!(archive_image_name(Vec2::new(12.25, 3.0)), "12-2_3.png");
/// ```
#[must_use]
pub fn archive_image_name(position: Vec2) -> String {
    let coordinate = |value: f64| fmt_num(round_significant(value, 3)).replace('.', "-");
    format!("{}_{}.png", coordinate(position.x), coordinate(position.y))
}

/// A standalone document holding a single keycap, margin included, with
/// palette colors inlined and every color in sRGB.
///
/// # Errors
///
/// Returns an error if the key can't be rendered.
pub fn build_key_document(
    key: &Key,
    assets: KeycapAssets<'_>,
    icon_margin: f64,
) -> Result<(Element, Vec<String>)> {
    let mut factory = KeycapFactory::new(assets, icon_margin).configure(KeycapRenderingOptions {
        shading: false,
        outline: OutlineOption::IncludeHidden,
        include_margin: true,
    });
    let info = KeycapInfo::from_key(key, &assets.theme.palette)?;
    let keycap = factory.create(&info)?;

    let view_box = ViewBox::new(
        Vec2::splat(-icon_margin),
        keycap.size + Vec2::splat(icon_margin * 2.0),
    );
    let mut root = SvgDocumentBuilder::new()
        .view_box(view_box)
        .palette(&assets.theme.palette)
        .elements(assets.templates.document_elements().cloned())
        .element(
            Element::new("defs")
                .with_attr("id", FACTORY_DEFS_ID)
                .with_children(factory.defs().cloned()),
        )
        .element(keycap.element)
        .build();
    prepare_for_rasterizer(&mut root, assets)?;
    Ok((root, factory.warnings().to_vec()))
}

/// Writes the archive for `keyboard` (packed for print first).
///
/// # Arguments
///
/// * `writer` - Destination of the ZIP data
/// * `keyboard` - The layout; keys are re-packed with [`pack_keys_for_print`]
/// * `assets` - Theme, templates, icons and label font
/// * `fonts` - Fonts of the overview document (never embedded)
/// * `scales` - Print, outlined and overview scales
/// * `rasterizer` - Turns each document into a PNG
///
/// # Errors
///
/// Returns an error if a key can't be rendered or the archive can't be
/// written.
pub fn package_archive<W: Write + Seek>(
    writer: W,
    keyboard: &Keyboard,
    assets: KeycapAssets<'_>,
    fonts: &FontSet,
    scales: &ResolvedScales,
    rasterizer: &dyn Rasterizer,
) -> Result<ArchiveReport> {
    let layout = pack_keys_for_print(keyboard)?;
    let mut zip = ZipWriter::new(writer);
    let options = SimpleFileOptions::default()
        .compression_method(zip::CompressionMethod::Deflated)
        .unix_permissions(0o644);
    let mut report = ArchiveReport::default();

    let total = layout.keys.len();
    for (index, key) in layout.keys.iter().enumerate() {
        let image_name = archive_image_name(key.resolved_position());
        tracing::info!("Icon {} / {total} '{image_name}'", index + 1);

        let (mut document, warnings) = build_key_document(key, assets, layout.icon_margin)
            .with_context(|| format!("Failed to build keycap '{image_name}'"))?;
        report.warnings.extend(warnings);

        let image = rasterizer.rasterize(&document.to_document(true), scales.print)?;
        add_file_to_zip(&mut zip, &format!("print/print_{image_name}"), &image, options, &mut report)?;

        show_outlines(&mut document);
        let image = rasterizer.rasterize(&document.to_document(true), scales.print_outlined)?;
        add_file_to_zip(
            &mut zip,
            &format!("outlined/outlined_{image_name}"),
            &image,
            options,
            &mut report,
        )?;
    }

    tracing::info!("Building 'overview.png'");
    let overview = KeyboardBuilder::new(assets, fonts, layout.icon_margin)
        .configure_factory(KeycapRenderingOptions {
            shading: false,
            outline: OutlineOption::Show,
            include_margin: true,
        })
        .embed_fonts(false)
        .keys(&layout.keys)?
        .build()?;
    let mut root = overview.root;
    prepare_for_rasterizer(&mut root, assets)?;
    let image = rasterizer.rasterize(&root.to_document(true), scales.overview)?;
    add_file_to_zip(&mut zip, "overview.png", &image, options, &mut report)?;

    zip.finish().context("Failed to finalize zip")?;
    Ok(report)
}

fn prepare_for_rasterizer(root: &mut Element, assets: KeycapAssets<'_>) -> Result<()> {
    inline_palette_references(root, &assets.theme.palette)?;
    reduce_color_spaces_to_srgb(root);
    reduce_transform_origin(root)
}

/// Adds a file to a zip archive with zip-slip prevention.
fn add_file_to_zip<W: Write + Seek>(
    zip: &mut ZipWriter<W>,
    name: &str,
    content: &[u8],
    options: SimpleFileOptions,
    report: &mut ArchiveReport,
) -> Result<()> {
    if name.contains("..") || name.starts_with('/') || name.starts_with('\\') {
        bail!("Invalid filename in zip: {name}");
    }

    zip.start_file(name, options)
        .with_context(|| format!("Failed to start file {name}"))?;
    zip.write_all(content)
        .with_context(|| format!("Failed to write file {name}"))?;
    report.entries.push(name.to_string());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keycap::testing::Fixture;
    use crate::svg::SymbolSet;
    use std::io::{Cursor, Read};

    /// Returns the document itself, tagged with the scale.
    struct EchoRasterizer;

    impl Rasterizer for EchoRasterizer {
        fn rasterize(&self, svg: &str, scale: f64) -> Result<Vec<u8>> {
            Ok(format!("{scale}\n{svg}").into_bytes())
        }
    }

    fn scales() -> ResolvedScales {
        ResolvedScales {
            preview: 1.0,
            texture: 1.0,
            print_outlined: 3.0,
            print: 2.0,
            overview: 0.5,
        }
    }

    #[test]
    fn test_archive_image_name() {
        assert_eq!(archive_image_name(Vec2::new(0.0, 0.0)), "0_0.png");
        assert_eq!(archive_image_name(Vec2::new(9.0, 1.0)), "9_1.png");
        assert_eq!(archive_image_name(Vec2::new(0.125, 2.5)), "0-125_2-5.png");
    }

    #[test]
    fn test_archive_image_name_rounds_ties_to_even() {
        assert_eq!(archive_image_name(Vec2::new(12.25, 0.125)), "12-2_0-125.png");
        assert_eq!(archive_image_name(Vec2::new(10.75, 1.0)), "10-8_1.png");
        assert_eq!(archive_image_name(Vec2::new(1.2345, 6.25)), "1-23_6-25.png");
    }

    #[test]
    fn test_package_archive_entries() {
        let fixture = Fixture::new();
        let mut second = fixture.key("[missing]", 1.0, 1.0);
        second.x = 5.0;
        let keyboard = Keyboard {
            icon_margin: 5.0,
            keys: vec![fixture.key("A", 1.0, 1.0), second],
            ..Keyboard::default()
        };

        let mut buffer = Cursor::new(Vec::new());
        let report = package_archive(
            &mut buffer,
            &keyboard,
            fixture.assets(),
            &fixture.fonts,
            &scales(),
            &EchoRasterizer,
        )
        .unwrap();

        assert_eq!(
            report.entries,
            [
                "print/print_0_0.png",
                "outlined/outlined_0_0.png",
                "print/print_1_0.png",
                "outlined/outlined_1_0.png",
                "overview.png",
            ]
        );
        assert_eq!(report.warnings.len(), 1);

        let mut archive = zip::ZipArchive::new(buffer).unwrap();
        let mut content = String::new();
        archive
            .by_name("outlined/outlined_0_0.png")
            .unwrap()
            .read_to_string(&mut content)
            .unwrap();
        assert!(content.starts_with("3\n"));
        assert!(content.contains("visibility=\"visible\""));
        assert!(!content.contains("palette-colors"));

        let mut content = String::new();
        archive
            .by_name("print/print_0_0.png")
            .unwrap()
            .read_to_string(&mut content)
            .unwrap();
        assert!(content.starts_with("2\n"));
        assert!(content.contains("viewBox=\"-5 -5 110 110\""));
    }

    #[test]
    fn test_archive_documents_use_srgb_and_plain_transforms() {
        let mut fixture = Fixture::new();
        fixture.templates = SymbolSet::parse(
            r#"<svg xmlns="http://www.w3.org/2000/svg">
  <symbol id="_1u-top" viewBox="-50 -50 100 100">
    <path class="surface" d="M -40 -40 H 40 V 40 H -40 Z" fill="oklch(0.5 0 0)"/>
    <circle cx="10" r="5" transform="rotate(45)" style="transform-box:fill-box;transform-origin:center"/>
  </symbol>
</svg>"#,
        )
        .unwrap();
        let keyboard = Keyboard {
            keys: vec![fixture.key("A", 1.0, 1.0)],
            ..Keyboard::default()
        };

        let (document, _) = build_key_document(&keyboard.keys[0], fixture.assets(), 5.0).unwrap();
        let text = document.to_document(false);
        assert!(text.contains(r##"fill="#636363""##), "{text}");
        assert!(text.contains(r#"transform="translate(10 0) rotate(45) translate(-10 0)""#));
        assert!(!text.contains("oklch"));
        assert!(!text.contains("transform-origin"));

        let mut buffer = Cursor::new(Vec::new());
        package_archive(
            &mut buffer,
            &keyboard,
            fixture.assets(),
            &fixture.fonts,
            &scales(),
            &EchoRasterizer,
        )
        .unwrap();
        let mut archive = zip::ZipArchive::new(buffer).unwrap();
        let mut overview = String::new();
        archive
            .by_name("overview.png")
            .unwrap()
            .read_to_string(&mut overview)
            .unwrap();
        assert!(overview.contains("#636363"));
        assert!(!overview.contains("oklch"));
        assert!(!overview.contains("transform-origin"));
    }
}
