//! Refreshing the palette swatches embedded in icon files.
//!
//! Icons are edited by hand, so files are patched textually: only the
//! swatches inside `<defs id="palette-colors">` are replaced and every other
//! byte of the file is kept.

use anyhow::{bail, Context, Result};
use globset::Glob;
use sha2::{Digest, Sha256};
use std::ops::Range;
use std::path::{Path, PathBuf};

use crate::constants::PALETTE_DEFS_ID;
use crate::keycap::IconLibrary;
use crate::models::Palette;
use crate::svg::build_swatch;

/// Files visited by [`update_icon_palettes`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PaletteUpdateReport {
    /// Every selected icon file
    pub checked: Vec<PathBuf>,
    /// Files whose content changed
    pub changed: Vec<PathBuf>,
}

/// Resolves icon name patterns against the icons in `library`.
///
/// Patterns are globs over the bare names (`esc`, not `[esc].svg`). The
/// result keeps pattern order and lists each name once.
///
/// # Errors
///
/// Returns an error if a pattern is invalid or the directory can't be read.
pub fn select_icons(library: &IconLibrary, patterns: &[String]) -> Result<Vec<String>> {
    let names = library.names()?;
    let mut selected: Vec<String> = Vec::new();
    for pattern in patterns {
        let matcher = Glob::new(pattern)
            .with_context(|| format!("Invalid icon name pattern '{pattern}'"))?
            .compile_matcher();
        for name in &names {
            if matcher.is_match(name) && !selected.contains(name) {
                selected.push(name.clone());
            }
        }
    }
    Ok(selected)
}

/// Updates the palettes of every icon matching `patterns`.
///
/// # Errors
///
/// Returns an error on the first file that can't be updated.
pub fn update_icon_palettes(
    library: &IconLibrary,
    patterns: &[String],
    palette: &Palette,
) -> Result<PaletteUpdateReport> {
    let mut report = PaletteUpdateReport::default();
    for name in select_icons(library, patterns)? {
        let path = library.icon_path(&name);
        if update_palette_in_file(&path, palette)? {
            tracing::info!("Updated palette in {}", path.display());
            report.changed.push(path.clone());
        } else {
            tracing::debug!("Palette already up to date in {}", path.display());
        }
        report.checked.push(path);
    }
    Ok(report)
}

/// Rewrites the palette of one icon file. Returns whether its content
/// changed; unchanged files are not written.
///
/// # Errors
///
/// Returns an error if the file can't be read, parsed or written, or has no
/// usable palette `<defs>`.
pub fn update_palette_in_file(path: &Path, palette: &Palette) -> Result<bool> {
    let bytes = std::fs::read(path)
        .context(format!("Failed to read icon file: {}", path.display()))?;
    let source = std::str::from_utf8(&bytes)
        .context(format!("Icon file is not valid UTF-8: {}", path.display()))?;

    let updated = update_palette_in_source(source, palette)
        .context(format!("Failed to update palette in {}", path.display()))?;

    if Sha256::digest(&bytes) == Sha256::digest(updated.as_bytes()) {
        return Ok(false);
    }
    std::fs::write(path, updated)
        .context(format!("Failed to write icon file: {}", path.display()))?;
    Ok(true)
}

/// Replaces the palette swatches in an SVG document's source text.
///
/// Swatches named after palette colors are removed together with the
/// whitespace before them, then one swatch per palette color is inserted
/// right after the `<defs id="palette-colors">` start tag, indented like the
/// surrounding file.
///
/// # Errors
///
/// Returns an error if the source isn't well-formed XML, has no
/// `palette-colors` element, or that element is self-closing.
pub fn update_palette_in_source(source: &str, palette: &Palette) -> Result<String> {
    let options = roxmltree::ParsingOptions {
        allow_dtd: true,
        ..roxmltree::ParsingOptions::default()
    };
    let document =
        roxmltree::Document::parse_with_options(source, options).context("Failed to parse SVG")?;

    let Some(defs) = document
        .descendants()
        .find(|node| node.attribute("id") == Some(PALETTE_DEFS_ID))
    else {
        bail!("SVG does not contain an element with id '{PALETTE_DEFS_ID}'");
    };

    let tag_end = match start_tag_end(source, defs.range().start) {
        Some((end, false)) => end,
        Some((_, true)) => bail!(
            "Element '{PALETTE_DEFS_ID}' is self-closing, it must have a start and end tag"
        ),
        None => bail!("Unterminated start tag of element '{PALETTE_DEFS_ID}'"),
    };

    let swatches: Vec<_> = defs
        .descendants()
        .skip(1)
        .filter(|node| {
            node.is_element()
                && node
                    .attribute("id")
                    .is_some_and(|id| palette.contains(id))
        })
        .collect();

    let mut removals: Vec<Range<usize>> = Vec::new();
    for swatch in &swatches {
        let range = swatch.range();
        if removals.iter().any(|r| r.start <= range.start && range.end <= r.end) {
            continue;
        }
        let start = leading_whitespace(*swatch).map_or(range.start, |ws| ws.start);
        removals.push(start..range.end);
    }

    let indentation = document
        .root_element()
        .children()
        .find(roxmltree::Node::is_element)
        .and_then(leading_whitespace)
        .map(|ws| source[ws].trim_start_matches('\n').to_string())
        .unwrap_or_else(|| "  ".to_string());

    let prefix = match swatches.first().and_then(|swatch| leading_whitespace(*swatch)) {
        Some(ws) => source[ws].to_string(),
        None => match leading_whitespace(defs) {
            Some(ws) => format!("{}{indentation}", &source[ws]),
            None => String::new(),
        },
    };
    let (new_line, prefix) = match prefix.strip_prefix('\n') {
        Some(rest) => ("\n", rest.to_string()),
        None => ("", prefix),
    };

    let mut inserted = String::new();
    for (name, paint) in palette.iter() {
        let swatch = build_swatch(name, paint).to_indented_string(&indentation);
        inserted.push_str(new_line);
        inserted.push_str(&prefix);
        inserted.push_str(&swatch.replace('\n', &format!("\n{prefix}")));
    }

    removals.sort_by_key(|r| r.start);
    let mut output = String::with_capacity(source.len() + inserted.len());
    output.push_str(&source[..tag_end]);
    output.push_str(&inserted);
    let mut cursor = tag_end;
    for removal in removals {
        output.push_str(&source[cursor..removal.start]);
        cursor = removal.end;
    }
    output.push_str(&source[cursor..]);
    Ok(output)
}

/// Byte range of the whitespace-only text directly before `node`.
fn leading_whitespace(node: roxmltree::Node<'_, '_>) -> Option<Range<usize>> {
    node.prev_sibling()
        .filter(|sibling| sibling.is_text())
        .filter(|sibling| sibling.text().is_some_and(|t| t.trim().is_empty()))
        .map(|sibling| sibling.range())
}

/// Position just past the start tag beginning at `start`, and whether the
/// tag is self-closing.
fn start_tag_end(source: &str, start: usize) -> Option<(usize, bool)> {
    let mut quote = None;
    let bytes = source.as_bytes();
    for (offset, &byte) in bytes.get(start..)?.iter().enumerate() {
        match (quote, byte) {
            (Some(q), b) if b == q => quote = None,
            (Some(_), _) => {}
            (None, b'"' | b'\'') => quote = Some(byte),
            (None, b'>') => {
                let end = start + offset + 1;
                let self_closing = offset > 0 && bytes[start + offset - 1] == b'/';
                return Some((end, self_closing));
            }
            (None, _) => {}
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Paint, RgbColor};
    use tempfile::TempDir;

    const ICON: &str = r##"<?xml version="1.0" encoding="UTF-8"?>
<svg xmlns="http://www.w3.org/2000/svg" xmlns:inkscape="http://www.inkscape.org/namespaces/inkscape">
    <defs id="palette-colors">
        <linearGradient id="bg_main" inkscape:swatch="solid">
            <stop style="stop-color:#000000;"/>
        </linearGradient>
        <linearGradient id="custom"/>
    </defs>
    <svg id="icon" data-note="a > b"><path d="M 0 0"/></svg>
</svg>
"##;

    fn palette() -> Palette {
        Palette::from_entries([
            ("bg_main", Paint::Color(RgbColor::new(0xff, 0xff, 0xff))),
            ("fg_main", Paint::Hidden),
        ])
    }

    #[test]
    fn test_replaces_swatches_in_place() {
        let updated = update_palette_in_source(ICON, &palette()).unwrap();
        let expected = r##"<?xml version="1.0" encoding="UTF-8"?>
<svg xmlns="http://www.w3.org/2000/svg" xmlns:inkscape="http://www.inkscape.org/namespaces/inkscape">
    <defs id="palette-colors">
        <linearGradient id="bg_main" inkscape:swatch="solid">
            <stop style="stop-color:#FFFFFF;"/>
        </linearGradient>
        <linearGradient id="fg_main" inkscape:swatch="solid">
            <stop style="stop-color:#000000;stop-opacity:0;"/>
        </linearGradient>
        <linearGradient id="custom"/>
    </defs>
    <svg id="icon" data-note="a > b"><path d="M 0 0"/></svg>
</svg>
"##;
        assert_eq!(updated, expected);
    }

    #[test]
    fn test_update_is_idempotent() {
        let once = update_palette_in_source(ICON, &palette()).unwrap();
        let twice = update_palette_in_source(&once, &palette()).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_empty_defs_uses_file_indentation() {
        let source = "<svg xmlns=\"http://www.w3.org/2000/svg\">\n  <defs id=\"palette-colors\"></defs>\n</svg>\n";
        let palette = Palette::from_entries([("fg_1", Paint::Hidden)]);
        let updated = update_palette_in_source(source, &palette).unwrap();
        assert!(updated.contains(
            "<defs id=\"palette-colors\">\n    <linearGradient id=\"fg_1\" inkscape:swatch=\"solid\">\n      <stop"
        ));
    }

    #[test]
    fn test_invalid_documents() {
        let missing = "<svg xmlns=\"http://www.w3.org/2000/svg\"><defs/></svg>";
        let err = update_palette_in_source(missing, &palette()).unwrap_err();
        assert!(err.to_string().contains("palette-colors"));

        let self_closing = "<svg xmlns=\"http://www.w3.org/2000/svg\"><defs id=\"palette-colors\"/></svg>";
        let err = update_palette_in_source(self_closing, &palette()).unwrap_err();
        assert!(err.to_string().contains("self-closing"));
    }

    #[test]
    fn test_update_icon_palettes() {
        let dir = TempDir::new().unwrap();
        let library = IconLibrary::new(dir.path());
        std::fs::write(library.icon_path("esc"), ICON).unwrap();
        std::fs::write(library.icon_path("enter"), ICON).unwrap();

        let report = update_icon_palettes(&library, &["e*".to_string()], &palette()).unwrap();
        assert_eq!(report.checked.len(), 2);
        assert_eq!(report.changed.len(), 2);

        let report = update_icon_palettes(&library, &["*".to_string()], &palette()).unwrap();
        assert_eq!(report.checked.len(), 2);
        assert!(report.changed.is_empty());
    }

    #[test]
    fn test_select_icons_keeps_pattern_order() {
        let dir = TempDir::new().unwrap();
        let library = IconLibrary::new(dir.path());
        for name in ["a", "b", "c"] {
            std::fs::write(library.icon_path(name), "").unwrap();
        }
        let names = select_icons(&library, &["c".to_string(), "*".to_string()]).unwrap();
        assert_eq!(names, ["c", "a", "b"]);
    }
}
