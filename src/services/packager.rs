//! Generating a keycap set for one layout and theme.
//!
//! Every run writes four SVG variants plus the generation metadata:
//!
//! ```text
//! preview.svg         shaded keycaps, embedded fonts, hidden outlines
//! texture.svg         preview normalized for texturing, no outlines
//! print-outlined.svg  keys re-packed for printing, outlines visible
//! print.svg           print-outlined without the outlines
//! metadata.json5      which inputs and scales produced the set
//! ```
//!
//! With a rasterizer every variant also gets a PNG next to it.

use anyhow::{Context, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};

use super::external::{convert_text_to_paths, ExternalTool};
use super::normalize::{normalize_for_texture, remove_outlines, show_outlines};
use super::render::{render_file, Rasterizer};
use crate::font::FontSet;
use crate::keycap::{build_keyboard_svg, pack_keys_for_print, IconLibrary, KeycapAssets};
use crate::models::metadata::METADATA_FILE_NAME;
use crate::models::{GenerationMetadata, Keyboard, ScaleArgs, Theme};
use crate::parser::kle::parse_layout_file;
use crate::schema::validate_layout;
use crate::svg::{Element, SymbolSet};

/// What to generate and where.
#[derive(Debug, Clone, PartialEq)]
pub struct PackageRequest {
    /// KLE layout file
    pub layout_path: PathBuf,
    /// Theme file
    pub theme_path: PathBuf,
    /// Keycap frame templates file
    pub templates_path: PathBuf,
    /// Directory receiving the generated files
    pub out_dir: PathBuf,
    /// Scale for every image, unless overridden per variant
    pub scale: Option<f64>,
    /// Per-variant scale overrides
    pub scales: ScaleArgs,
}

impl PackageRequest {
    /// Scale arguments as recorded in the metadata: `scale` applied to every
    /// variant that has no override of its own.
    #[must_use]
    pub fn effective_scales(&self) -> ScaleArgs {
        ScaleArgs {
            preview_scale: self.scales.preview_scale.or(self.scale),
            texture_scale: self.scales.texture_scale.or(self.scale),
            print_outlined_scale: self.scales.print_outlined_scale.or(self.scale),
            print_scale: self.scales.print_scale.or(self.scale),
            overview_scale: self.scales.overview_scale.or(self.scale),
        }
    }
}

/// Validated inputs of a run.
#[derive(Debug, Clone)]
pub struct PackageInputs {
    /// The layout
    pub keyboard: Keyboard,
    /// The theme
    pub theme: Theme,
    /// The keycap frame templates
    pub templates: SymbolSet,
}

impl PackageInputs {
    /// Loads and validates the layout, theme and templates of a request.
    ///
    /// Nothing is written; a failure here means no output at all.
    ///
    /// # Errors
    ///
    /// Returns an error if a file can't be read or parsed. Theme and layout
    /// validation failures carry a [`crate::schema::SchemaViolation`].
    pub fn load(request: &PackageRequest) -> Result<Self> {
        Self::load_files(&request.layout_path, &request.theme_path, &request.templates_path)
    }

    /// Loads and validates a layout, theme and templates file.
    ///
    /// # Errors
    ///
    /// Same as [`PackageInputs::load`].
    pub fn load_files(layout_path: &Path, theme_path: &Path, templates_path: &Path) -> Result<Self> {
        let theme = Theme::load_file(theme_path)?;
        let keyboard = parse_layout_file(layout_path)?;

        let report = validate_layout(&keyboard, &theme.palette);
        for warning in &report.warnings {
            tracing::warn!("{}: {}", layout_path.display(), warning);
        }
        report.into_result(layout_path.display().to_string())?;

        let templates = SymbolSet::load_file(templates_path)?;
        Ok(Self {
            keyboard,
            theme,
            templates,
        })
    }
}

/// Optional steps after writing the SVG files.
#[derive(Clone, Copy, Default)]
pub struct PackageOptions<'a> {
    /// Renders a PNG next to every SVG variant
    pub rasterizer: Option<&'a dyn Rasterizer>,
    /// Converts text to paths in the texture and print variants
    pub inkscape: Option<&'a ExternalTool>,
}

impl std::fmt::Debug for PackageOptions<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PackageOptions")
            .field("render", &self.rasterizer.is_some())
            .field("inkscape", &self.inkscape)
            .finish()
    }
}

/// Outcome of a run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PackageReport {
    /// Output directory
    pub out_dir: PathBuf,
    /// Files written, in write order
    pub files: Vec<PathBuf>,
    /// Number of keycaps in the preview
    pub key_count: usize,
    /// Non-fatal problems, such as missing icon files
    pub warnings: Vec<String>,
}

/// Generates the keycap set described by `request` into its output
/// directory.
///
/// # Arguments
///
/// * `request` - Input paths, output directory and scales
/// * `inputs` - The request's inputs, already validated
/// * `fonts` - Label fonts; embedded into the preview when allowed
/// * `icons` - Icon library for `[name]` labels
/// * `options` - Rendering and text conversion
///
/// # Returns
///
/// The files written and any warnings.
///
/// # Errors
///
/// Returns an error if a key can't be rendered, a file can't be written or
/// an optional step fails.
pub fn package_keycaps(
    request: &PackageRequest,
    inputs: &PackageInputs,
    fonts: &FontSet,
    icons: &IconLibrary,
    options: PackageOptions<'_>,
) -> Result<PackageReport> {
    let assets = KeycapAssets {
        theme: &inputs.theme,
        font: &fonts.default,
        templates: &inputs.templates,
        icons,
    };
    let keyboard = &inputs.keyboard;
    let theme = &inputs.theme;

    tracing::info!("Building keyboard SVG");
    let preview = build_keyboard_svg(keyboard, assets, fonts)?;
    for warning in &preview.warnings {
        tracing::warn!("{warning}");
    }

    std::fs::create_dir_all(&request.out_dir).context(format!(
        "Failed to create output directory: {}",
        request.out_dir.display()
    ))?;
    let mut report = PackageReport {
        out_dir: request.out_dir.clone(),
        key_count: preview.key_count,
        warnings: preview.warnings,
        ..PackageReport::default()
    };
    let mut root = preview.root;
    write_variant(&mut report, "preview.svg", &root)?;

    tracing::info!("Normalizing texture.svg");
    normalize_for_texture(&mut root, theme, keyboard.icon_margin)?;
    remove_outlines(&mut root);
    let texture = write_variant(&mut report, "texture.svg", &root)?;

    tracing::info!("Building keyboard print SVG");
    let print_layout = pack_keys_for_print(keyboard)?;
    let mut print_root = build_keyboard_svg(&print_layout, assets, fonts)?.root;
    show_outlines(&mut print_root);
    normalize_for_texture(&mut print_root, theme, print_layout.icon_margin)?;
    let print_outlined = write_variant(&mut report, "print-outlined.svg", &print_root)?;

    remove_outlines(&mut print_root);
    let print = write_variant(&mut report, "print.svg", &print_root)?;

    if let Some(inkscape) = options.inkscape {
        for path in [&texture, &print_outlined, &print] {
            convert_text_to_paths(inkscape, path)?;
        }
    }

    let args = request.effective_scales();
    if let Some(rasterizer) = options.rasterizer {
        let scales = args.resolve(None, keyboard);
        let variants = [
            ("preview", scales.preview),
            ("texture", scales.texture),
            ("print-outlined", scales.print_outlined),
            ("print", scales.print),
        ];
        for (name, scale) in variants {
            tracing::info!("Generating {name}.png");
            render_variant(&mut report, rasterizer, name, scale)?;
        }
    }

    let metadata = GenerationMetadata {
        layout_path: request.layout_path.clone(),
        theme_path: request.theme_path.clone(),
        args,
    };
    let metadata_path = request.out_dir.join(METADATA_FILE_NAME);
    metadata.store_at(&metadata_path)?;
    report.files.push(metadata_path);

    Ok(report)
}

fn write_variant(report: &mut PackageReport, name: &str, root: &Element) -> Result<PathBuf> {
    let path = report.out_dir.join(name);
    std::fs::write(&path, root.to_document(true))
        .context(format!("Failed to write {}", path.display()))?;
    tracing::debug!("Wrote {}", path.display());
    report.files.push(path.clone());
    Ok(path)
}

fn render_variant(
    report: &mut PackageReport,
    rasterizer: &dyn Rasterizer,
    name: &str,
    scale: f64,
) -> Result<()> {
    let svg_path = report.out_dir.join(format!("{name}.svg"));
    let png_path = report.out_dir.join(format!("{name}.png"));
    render_file(rasterizer, &svg_path, &png_path, scale)?;
    report.files.push(png_path);
    Ok(())
}

/// Returns true if `dir` looks like the output of a previous run.
pub fn is_package_dir(dir: &Path) -> bool {
    dir.join(METADATA_FILE_NAME).is_file()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keycap::testing::{Fixture, TEMPLATES};
    use crate::schema::SchemaViolation;
    use std::cell::RefCell;
    use tempfile::TempDir;

    const THEME: &str = r##"{
  font_family: "Test Sans",
  font_weight: 400,
  font_size_px: 20,
  unit_size: 100,
  base_size: 90,
  top_size: 70,
  colors: { bg_main: "#EEEEEE", fg_main: "#111111" },
}"##;

    const LAYOUT: &str = r#"[
  {"iconMargin": 4},
  [{"a": 7, "c": "bg_main"}, "A", "[heart]"],
  [{"w": 2}, "Space"]
]"#;

    struct RecordingRasterizer {
        scales: RefCell<Vec<f64>>,
    }

    impl Rasterizer for RecordingRasterizer {
        fn rasterize(&self, _svg: &str, scale: f64) -> Result<Vec<u8>> {
            self.scales.borrow_mut().push(scale);
            Ok(b"png".to_vec())
        }
    }

    fn request(dir: &Path, theme: &str) -> PackageRequest {
        std::fs::write(dir.join("layout.json"), LAYOUT).unwrap();
        std::fs::write(dir.join("theme.json"), theme).unwrap();
        std::fs::write(dir.join("templates.svg"), TEMPLATES).unwrap();
        PackageRequest {
            layout_path: dir.join("layout.json"),
            theme_path: dir.join("theme.json"),
            templates_path: dir.join("templates.svg"),
            out_dir: dir.join("out"),
            scale: None,
            scales: ScaleArgs::default(),
        }
    }

    #[test]
    fn test_package_writes_all_variants() {
        let fixture = Fixture::new();
        let temp = TempDir::new().unwrap();
        let request = request(temp.path(), THEME);
        let inputs = PackageInputs::load(&request).unwrap();

        let report = package_keycaps(
            &request,
            &inputs,
            &fixture.fonts,
            &fixture.icons,
            PackageOptions::default(),
        )
        .unwrap();

        let names: Vec<_> = report
            .files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(
            names,
            ["preview.svg", "texture.svg", "print-outlined.svg", "print.svg", "metadata.json5"]
        );
        assert_eq!(report.key_count, 3);
        assert_eq!(report.warnings.len(), 1);
        assert!(report.warnings[0].contains("heart"));

        let preview = Element::parse(&std::fs::read_to_string(temp.path().join("out/preview.svg")).unwrap()).unwrap();
        let mut groups = 0;
        preview.visit(&mut |e| {
            if e.attr("class").is_some_and(|c| c.starts_with("keycap-color-")) {
                groups += 1;
            }
        });
        assert_eq!(groups, 3);

        let texture = std::fs::read_to_string(temp.path().join("out/texture.svg")).unwrap();
        assert!(!texture.contains("palette-colors"));
        assert!(!texture.contains("class=\"outline\""));

        let outlined = std::fs::read_to_string(temp.path().join("out/print-outlined.svg")).unwrap();
        assert!(outlined.contains("class=\"outline\""));
        let print = std::fs::read_to_string(temp.path().join("out/print.svg")).unwrap();
        assert!(!print.contains("class=\"outline\""));

        assert!(is_package_dir(&request.out_dir));
        let metadata = GenerationMetadata::load_file(&request.out_dir.join(METADATA_FILE_NAME)).unwrap();
        assert_eq!(metadata.layout_path, request.layout_path);
    }

    #[test]
    fn test_package_renders_with_resolved_scales() {
        let fixture = Fixture::new();
        let temp = TempDir::new().unwrap();
        let mut request = request(temp.path(), THEME);
        request.scale = Some(2.0);
        request.scales.print_scale = Some(3.0);
        let inputs = PackageInputs::load(&request).unwrap();
        let rasterizer = RecordingRasterizer {
            scales: RefCell::new(Vec::new()),
        };

        let report = package_keycaps(
            &request,
            &inputs,
            &fixture.fonts,
            &fixture.icons,
            PackageOptions {
                rasterizer: Some(&rasterizer),
                inkscape: None,
            },
        )
        .unwrap();

        assert_eq!(*rasterizer.scales.borrow(), [2.0, 2.0, 2.0, 3.0]);
        assert!(temp.path().join("out/print.png").is_file());
        assert_eq!(report.files.len(), 9);
    }

    #[test]
    fn test_invalid_theme_is_reported_before_output() {
        let temp = TempDir::new().unwrap();
        let theme = THEME.replace("font_family: \"Test Sans\",", "");
        let request = request(temp.path(), &theme);

        let err = PackageInputs::load(&request).unwrap_err();
        let violation = err.downcast_ref::<SchemaViolation>().unwrap();
        assert!(violation.report.has_error_for("font_family"));
        assert!(!request.out_dir.exists());
    }

    #[test]
    fn test_unknown_key_color_fails_validation() {
        let temp = TempDir::new().unwrap();
        let request = request(temp.path(), THEME);
        std::fs::write(&request.layout_path, r#"[[{"a": 7, "c": "purple"}, "A"]]"#).unwrap();

        let err = PackageInputs::load(&request).unwrap_err();
        assert!(err.downcast_ref::<SchemaViolation>().is_some());
    }

    #[test]
    fn test_effective_scales() {
        let request = PackageRequest {
            layout_path: PathBuf::new(),
            theme_path: PathBuf::new(),
            templates_path: PathBuf::new(),
            out_dir: PathBuf::new(),
            scale: Some(2.0),
            scales: ScaleArgs {
                texture_scale: Some(0.5),
                ..ScaleArgs::default()
            },
        };
        let args = request.effective_scales();
        assert_eq!(args.texture_scale, Some(0.5));
        assert_eq!(args.preview_scale, Some(2.0));
        assert_eq!(args.overview_scale, Some(2.0));
    }
}
