//! Shared test fixtures for E2E CLI tests.
#![allow(dead_code)] // Not every test file uses every fixture

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

/// A theme that passes validation.
pub const THEME: &str = r##"{
  // comments are allowed, themes are JSON5
  "font_family": "Test Sans",
  "font_weight": 400,
  "font_size_px": 20,
  "unit_size": 100,
  "base_size": 90,
  "top_size": 70,
  "colors": { "bg_main": "#EEEEEE", "fg_main": "#111111" }
}"##;

/// A theme without `font_family`.
pub const THEME_WITHOUT_FONT: &str = r##"{
  "font_weight": 400,
  "font_size_px": 20,
  "unit_size": 100,
  "base_size": 90,
  "top_size": 70,
  "colors": { "bg_main": "#EEEEEE" }
}"##;

/// A two-row layout using only palette colors.
pub const LAYOUT: &str = r#"[
  {"iconMargin": 4},
  [{"a": 7, "c": "bg_main"}, "A", "B"],
  [{"w": 2}, "Space"]
]"#;

/// Keycap frame templates with the symbols the layouts above need.
pub const TEMPLATES: &str = r#"<svg xmlns="http://www.w3.org/2000/svg">
  <symbol id="_1u-top" viewBox="-50 -50 100 100"><path class="surface" d="M -40 -40 H 40 V 40 H -40 Z"/></symbol>
  <symbol id="_2u-top" viewBox="-50 -50 100 100"><path class="surface" d="M -90 -40 H 90 V 40 H -90 Z"/></symbol>
  <filter id="sideShading"><feFlood flood-opacity="0.2"/></filter>
</svg>"#;

/// An icon whose palette swatch is out of date.
pub const ICON: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" xmlns:inkscape="http://www.inkscape.org/namespaces/inkscape" viewBox="0 0 100 100">
  <defs id="palette-colors">
    <linearGradient id="bg_main" inkscape:swatch="solid"><stop style="stop-color:#000000;"/></linearGradient>
  </defs>
  <svg id="icon" viewBox="0 0 100 100" width="100" height="100"/>
</svg>
"##;

/// Path to the kittencaps binary.
pub fn kittencaps_bin() -> &'static str {
    env!("CARGO_BIN_EXE_kittencaps")
}

/// A project directory laid out with the default configuration paths.
pub struct TestProject {
    pub dir: TempDir,
}

impl TestProject {
    /// Creates a project with a standard theme, templates, a layout and one icon.
    pub fn new() -> Self {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let project = Self { dir };
        project.write("assets/themes/standard.json", THEME);
        project.write("assets/templates/frame-templates.svg", TEMPLATES);
        project.write("assets/layouts/small.json", LAYOUT);
        project.write("assets/icons/[dot].svg", ICON);
        project
    }

    /// Installs a generated "Test Sans" font into `assets/fonts`.
    pub fn with_font(self) -> Self {
        let path = self.path("assets/fonts/TestSans-Regular.ttf");
        fs::create_dir_all(path.parent().unwrap()).expect("Failed to create fonts directory");
        fs::write(&path, minimal_truetype("Test Sans")).expect("Failed to write font");
        self
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn path(&self, relative: &str) -> PathBuf {
        self.dir.path().join(relative)
    }

    /// Writes `content` to `relative`, creating parent directories.
    pub fn write(&self, relative: &str, content: &str) -> PathBuf {
        let path = self.path(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("Failed to create fixture directory");
        }
        fs::write(&path, content).expect("Failed to write fixture");
        path
    }

    pub fn read(&self, relative: &str) -> String {
        fs::read_to_string(self.path(relative)).expect("Failed to read project file")
    }

    /// Runs kittencaps inside the project directory.
    pub fn run(&self, args: &[&str]) -> Output {
        Command::new(kittencaps_bin())
            .args(args)
            .current_dir(self.root())
            .env_remove("RUST_LOG")
            .output()
            .expect("Failed to execute command")
    }
}

fn put_u16(out: &mut Vec<u8>, value: u16) {
    out.extend_from_slice(&value.to_be_bytes());
}

fn put_i16(out: &mut Vec<u8>, value: i16) {
    out.extend_from_slice(&value.to_be_bytes());
}

fn put_u32(out: &mut Vec<u8>, value: u32) {
    out.extend_from_slice(&value.to_be_bytes());
}

/// A regular-weight TrueType font named `family` with a single glyph:
/// `H`, a box from (100, 0) to (500, 700) at 1000 units per em.
pub fn minimal_truetype(family: &str) -> Vec<u8> {
    // cmap: one Windows Unicode BMP record with a byte encoding subtable
    let mut cmap = Vec::new();
    for value in [0, 1, 3, 1] {
        put_u16(&mut cmap, value);
    }
    put_u32(&mut cmap, 12);
    for value in [0, 262, 0] {
        put_u16(&mut cmap, value);
    }
    let mut glyph_ids = [0u8; 256];
    glyph_ids[usize::from(b'H')] = 1;
    cmap.extend_from_slice(&glyph_ids);

    // glyf: glyph 0 is empty, glyph 1 is one on-curve contour
    let mut glyf = Vec::new();
    for value in [1, 100, 0, 500, 700] {
        put_i16(&mut glyf, value);
    }
    put_u16(&mut glyf, 3); // last point of the contour
    put_u16(&mut glyf, 0); // no instructions
    glyf.extend_from_slice(&[0x01; 4]);
    for delta in [100, 400, 0, -400, 0, 0, 700, 0] {
        put_i16(&mut glyf, delta);
    }

    let mut loca = Vec::new();
    for offset in [0, 0, u32::try_from(glyf.len()).unwrap()] {
        put_u32(&mut loca, offset);
    }

    let mut head = Vec::new();
    for value in [0x0001_0000, 0x0001_0000, 0, 0x5F0F_3CF5] {
        put_u32(&mut head, value);
    }
    put_u16(&mut head, 0); // flags
    put_u16(&mut head, 1000); // units per em
    head.extend_from_slice(&[0; 16]); // created, modified
    for value in [100, 0, 500, 700, 0, 8, 2, 1, 0] {
        put_i16(&mut head, value);
    }

    let mut hhea = Vec::new();
    put_u32(&mut hhea, 0x0001_0000);
    for value in [800, -200, 0, 600, 0, 100, 500, 1, 0, 0, 0, 0, 0, 0, 0, 2] {
        put_i16(&mut hhea, value);
    }

    let mut hmtx = Vec::new();
    for value in [600, 0, 600, 100] {
        put_i16(&mut hmtx, value);
    }

    let mut maxp = Vec::new();
    put_u32(&mut maxp, 0x0000_5000);
    put_u16(&mut maxp, 2);

    let names = [(1, family.to_string()), (6, family.replace(' ', ""))];
    let mut name = Vec::new();
    let mut storage = Vec::new();
    for value in [0, 2, 6 + 12 * 2] {
        put_u16(&mut name, value);
    }
    for (id, text) in &names {
        let encoded: Vec<u8> = text.encode_utf16().flat_map(u16::to_be_bytes).collect();
        for value in [3, 1, 0x0409, *id] {
            put_u16(&mut name, value);
        }
        put_u16(&mut name, u16::try_from(encoded.len()).unwrap());
        put_u16(&mut name, u16::try_from(storage.len()).unwrap());
        storage.extend(encoded);
    }
    name.extend(storage);

    // Table records must be sorted by tag
    let tables: [(&[u8; 4], Vec<u8>); 8] = [
        (b"cmap", cmap),
        (b"glyf", glyf),
        (b"head", head),
        (b"hhea", hhea),
        (b"hmtx", hmtx),
        (b"loca", loca),
        (b"maxp", maxp),
        (b"name", name),
    ];
    let header_len = 12 + 16 * tables.len();
    let mut font = Vec::new();
    let mut body = Vec::new();
    put_u32(&mut font, 0x0001_0000);
    for value in [8, 128, 3, 0] {
        put_u16(&mut font, value);
    }
    for (tag, data) in &tables {
        font.extend_from_slice(*tag);
        put_u32(&mut font, 0);
        put_u32(&mut font, u32::try_from(header_len + body.len()).unwrap());
        put_u32(&mut font, u32::try_from(data.len()).unwrap());
        body.extend_from_slice(data);
        body.resize(body.len().next_multiple_of(4), 0);
    }
    font.extend(body);
    font
}

pub fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

pub fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}
