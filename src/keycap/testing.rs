//! Shared fixtures for keycap unit tests.

use tempfile::TempDir;

use super::factory::KeycapAssets;
use super::icon::IconLibrary;
use super::info::KeycapInfo;
use crate::font::{FontFace, FontSet, GlyphMetrics};
use crate::models::{Key, Paint, Palette, RgbColor, Theme};
use crate::svg::SymbolSet;

pub const TEMPLATES: &str = r#"<svg xmlns="http://www.w3.org/2000/svg">
  <style>.outline { stroke-width: 2; }</style>
  <symbol id="_1u-top" viewBox="-50 -50 100 100"><path class="surface" d="M -40 -40 H 40 V 40 H -40 Z"/></symbol>
  <symbol id="_2u-top" viewBox="-50 -50 100 100"><path class="surface" d="M -90 -40 H 90 V 40 H -90 Z"/></symbol>
  <filter id="sideShading"><feFlood flood-opacity="0.2"/></filter>
</svg>"#;

/// Theme, font, templates and an empty icon directory.
pub struct Fixture {
    pub theme: Theme,
    pub fonts: FontSet,
    pub templates: SymbolSet,
    pub icons: IconLibrary,
    pub dir: TempDir,
}

impl Fixture {
    pub fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let font = FontFace {
            family: "Test Sans".to_string(),
            weight: 400,
            path: None,
            metrics: GlyphMetrics {
                units_per_em: 1000,
                cap_y_min: 0,
                cap_y_max: 700,
            },
        };
        Self {
            theme: Theme {
                font_family: "Test Sans".to_string(),
                font_weight: 400,
                font_size_px: 20.0,
                unit_size: 100.0,
                base_size: 90.0,
                top_size: 70.0,
                palette: Palette::from_entries([
                    ("bg_main", Paint::Color(RgbColor::new(0xee, 0xee, 0xee))),
                    ("fg_main", Paint::Color(RgbColor::new(0x11, 0x11, 0x11))),
                ]),
            },
            fonts: FontSet {
                default: font.clone(),
                faces: vec![font],
                embed: false,
            },
            templates: SymbolSet::parse(TEMPLATES).unwrap(),
            icons: IconLibrary::new(dir.path()),
            dir,
        }
    }

    pub fn assets(&self) -> KeycapAssets<'_> {
        KeycapAssets {
            theme: &self.theme,
            font: &self.fonts.default,
            templates: &self.templates,
            icons: &self.icons,
        }
    }

    pub fn key(&self, label: &str, width: f64, height: f64) -> Key {
        let mut key = Key {
            width,
            height,
            color: "bg_main".to_string(),
            ..Key::default()
        };
        key.labels[4] = label.to_string();
        key
    }

    pub fn info(&self, label: &str, width: f64, height: f64) -> KeycapInfo {
        KeycapInfo::from_key(&self.key(label, width, height), &self.theme.palette).unwrap()
    }
}
