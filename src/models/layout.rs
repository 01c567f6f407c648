//! Keyboard layout data model.
//!
//! A [`Keyboard`] is the in-memory form of a keyboard-layout-editor (KLE)
//! document plus the Kittencaps extensions stored in its metadata object.

use super::geometry::{KeycapGeometry, Vec2};

/// Number of label slots on a KLE key.
pub const LABEL_SLOTS: usize = 12;

/// Label slot holding the central legend, which selects the keycap icon.
pub const CENTER_LABEL: usize = 4;

/// A single key as laid out in KLE.
#[derive(Debug, Clone, PartialEq)]
pub struct Key {
    /// Left edge in u (before rotation)
    pub x: f64,
    /// Top edge in u (before rotation)
    pub y: f64,
    /// Width in u
    pub width: f64,
    /// Height in u
    pub height: f64,
    /// Clockwise rotation in degrees
    pub rotation_angle: f64,
    /// Rotation origin x in u
    pub rotation_x: f64,
    /// Rotation origin y in u
    pub rotation_y: f64,
    /// Legends, reordered into KLE's 12 canonical slots
    pub labels: Vec<String>,
    /// Keycap color name (the KLE `c` property)
    pub color: String,
    /// Default legend color (first line of the KLE `t` property)
    pub default_text_color: String,
}

impl Default for Key {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            width: 1.0,
            height: 1.0,
            rotation_angle: 0.0,
            rotation_x: 0.0,
            rotation_y: 0.0,
            labels: vec![String::new(); LABEL_SLOTS],
            color: Key::DEFAULT_COLOR.to_string(),
            default_text_color: Key::DEFAULT_TEXT_COLOR.to_string(),
        }
    }
}

impl Key {
    /// KLE's default keycap color.
    pub const DEFAULT_COLOR: &'static str = "#cccccc";
    /// KLE's default legend color.
    pub const DEFAULT_TEXT_COLOR: &'static str = "#000000";

    /// The central legend.
    #[must_use]
    pub fn center_label(&self) -> &str {
        self.labels.get(CENTER_LABEL).map_or("", String::as_str)
    }

    /// Position of the key's top-left corner in u, after applying its rotation.
    #[must_use]
    pub fn resolved_position(&self) -> Vec2 {
        Vec2::new(self.x, self.y).rotate_around(
            Vec2::new(self.rotation_x, self.rotation_y),
            self.rotation_angle,
        )
    }

    /// Keycap geometry, or `None` if neither dimension is 1u.
    #[must_use]
    pub fn geometry(&self) -> Option<KeycapGeometry> {
        KeycapGeometry::from_dimensions(self.width, self.height)
    }
}

/// A parsed layout.
#[derive(Debug, Clone, PartialEq)]
pub struct Keyboard {
    /// Layout name from the KLE metadata
    pub name: String,
    /// Layout author from the KLE metadata
    pub author: String,
    /// Extra space in px around every icon (`iconMargin`)
    pub icon_margin: f64,
    /// Default render scale (`scale`)
    pub scale: f64,
    /// Keys in document order
    pub keys: Vec<Key>,
}

impl Default for Keyboard {
    fn default() -> Self {
        Self {
            name: String::new(),
            author: String::new(),
            icon_margin: 0.0,
            scale: 1.0,
            keys: Vec::new(),
        }
    }
}
