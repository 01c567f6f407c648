//! Data models for layouts, themes, colors and geometry.
//!
//! Models are independent of SVG generation and of the CLI.

pub mod geometry;
pub mod layout;
pub mod metadata;
pub mod rgb;
pub mod sp_color;
pub mod theme;

// Re-export all model types
pub use geometry::{Bounds, KeycapGeometry, Orientation, Transform, Vec2, ViewBox};
pub use layout::{Key, Keyboard};
pub use metadata::{GenerationMetadata, ResolvedScales, ScaleArgs};
pub use rgb::RgbColor;
pub use theme::{Paint, Palette, Theme};
