//! Fonts: lookup, cap-height metrics and `@font-face` embedding.
//!
//! Label text is centered on the cap height of `H` rather than on the
//! font's ascent/descent box, which keeps single capitals optically centered
//! on the keycap.

pub mod catalog;
pub mod metrics;

pub use catalog::{FontCatalog, FontSet};
pub use metrics::{centered_baseline, FontFace, GlyphMetrics};
