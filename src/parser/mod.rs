//! Parsing of layout files.
//!
//! Layouts are keyboard-layout-editor documents, read as JSON5 so that
//! hand-edited files may carry comments and trailing commas.

pub mod kle;

// Re-export commonly used functions
pub use kle::{parse_layout, parse_layout_file};
