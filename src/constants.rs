//! Application-wide constants.
//!
//! This module defines the application name and the fixed numbers the
//! keycap pipeline relies on.

/// The display name of the application (human-readable, with proper capitalization).
pub const APP_NAME: &str = "Kittencaps";

/// The binary name of the application (used in command examples).
pub const APP_BINARY_NAME: &str = "kittencaps";

/// Name of the project configuration file searched for in the working directory and its ancestors.
pub const CONFIG_FILE_NAME: &str = "kittencaps.toml";

/// Padding in px added around the bounds of all keys in a composed keyboard document.
pub const KEYBOARD_PADDING: f64 = 40.0;

/// Maximum row width in u when packing keys for printing.
pub const PRINT_MAX_ROW_WIDTH: f64 = 10.0;

/// Side length in px of a 1u icon's view box.
pub const ICON_UNIT_PX: f64 = 100.0;

/// Largest pixmap side length the rasterizer accepts.
pub const MAX_RENDER_DIMENSION: u32 = 16_384;

/// Id of the `<defs>` element holding the palette swatches.
pub const PALETTE_DEFS_ID: &str = "palette-colors";

/// Color name used for icon text when a key doesn't specify one.
pub const DEFAULT_FOREGROUND: &str = "fg_main";

/// Color name used for icon backgrounds when none is given.
pub const DEFAULT_BACKGROUND: &str = "bg_main";
