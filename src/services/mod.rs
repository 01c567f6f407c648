//! Service layer: the operations behind each command.
//!
//! Services coordinate loading, keycap composition and file output. They
//! never print; progress is reported through `tracing` and results are
//! returned as report structs for the CLI to present.

pub mod archive;
pub mod external;
pub mod icon_generator;
pub mod normalize;
pub mod packager;
pub mod palette_updater;
pub mod render;
pub mod sync;

// Re-export commonly used types and functions
pub use archive::{package_archive, ArchiveReport};
pub use external::{convert_text_to_paths, open_in_editor, ExternalTool, MissingTool};
pub use icon_generator::{generate_icon_document, parse_icon_size, IconRequest};
pub use packager::{package_keycaps, PackageInputs, PackageOptions, PackageReport, PackageRequest};
pub use palette_updater::{update_icon_palettes, update_palette_in_file, PaletteUpdateReport};
pub use render::{render_svg_to_png, Rasterizer};
pub use sync::{sync_all, SyncReport};
