//! CLI command handlers for kittencaps.
//!
//! Each command parses its arguments with clap, loads the project
//! configuration and delegates to the service layer. Failures are returned
//! as [`common::CliError`], which selects the process exit code.

pub mod archive;
pub mod common;
pub mod config;
pub mod font;
pub mod icon;
pub mod keycaps;
pub mod palettes;
pub mod sync;
pub mod validate;

// Re-export types used by main.rs and tests
pub use archive::PackageArchiveArgs;
pub use common::{CliError, CliResult, ExitCode};
pub use config::ConfigArgs;
pub use font::FontBaselineArgs;
pub use icon::{CreateIconArgs, EditIconArgs, GenerateIconArgs};
pub use keycaps::GenerateKeycapsArgs;
pub use palettes::UpdateIconPalettesArgs;
pub use sync::SyncArgs;
pub use validate::ValidateArgs;
