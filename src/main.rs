//! Kittencaps - keycap artwork generator
//!
//! Turns keyboard-layout-editor layouts and color themes into SVG and PNG
//! keycap sets ready for previewing, texturing and printing.

use clap::{Parser, Subcommand};
use kittencaps::cli::{
    CliResult, ConfigArgs, CreateIconArgs, EditIconArgs, FontBaselineArgs, GenerateIconArgs,
    GenerateKeycapsArgs, PackageArchiveArgs, SyncArgs, UpdateIconPalettesArgs, ValidateArgs,
};
use kittencaps::constants::APP_NAME;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Kittencaps - keycap artwork generator
#[derive(Parser, Debug)]
#[command(name = "kittencaps", author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print an icon template SVG
    GenerateIcon(GenerateIconArgs),
    /// Create a new icon file in the icons directory
    CreateIcon(CreateIconArgs),
    /// Open an icon in the configured editor
    EditIcon(EditIconArgs),
    /// Generate the preview, texture and print variants of a layout
    GenerateKeycaps(GenerateKeycapsArgs),
    /// Package every keycap of a layout as its own PNG in a ZIP archive
    PackageArchive(PackageArchiveArgs),
    /// Refresh the palette swatches embedded in icon files
    UpdateIconPalettes(UpdateIconPalettesArgs),
    /// Regenerate every layout × theme combination
    Sync(SyncArgs),
    /// Compute the baseline that vertically centers capital letters
    FontBaseline(FontBaselineArgs),
    /// Validate theme, layout and metadata files
    Validate(ValidateArgs),
    /// Manage the project configuration
    Config(ConfigArgs),
}

impl Commands {
    fn execute(&self) -> CliResult<()> {
        match self {
            Self::GenerateIcon(args) => args.execute(),
            Self::CreateIcon(args) => args.execute(),
            Self::EditIcon(args) => args.execute(),
            Self::GenerateKeycaps(args) => args.execute(),
            Self::PackageArchive(args) => args.execute(),
            Self::UpdateIconPalettes(args) => args.execute(),
            Self::Sync(args) => args.execute(),
            Self::FontBaseline(args) => args.execute(),
            Self::Validate(args) => args.execute(),
            Self::Config(args) => args.execute(),
        }
    }
}

fn main() {
    let cli = Cli::parse();

    // Initialize tracing; stdout is reserved for command output
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    tracing::debug!("{} v{}", APP_NAME, env!("CARGO_PKG_VERSION"));

    if let Err(e) = cli.command.execute() {
        eprintln!("✗ {e}");
        std::process::exit(e.exit_code().code());
    }
}
