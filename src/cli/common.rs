//! Shared CLI plumbing: error kinds, exit codes and project loading.

use clap::Args;
use std::fmt;
use std::path::PathBuf;

use crate::config::Config;
use crate::models::ScaleArgs;
use crate::schema::SchemaViolation;
use crate::services::MissingTool;

/// Process exit codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    /// Command completed
    Success = 0,
    /// Invalid input: theme, layout, metadata or arguments
    ValidationError = 1,
    /// A file couldn't be read, parsed or written
    IoError = 2,
    /// An external program isn't installed
    MissingTool = 3,
}

impl ExitCode {
    /// Numeric code passed to [`std::process::exit`].
    #[must_use]
    pub const fn code(self) -> i32 {
        self as i32
    }
}

/// Category of a CLI failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CliErrorKind {
    /// Invalid input
    Validation,
    /// File system or parse failure
    Io,
    /// An external program isn't installed
    MissingTool,
}

/// A failed command.
#[derive(Debug, Clone)]
pub struct CliError {
    /// Failure category, which selects the exit code
    pub kind: CliErrorKind,
    /// Message printed to stderr
    pub message: String,
}

impl CliError {
    /// Invalid input.
    pub fn validation(message: impl Into<String>) -> Self {
        Self {
            kind: CliErrorKind::Validation,
            message: message.into(),
        }
    }

    /// File system or parse failure.
    pub fn io(message: impl Into<String>) -> Self {
        Self {
            kind: CliErrorKind::Io,
            message: message.into(),
        }
    }

    /// An external program isn't installed.
    pub fn missing_tool(message: impl Into<String>) -> Self {
        Self {
            kind: CliErrorKind::MissingTool,
            message: message.into(),
        }
    }

    /// Classifies a library error: schema violations are validation
    /// errors, missing programs are missing-tool errors, anything else is
    /// an I/O error.
    pub fn from_anyhow(context: &str, error: &anyhow::Error) -> Self {
        let message = format!("{context}: {error:#}");
        if error.chain().any(|cause| cause.is::<MissingTool>()) {
            Self::missing_tool(message)
        } else if error.chain().any(|cause| cause.is::<SchemaViolation>()) {
            Self::validation(message)
        } else {
            Self::io(message)
        }
    }

    /// Exit code for this error.
    #[must_use]
    pub const fn exit_code(&self) -> ExitCode {
        match self.kind {
            CliErrorKind::Validation => ExitCode::ValidationError,
            CliErrorKind::Io => ExitCode::IoError,
            CliErrorKind::MissingTool => ExitCode::MissingTool,
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

/// Result of a CLI command.
pub type CliResult<T> = Result<T, CliError>;

/// Loads the configuration of the project around the working directory.
///
/// # Errors
///
/// Returns an I/O error if the working directory is unavailable or the
/// config file can't be loaded.
pub fn load_project_config() -> CliResult<Config> {
    let cwd = std::env::current_dir()
        .map_err(|e| CliError::io(format!("Failed to determine working directory: {e}")))?;
    Config::discover(&cwd).map_err(|e| CliError::io(format!("Failed to load configuration: {e:#}")))
}

/// `path`, or the configured default when it isn't given.
#[must_use]
pub fn path_or(path: Option<&PathBuf>, default: PathBuf) -> PathBuf {
    path.cloned().unwrap_or(default)
}

/// Render scale flags shared by the generating commands.
#[derive(Debug, Clone, Copy, Default, Args)]
pub struct ScaleOptions {
    /// Scale every generated image by this factor (default: the layout's `scale`)
    #[arg(long, value_name = "SCALE")]
    pub scale: Option<f64>,

    /// Scale of preview.png; overrides --scale
    #[arg(long, value_name = "SCALE")]
    pub preview_scale: Option<f64>,

    /// Scale of texture.png; overrides --scale
    #[arg(long, value_name = "SCALE")]
    pub texture_scale: Option<f64>,

    /// Scale of the print-outlined images; overrides --scale
    #[arg(long, value_name = "SCALE")]
    pub print_outlined_scale: Option<f64>,

    /// Scale of the print images; overrides --scale
    #[arg(long, value_name = "SCALE")]
    pub print_scale: Option<f64>,

    /// Scale of the archive's overview.png; overrides --scale
    #[arg(long, value_name = "SCALE")]
    pub overview_scale: Option<f64>,
}

impl ScaleOptions {
    /// Rejects scales that aren't positive numbers.
    ///
    /// # Errors
    ///
    /// Returns a validation error naming the flag.
    pub fn validate(&self) -> CliResult<()> {
        let flags = [
            ("--scale", self.scale),
            ("--preview-scale", self.preview_scale),
            ("--texture-scale", self.texture_scale),
            ("--print-outlined-scale", self.print_outlined_scale),
            ("--print-scale", self.print_scale),
            ("--overview-scale", self.overview_scale),
        ];
        for (flag, value) in flags {
            if let Some(value) = value {
                if !value.is_finite() || value <= 0.0 {
                    return Err(CliError::validation(format!(
                        "{flag} must be a positive number, got {value}"
                    )));
                }
            }
        }
        Ok(())
    }

    /// Per-variant overrides, without the `--scale` fallback.
    #[must_use]
    pub const fn overrides(&self) -> ScaleArgs {
        ScaleArgs {
            preview_scale: self.preview_scale,
            texture_scale: self.texture_scale,
            print_outlined_scale: self.print_outlined_scale,
            print_scale: self.print_scale,
            overview_scale: self.overview_scale,
        }
    }
}
