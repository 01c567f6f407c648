//! External programs: Inkscape and the icon editor.

use anyhow::{bail, Context, Result};
use std::fmt;
use std::path::Path;
use std::process::{Command, Stdio};

/// A configured external program that could not be started.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingTool {
    /// Human-readable tool name
    pub tool: String,
    /// The command that failed to start
    pub command: String,
    /// Config key that selects the command
    pub config_key: String,
}

impl fmt::Display for MissingTool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} was not found (tried '{}'). Install it or set `{}` in kittencaps.toml",
            self.tool, self.command, self.config_key
        )
    }
}

impl std::error::Error for MissingTool {}

/// An external program invoked through a configurable command line.
///
/// The command may carry leading arguments, e.g. `flatpak run org.inkscape.Inkscape`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalTool {
    name: String,
    command: String,
    config_key: String,
}

impl ExternalTool {
    /// Creates a tool description.
    pub fn new(name: impl Into<String>, command: impl Into<String>, config_key: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            command: command.into(),
            config_key: config_key.into(),
        }
    }

    /// Inkscape, as configured by `tools.inkscape`.
    pub fn inkscape(command: &str) -> Self {
        Self::new("Inkscape", command, "tools.inkscape")
    }

    /// The icon editor, as configured by `tools.editor`.
    pub fn editor(command: &str) -> Self {
        Self::new("Icon editor", command, "tools.editor")
    }

    /// Tool name.
    pub fn name(&self) -> &str {
        &self.name
    }

    fn command(&self) -> Result<Command> {
        let mut parts = self.command.split_whitespace();
        let Some(program) = parts.next() else {
            bail!("No command configured for {} (`{}`)", self.name, self.config_key);
        };
        let mut command = Command::new(program);
        command.args(parts);
        Ok(command)
    }

    /// Runs the tool to completion with `args`, discarding its stderr when
    /// `quiet` is set.
    ///
    /// # Errors
    ///
    /// Returns a [`MissingTool`] error if the program can't be found, or an
    /// error if it exits unsuccessfully.
    pub fn run<I, S>(&self, args: I, quiet: bool) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<std::ffi::OsStr>,
    {
        let mut command = self.command()?;
        command.args(args);
        if quiet {
            command.stderr(Stdio::null());
        }
        tracing::debug!("Running {:?}", command);

        let status = match command.status() {
            Ok(status) => status,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(MissingTool {
                    tool: self.name.clone(),
                    command: self.command.clone(),
                    config_key: self.config_key.clone(),
                }
                .into());
            }
            Err(e) => {
                return Err(e).context(format!("Failed to execute '{}'", self.command));
            }
        };

        if !status.success() {
            bail!("{} exited with {status}", self.name);
        }
        Ok(())
    }
}

/// Converts all text in the SVG file at `path` to paths, in place.
///
/// # Errors
///
/// Returns an error if Inkscape is missing or fails.
pub fn convert_text_to_paths(inkscape: &ExternalTool, path: &Path) -> Result<()> {
    tracing::info!("Converting all text to paths in {}", path.display());
    inkscape
        .run(
            [
                path.as_os_str(),
                "--export-text-to-path".as_ref(),
                "--export-plain-svg".as_ref(),
                "-o".as_ref(),
                path.as_os_str(),
            ],
            true,
        )
        .context(format!("Failed to convert text to paths in {}", path.display()))
}

/// Opens `path` in the icon editor and waits for it to exit.
///
/// # Errors
///
/// Returns an error if the file doesn't exist or the editor can't be run.
pub fn open_in_editor(editor: &ExternalTool, path: &Path) -> Result<()> {
    if !path.is_file() {
        bail!("File not found: {}", path.display());
    }
    tracing::info!("Opening {} with {}", path.display(), editor.name());
    editor.run([path.as_os_str()], false)
}
