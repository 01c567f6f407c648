//! Configuration management CLI commands.

use crate::cli::common::{load_project_config, CliError, CliResult};
use crate::config::Config;
use crate::constants::{APP_BINARY_NAME, CONFIG_FILE_NAME};
use clap::{Args, Subcommand};
use serde::Serialize;

/// Configuration management commands
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    command: ConfigCommand,
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Write a default kittencaps.toml in the current directory
    Init(ConfigInitArgs),
    /// Display current configuration
    Show(ConfigShowArgs),
}

/// Write a default kittencaps.toml in the current directory
#[derive(Args, Debug)]
pub struct ConfigInitArgs {
    /// Overwrite an existing config file
    #[arg(long)]
    force: bool,
}

/// Display current configuration
#[derive(Args, Debug)]
pub struct ConfigShowArgs {
    /// Output as JSON
    #[arg(long)]
    json: bool,
}

/// JSON-serializable configuration for output
#[derive(Serialize, Debug)]
struct ConfigOutput {
    root: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    file: Option<String>,
    paths: PathsOutput,
    tools: ToolsOutput,
}

#[derive(Serialize, Debug)]
struct PathsOutput {
    icons_dir: String,
    themes_dir: String,
    layouts_dir: String,
    templates: String,
    fonts_dir: String,
    output_dir: String,
    default_theme: String,
}

#[derive(Serialize, Debug)]
struct ToolsOutput {
    editor: String,
    inkscape: String,
}

impl ConfigArgs {
    /// Execute config subcommand
    pub fn execute(&self) -> CliResult<()> {
        match &self.command {
            ConfigCommand::Init(args) => args.execute(),
            ConfigCommand::Show(args) => args.execute(),
        }
    }
}

impl ConfigInitArgs {
    /// Execute init command
    pub fn execute(&self) -> CliResult<()> {
        let cwd = std::env::current_dir()
            .map_err(|e| CliError::io(format!("Failed to read current directory: {e}")))?;
        let path = cwd.join(CONFIG_FILE_NAME);

        if path.exists() && !self.force {
            return Err(CliError::validation(format!(
                "{} already exists (use --force to overwrite)",
                path.display()
            )));
        }

        Config::new(&cwd)
            .save_to(&path)
            .map_err(|e| CliError::io(format!("Failed to save configuration: {e:#}")))?;

        println!("✓ Wrote {}", path.display());
        Ok(())
    }
}

impl ConfigShowArgs {
    /// Execute show command
    pub fn execute(&self) -> CliResult<()> {
        let config = load_project_config()?;

        if self.json {
            output_json(&config)?;
        } else {
            output_human_readable(&config);
        }

        Ok(())
    }
}

fn display(path: &std::path::Path) -> String {
    path.to_string_lossy().to_string()
}

/// Output configuration in JSON format
fn output_json(config: &Config) -> CliResult<()> {
    let output = ConfigOutput {
        root: display(&config.root),
        file: Config::find_file(&config.root).map(|p| display(&p)),
        paths: PathsOutput {
            icons_dir: display(&config.icons_dir()),
            themes_dir: display(&config.themes_dir()),
            layouts_dir: display(&config.layouts_dir()),
            templates: display(&config.templates()),
            fonts_dir: display(&config.fonts_dir()),
            output_dir: display(&config.output_dir()),
            default_theme: display(&config.default_theme()),
        },
        tools: ToolsOutput {
            editor: config.tools.editor.clone(),
            inkscape: config.tools.inkscape.clone(),
        },
    };

    let json = serde_json::to_string_pretty(&output)
        .map_err(|e| CliError::io(format!("Failed to serialize configuration to JSON: {e}")))?;

    println!("{json}");
    Ok(())
}

/// Output configuration in human-readable format
fn output_human_readable(config: &Config) {
    println!("kittencaps configuration");
    println!("========================");
    println!();

    match Config::find_file(&config.root) {
        Some(path) => println!("Config file: {}", path.display()),
        None => println!(
            "Config file: (none, using defaults; run `{} config init`)",
            APP_BINARY_NAME
        ),
    }
    println!("Project root: {}", config.root.display());
    println!();

    println!("Paths:");
    println!("  Icons:         {}", config.icons_dir().display());
    println!("  Themes:        {}", config.themes_dir().display());
    println!("  Layouts:       {}", config.layouts_dir().display());
    println!("  Templates:     {}", config.templates().display());
    println!("  Fonts:         {}", config.fonts_dir().display());
    println!("  Output:        {}", config.output_dir().display());
    println!("  Default theme: {}", config.default_theme().display());
    println!();

    println!("Tools:");
    println!("  Editor:   {}", config.tools.editor);
    println!("  Inkscape: {}", config.tools.inkscape);
    println!();
}
