//! Binary entry point for stacknotes.
//!
//! Keeps the compose blocks of a Markdown vault in step with the stacks in a
//! GitHub repository.

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(missing_docs)]
// Allow print_stderr in main binary for CLI output
#![allow(clippy::print_stderr)]
#![allow(clippy::print_stdout)]
// Allow needless_pass_by_value for command functions
#![allow(clippy::needless_pass_by_value)]
// Allow multiple crate versions from transitive dependencies
#![allow(clippy::multiple_crate_versions)]

mod commands;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use stacknotes::config::Settings;
use stacknotes::observability::{self, LoggingConfig};

use commands::ConfigAction;

/// Environment variable naming the config file.
const CONFIG_PATH_ENV: &str = "STACKNOTES_CONFIG";

/// Stacknotes - sync compose stacks from GitHub into Markdown notes.
#[derive(Parser)]
#[command(name = "stacknotes")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to configuration file.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands.
#[derive(Subcommand)]
enum Commands {
    /// Update the compose blocks of notes that name a stack.
    Sync,

    /// Create notes for stacks that have none.
    Create {
        /// Create notes for every missing stack without asking.
        #[arg(long)]
        all: bool,
    },

    /// List stacks that have no note.
    Missing,

    /// Show the note filename generated for a stack.
    Filename {
        /// Stack name.
        stack: String,
    },

    /// Manage configuration.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Main entry point.
fn main() -> ExitCode {
    let cli = Cli::parse();
    dotenvy::dotenv().ok();

    let config_path = resolve_config_path(cli.config.as_deref());
    let settings = match load_settings(config_path.as_deref()) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            return ExitCode::FAILURE;
        },
    };

    if let Err(e) = observability::init(LoggingConfig::from_settings(
        &settings.logging,
        cli.verbose,
    )) {
        eprintln!("Failed to initialize logging: {e}");
        return ExitCode::FAILURE;
    }

    match run_command(cli, settings, config_path) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        },
    }
}

/// Runs the selected command.
fn run_command(
    cli: Cli,
    settings: Settings,
    config_path: Option<PathBuf>,
) -> Result<ExitCode, Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Sync => commands::cmd_sync(&settings, cli.verbose),
        Commands::Create { all } => commands::cmd_create(&settings, all, cli.verbose),
        Commands::Missing => commands::cmd_missing(&settings).map(|()| ExitCode::SUCCESS),
        Commands::Filename { stack } => {
            commands::cmd_filename(&settings, &stack);
            Ok(ExitCode::SUCCESS)
        },
        Commands::Config { action } => {
            commands::cmd_config(settings, config_path, action).map(|()| ExitCode::SUCCESS)
        },
    }
}

/// Picks the config file: `--config`, then `STACKNOTES_CONFIG`, then the
/// platform default.
fn resolve_config_path(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }

    if let Ok(path) = std::env::var(CONFIG_PATH_ENV)
        && !path.trim().is_empty()
    {
        return Some(PathBuf::from(path));
    }

    Settings::default_path()
}

/// Loads settings, using defaults when the file does not exist yet.
fn load_settings(path: Option<&Path>) -> Result<Settings, Box<dyn std::error::Error>> {
    match path {
        Some(path) => Settings::load_or_default(path).map_err(Into::into),
        None => Ok(Settings::default()),
    }
}
