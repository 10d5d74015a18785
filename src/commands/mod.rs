//! Command handlers.
//!
//! - `core.rs`: sync, create, missing and filename
//! - `config.rs`: configuration display and editing

mod config;
mod core;

use clap::Subcommand;

pub use config::cmd_config;
pub use core::{cmd_create, cmd_filename, cmd_missing, cmd_sync};

/// Config subcommands.
#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show current configuration with credentials redacted.
    Show,

    /// Set a configuration value.
    Set {
        /// Assignment as KEY=VALUE.
        assignment: String,
    },

    /// Print the configuration file path.
    Path,
}
