//! # Stacknotes
//!
//! Keeps a Markdown notes vault in step with the container stacks kept in a
//! GitHub repository.
//!
//! Every directory in the repository that holds a `compose.yaml` is a *stack*.
//! Stacknotes fetches them, finds the notes whose frontmatter names a stack,
//! and rewrites the note's fenced `compose.yaml` block with the current file.
//! Stacks without a note can be turned into new notes from a template,
//! optionally with an LLM-written description and tags.
//!
//! ## Features
//!
//! - Breadth-first, parallel discovery of stacks through the GitHub contents API
//! - Frontmatter-driven matching of notes to stacks
//! - Template rendering with `{{stackContent}}`, `{{stackName}}`, `{{about}}` and
//!   `{{date:FORMAT}}` placeholders
//! - OpenAI-backed descriptions and tags that fall back to placeholders on failure
//!
//! ## Example
//!
//! ```rust,ignore
//! use stacknotes::config::Settings;
//! use stacknotes::services::NoteSynchronizer;
//! use stacknotes::vault::FilesystemVault;
//!
//! let path = Settings::default_path().ok_or("no config directory")?;
//! let settings = Settings::load_or_default(&path)?;
//! let vault = FilesystemVault::new(&settings.vault_path);
//! let sync = NoteSynchronizer::new(&vault, &settings);
//! let updated = sync.sync_matching(&stacks)?;
//! ```

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![warn(missing_docs)]
#![forbid(unsafe_code)]
// multiple_crate_versions is inherently crate-level (detects duplicate transitive dependencies).
#![allow(clippy::multiple_crate_versions)]

use thiserror::Error as ThisError;

// Module declarations
pub mod cli;
pub mod config;
pub mod github;
pub mod http;
pub mod llm;
pub mod models;
pub mod observability;
mod parallel;
pub mod rendering;
pub mod services;
pub mod vault;

// Re-exports for convenience
pub use config::Settings;
pub use llm::LlmProvider;
pub use models::StackFile;
pub use services::{NoteSynchronizer, Orchestrator, StackGenerator};
pub use vault::Vault;

/// Error type for stacknotes operations.
///
/// # Error Variant Triggers
///
/// | Variant | Raised When |
/// |---------|-------------|
/// | `InvalidInput` | Malformed frontmatter, unknown settings keys, bad setting values |
/// | `OperationFailed` | I/O errors, malformed API responses, LLM failures |
/// | `Configuration` | Template missing, repository coordinates unset |
/// | `Transport` | GitHub answered with a non-success status |
#[derive(Debug, ThisError)]
pub enum Error {
    /// Invalid input was provided.
    ///
    /// Raised when:
    /// - A note's frontmatter is not valid YAML or lacks its closing delimiter
    /// - `config set` names an unknown key or a value of the wrong type
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// An operation failed.
    ///
    /// Raised when:
    /// - Vault reads or writes fail
    /// - A response body cannot be decoded
    /// - The LLM provider call fails
    #[error("operation '{operation}' failed: {cause}")]
    OperationFailed {
        /// The operation that failed.
        operation: String,
        /// The underlying cause.
        cause: String,
    },

    /// The configuration does not allow the operation to run.
    ///
    /// Aborts the whole triggered operation; nothing is partially applied.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The remote repository answered with a non-success status.
    #[error("remote request failed with status {status}: {text}")]
    Transport {
        /// HTTP status code.
        status: u16,
        /// Response body or status text.
        text: String,
    },
}

/// Result type alias for stacknotes operations.
pub type Result<T> = std::result::Result<T, Error>;
