//! GitHub contents API access.
//!
//! Stacks are discovered by walking the repository tree through the
//! contents API and reading every file whose name contains `compose.yaml`.

mod client;
mod fetcher;

pub use client::GitHubClient;
pub use fetcher::{COMPOSE_FILE_MARKER, StackFetcher};

use serde::Deserialize;

use crate::Result;
use crate::models::StackFile;

/// Kind of a repository tree entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    /// A regular file.
    File,
    /// A directory.
    Dir,
    /// A symbolic link.
    Symlink,
    /// A git submodule.
    Submodule,
    /// Anything else the API may report.
    #[serde(other)]
    Other,
}

/// One entry of a directory listing.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ContentEntry {
    /// Entry kind.
    #[serde(rename = "type")]
    pub kind: EntryKind,
    /// Base name.
    pub name: String,
    /// Repository-relative path.
    pub path: String,
}

impl ContentEntry {
    /// Creates an entry.
    #[must_use]
    pub fn new(kind: EntryKind, path: impl Into<String>) -> Self {
        let path = path.into();
        let name = path.rsplit('/').next().unwrap_or_default().to_string();
        Self { kind, name, path }
    }
}

/// Read access to a repository tree.
pub trait ContentsApi: Send + Sync {
    /// Lists the entries of the directory at `path` (empty for the root).
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Transport`] on a non-success status.
    fn list_dir(&self, path: &str) -> Result<Vec<ContentEntry>>;

    /// Reads the raw text of the file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Transport`] on a non-success status.
    fn fetch_raw(&self, path: &str) -> Result<String>;
}

/// Something that yields every stack of a repository.
pub trait StackSource: Send + Sync {
    /// Fetches all stacks.
    ///
    /// # Errors
    ///
    /// Returns an error if any listing or fetch fails; no partial results.
    fn fetch_all_stacks(&self) -> Result<Vec<StackFile>>;
}
