//! Note vaults.
//!
//! A vault is a tree of Markdown notes addressed by vault-relative paths
//! using `/` separators, such as `stacks/Jellyfin.md`.
//!
//! | Implementation | Backing |
//! |----------------|---------|
//! | [`FilesystemVault`] | A directory on disk |
//! | [`MemoryVault`] | An in-process map, used by tests |

mod filesystem;
mod frontmatter;
mod memory;

pub use filesystem::FilesystemVault;
pub use frontmatter::{Frontmatter, FrontmatterParser};
pub use memory::MemoryVault;

use serde_yaml_ng::Value;

use crate::Result;

/// Note storage used by the synchronizer.
///
/// Implementations must be safe to share across the scoped worker threads
/// that scan and rewrite notes.
pub trait Vault: Send + Sync {
    /// Reads a note's full text.
    ///
    /// # Errors
    ///
    /// Returns an error if the note does not exist or cannot be read.
    fn read(&self, path: &str) -> Result<String>;

    /// Replaces the text of an existing note.
    ///
    /// # Errors
    ///
    /// Returns an error if the note cannot be written.
    fn write(&self, path: &str, content: &str) -> Result<()>;

    /// Creates a new note, including missing parent folders.
    ///
    /// # Errors
    ///
    /// Returns an error if a note already exists at `path` or the write fails.
    fn create(&self, path: &str, content: &str) -> Result<()>;

    /// Returns `true` if a note exists at `path`.
    fn exists(&self, path: &str) -> bool;

    /// Lists the Markdown notes whose path starts with `prefix`, sorted.
    ///
    /// The prefix is compared as a plain string, so `stacks` also matches
    /// `stacks-archive/Old.md`.
    ///
    /// # Errors
    ///
    /// Returns an error if the vault cannot be enumerated.
    fn list(&self, prefix: &str) -> Result<Vec<String>>;

    /// Reads a note's frontmatter.
    ///
    /// # Errors
    ///
    /// Returns an error if the note cannot be read or its frontmatter is malformed.
    fn frontmatter(&self, path: &str) -> Result<Frontmatter> {
        let content = self.read(path)?;
        FrontmatterParser::parse(&content).map(|(frontmatter, _)| frontmatter)
    }

    /// Sets one frontmatter key of a note, leaving its body and other keys intact.
    ///
    /// # Errors
    ///
    /// Returns an error if the note cannot be read, parsed or written.
    fn set_frontmatter(&self, path: &str, key: &str, value: Value) -> Result<()> {
        let content = self.read(path)?;
        let updated = FrontmatterParser::update(&content, |frontmatter| {
            frontmatter.set(key, value);
        })?;
        self.write(path, &updated)
    }
}

/// Joins a folder and a file name into a vault path.
///
/// An empty folder yields the bare file name; trailing slashes are ignored.
#[must_use]
pub fn join_path(folder: &str, file_name: &str) -> String {
    let folder = folder.trim_end_matches('/');
    if folder.is_empty() {
        file_name.to_string()
    } else {
        format!("{folder}/{file_name}")
    }
}
