//! Directory-backed vault.
//!
//! # Security
//!
//! Vault paths are validated before touching the disk: absolute paths and
//! `..` segments are rejected so no path can escape the vault root.

use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Component, Path, PathBuf};

use super::Vault;
use crate::{Error, Result};

/// Extension of the files a vault treats as notes.
const NOTE_SUFFIX: &str = ".md";

/// Returns `true` for Markdown note paths.
pub(super) fn is_note(path: &str) -> bool {
    path.ends_with(NOTE_SUFFIX)
}

/// Vault stored as Markdown files under a root directory.
///
/// Directories whose name starts with `.` (such as `.obsidian` or `.git`)
/// are not listed.
#[derive(Debug, Clone)]
pub struct FilesystemVault {
    root: PathBuf,
}

impl FilesystemVault {
    /// Creates a vault rooted at `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Resolves a vault path to a location under the root.
    fn resolve(&self, path: &str) -> Result<PathBuf> {
        let relative = Path::new(path);
        let valid = !path.is_empty()
            && relative
                .components()
                .all(|component| matches!(component, Component::Normal(_)));
        if !valid {
            return Err(Error::InvalidInput(format!("invalid vault path: {path}")));
        }
        Ok(self.root.join(relative))
    }

    fn collect_notes(&self, dir: &Path, prefix: &str, notes: &mut Vec<String>) -> Result<()> {
        let entries = fs::read_dir(dir).map_err(|e| Error::OperationFailed {
            operation: "read_vault_dir".to_string(),
            cause: format!("{}: {e}", dir.display()),
        })?;

        for entry in entries {
            let entry = entry.map_err(|e| Error::OperationFailed {
                operation: "read_dir_entry".to_string(),
                cause: e.to_string(),
            })?;
            let path = entry.path();
            let Some(name) = entry.file_name().to_str().map(str::to_string) else {
                tracing::debug!(path = %path.display(), "Skipping non UTF-8 file name");
                continue;
            };

            if path.is_dir() {
                if !name.starts_with('.') {
                    self.collect_notes(&path, prefix, notes)?;
                }
                continue;
            }

            if let Some(vault_path) = self.vault_path(&path)
                && is_note(&vault_path)
                && vault_path.starts_with(prefix)
            {
                notes.push(vault_path);
            }
        }

        Ok(())
    }

    /// Converts a location under the root back into a `/`-separated vault path.
    fn vault_path(&self, path: &Path) -> Option<String> {
        let relative = path.strip_prefix(&self.root).ok()?;
        let segments = relative
            .components()
            .map(|component| component.as_os_str().to_str())
            .collect::<Option<Vec<_>>>()?;
        Some(segments.join("/"))
    }
}

impl Vault for FilesystemVault {
    fn read(&self, path: &str) -> Result<String> {
        let full = self.resolve(path)?;
        fs::read_to_string(&full).map_err(|e| Error::OperationFailed {
            operation: "read_note".to_string(),
            cause: format!("{path}: {e}"),
        })
    }

    fn write(&self, path: &str, content: &str) -> Result<()> {
        let full = self.resolve(path)?;
        if !full.is_file() {
            return Err(Error::OperationFailed {
                operation: "write_note".to_string(),
                cause: format!("note not found: {path}"),
            });
        }
        fs::write(&full, content).map_err(|e| Error::OperationFailed {
            operation: "write_note".to_string(),
            cause: format!("{path}: {e}"),
        })
    }

    fn create(&self, path: &str, content: &str) -> Result<()> {
        let full = self.resolve(path)?;
        if let Some(parent) = full.parent() {
            fs::create_dir_all(parent).map_err(|e| Error::OperationFailed {
                operation: "create_note_dir".to_string(),
                cause: format!("{}: {e}", parent.display()),
            })?;
        }

        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&full)
            .map_err(|e| Error::OperationFailed {
                operation: "create_note".to_string(),
                cause: if e.kind() == ErrorKind::AlreadyExists {
                    format!("note already exists: {path}")
                } else {
                    format!("{path}: {e}")
                },
            })?;

        file.write_all(content.as_bytes())
            .map_err(|e| Error::OperationFailed {
                operation: "create_note".to_string(),
                cause: format!("{path}: {e}"),
            })
    }

    fn exists(&self, path: &str) -> bool {
        self.resolve(path).is_ok_and(|full| full.exists())
    }

    fn list(&self, prefix: &str) -> Result<Vec<String>> {
        let mut notes = Vec::new();
        if !self.root.is_dir() {
            return Err(Error::OperationFailed {
                operation: "list_notes".to_string(),
                cause: format!("vault directory not found: {}", self.root.display()),
            });
        }
        self.collect_notes(&self.root, prefix, &mut notes)?;
        notes.sort();
        Ok(notes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use test_case::test_case;

    fn vault() -> (TempDir, FilesystemVault) {
        let dir = TempDir::new().unwrap();
        let vault = FilesystemVault::new(dir.path());
        (dir, vault)
    }

    #[test]
    fn test_create_then_read_and_write() {
        let (_dir, vault) = vault();
        vault.create("stacks/Gitea.md", "one").unwrap();

        assert!(vault.exists("stacks/Gitea.md"));
        assert_eq!(vault.read("stacks/Gitea.md").unwrap(), "one");

        vault.write("stacks/Gitea.md", "two").unwrap();
        assert_eq!(vault.read("stacks/Gitea.md").unwrap(), "two");
    }

    #[test]
    fn test_create_does_not_overwrite() {
        let (_dir, vault) = vault();
        vault.create("a.md", "one").unwrap();

        let err = vault.create("a.md", "two").unwrap_err();
        assert!(err.to_string().contains("already exists"));
        assert_eq!(vault.read("a.md").unwrap(), "one");
    }

    #[test]
    fn test_write_requires_existing_note() {
        let (_dir, vault) = vault();
        assert!(vault.write("missing.md", "x").is_err());
        assert!(!vault.exists("missing.md"));
    }

    #[test]
    fn test_list_walks_tree_and_skips_hidden_dirs() {
        let (dir, vault) = vault();
        vault.create("stacks/B.md", "").unwrap();
        vault.create("stacks/nested/A.md", "").unwrap();
        vault.create("Root.md", "").unwrap();
        vault.create("stacks/notes.txt", "").unwrap();
        vault.create(".obsidian/Config.md", "").unwrap();
        assert!(dir.path().join(".obsidian/Config.md").exists());

        assert_eq!(
            vault.list("").unwrap(),
            vec!["Root.md", "stacks/B.md", "stacks/nested/A.md"]
        );
        assert_eq!(
            vault.list("stacks/").unwrap(),
            vec!["stacks/B.md", "stacks/nested/A.md"]
        );
    }

    #[test]
    fn test_list_missing_root_fails() {
        let vault = FilesystemVault::new("/nonexistent/stacknotes-vault");
        assert!(vault.list("").is_err());
    }

    #[test_case("../escape.md"; "parent")]
    #[test_case("a/../../escape.md"; "nested parent")]
    #[test_case("/etc/passwd"; "absolute")]
    #[test_case(""; "empty")]
    fn test_rejects_unsafe_paths(path: &str) {
        let (_dir, vault) = vault();
        assert!(vault.read(path).is_err());
        assert!(vault.create(path, "x").is_err());
        assert!(!vault.exists(path));
    }
}
