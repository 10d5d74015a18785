//! In-memory vault.

use std::collections::BTreeMap;
use std::sync::RwLock;

use super::{Vault, filesystem::is_note};
use crate::{Error, Result};

/// Vault backed by a map of path to note text.
///
/// Useful for testing and dry runs.
#[derive(Debug, Default)]
pub struct MemoryVault {
    notes: RwLock<BTreeMap<String, String>>,
}

impl MemoryVault {
    /// Creates an empty vault.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a vault holding `notes`.
    #[must_use]
    pub fn with_notes<P, C>(notes: impl IntoIterator<Item = (P, C)>) -> Self
    where
        P: Into<String>,
        C: Into<String>,
    {
        Self {
            notes: RwLock::new(
                notes
                    .into_iter()
                    .map(|(path, content)| (path.into(), content.into()))
                    .collect(),
            ),
        }
    }

    /// Returns the number of stored files.
    #[must_use]
    pub fn len(&self) -> usize {
        self.notes.read().map(|guard| guard.len()).unwrap_or(0)
    }

    /// Returns `true` if the vault holds no files.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock_error(operation: &str) -> Error {
        Error::OperationFailed {
            operation: operation.to_string(),
            cause: "vault lock poisoned".to_string(),
        }
    }
}

impl Vault for MemoryVault {
    fn read(&self, path: &str) -> Result<String> {
        let notes = self.notes.read().map_err(|_| Self::lock_error("read_note"))?;
        notes.get(path).cloned().ok_or_else(|| Error::OperationFailed {
            operation: "read_note".to_string(),
            cause: format!("note not found: {path}"),
        })
    }

    fn write(&self, path: &str, content: &str) -> Result<()> {
        let mut notes = self
            .notes
            .write()
            .map_err(|_| Self::lock_error("write_note"))?;
        match notes.get_mut(path) {
            Some(existing) => {
                content.clone_into(existing);
                Ok(())
            },
            None => Err(Error::OperationFailed {
                operation: "write_note".to_string(),
                cause: format!("note not found: {path}"),
            }),
        }
    }

    fn create(&self, path: &str, content: &str) -> Result<()> {
        let mut notes = self
            .notes
            .write()
            .map_err(|_| Self::lock_error("create_note"))?;
        if notes.contains_key(path) {
            return Err(Error::OperationFailed {
                operation: "create_note".to_string(),
                cause: format!("note already exists: {path}"),
            });
        }
        notes.insert(path.to_string(), content.to_string());
        Ok(())
    }

    fn exists(&self, path: &str) -> bool {
        self.notes
            .read()
            .map(|notes| notes.contains_key(path))
            .unwrap_or(false)
    }

    fn list(&self, prefix: &str) -> Result<Vec<String>> {
        let notes = self.notes.read().map_err(|_| Self::lock_error("list_notes"))?;
        Ok(notes
            .keys()
            .filter(|path| path.starts_with(prefix) && is_note(path))
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_read_write() {
        let vault = MemoryVault::new();
        vault.create("a.md", "one").unwrap();
        assert!(vault.exists("a.md"));
        assert_eq!(vault.read("a.md").unwrap(), "one");

        vault.write("a.md", "two").unwrap();
        assert_eq!(vault.read("a.md").unwrap(), "two");
    }

    #[test]
    fn test_create_existing_fails() {
        let vault = MemoryVault::with_notes([("a.md", "one")]);
        assert!(vault.create("a.md", "two").is_err());
        assert_eq!(vault.read("a.md").unwrap(), "one");
    }

    #[test]
    fn test_write_missing_fails() {
        let vault = MemoryVault::new();
        assert!(vault.write("missing.md", "x").is_err());
        assert!(vault.read("missing.md").is_err());
        assert!(vault.is_empty());
    }

    #[test]
    fn test_list_filters_by_prefix_and_extension() {
        let vault = MemoryVault::with_notes([
            ("stacks/B.md", ""),
            ("stacks/A.md", ""),
            ("stacks/image.png", ""),
            ("stacks-old/C.md", ""),
            ("other/D.md", ""),
        ]);

        assert_eq!(
            vault.list("stacks").unwrap(),
            vec!["stacks-old/C.md", "stacks/A.md", "stacks/B.md"]
        );
        assert_eq!(vault.list("stacks/").unwrap(), vec!["stacks/A.md", "stacks/B.md"]);
        assert_eq!(vault.list("").unwrap().len(), 4);
    }
}
