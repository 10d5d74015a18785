//! Stack discovery over a repository tree.

use tracing::instrument;

use super::{ContentsApi, EntryKind, StackSource};
use crate::Result;
use crate::models::StackFile;
use crate::parallel::fan_out;

/// Substring a file name must contain to be treated as a stack definition.
pub const COMPOSE_FILE_MARKER: &str = "compose.yaml";

/// Finds and reads stack definition files.
pub struct StackFetcher<'a> {
    api: &'a dyn ContentsApi,
    /// Directory the search starts from (empty for the repository root).
    root: String,
}

impl<'a> StackFetcher<'a> {
    /// Creates a fetcher searching the whole repository.
    #[must_use]
    pub fn new(api: &'a dyn ContentsApi) -> Self {
        Self {
            api,
            root: String::new(),
        }
    }

    /// Restricts the search to the subtree at `root`.
    #[must_use]
    pub fn with_root(mut self, root: impl Into<String>) -> Self {
        self.root = root.into().trim_matches('/').to_string();
        self
    }

    /// Lists repository paths whose base name contains `compose.yaml`.
    ///
    /// The tree is walked breadth-first; every directory of a level is
    /// listed concurrently.
    ///
    /// # Errors
    ///
    /// Returns the first listing error; no partial results.
    #[instrument(skip(self), fields(operation = "list_matching_files"))]
    pub fn list_matching_files(&self, path_prefix: &str) -> Result<Vec<String>> {
        let mut matches = Vec::new();
        let mut level = vec![path_prefix.to_string()];
        let mut depth = 0_usize;

        while !level.is_empty() {
            tracing::debug!(depth, directories = level.len(), "Listing tree level");
            let listings = fan_out(&level, |dir| self.api.list_dir(dir));

            let mut next = Vec::new();
            for listing in listings {
                for entry in listing? {
                    match entry.kind {
                        EntryKind::File if entry.name.contains(COMPOSE_FILE_MARKER) => {
                            matches.push(entry.path);
                        },
                        EntryKind::Dir => next.push(entry.path),
                        _ => {},
                    }
                }
            }

            level = next;
            depth += 1;
        }

        Ok(matches)
    }

    /// Reads the raw text of one file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be fetched.
    pub fn fetch_file_text(&self, path: &str) -> Result<String> {
        self.api.fetch_raw(path)
    }
}

impl StackSource for StackFetcher<'_> {
    #[instrument(skip(self), fields(operation = "fetch_all_stacks", root = %self.root))]
    fn fetch_all_stacks(&self) -> Result<Vec<StackFile>> {
        let paths = self.list_matching_files(&self.root)?;
        tracing::info!(count = paths.len(), "Found stack files");

        fan_out(&paths, |path| {
            self.fetch_file_text(path)
                .map(|content| StackFile::from_path(path, content))
        })
        .into_iter()
        .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use crate::github::ContentEntry;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// Repository tree held in memory.
    #[derive(Default)]
    struct FakeTree {
        dirs: HashMap<String, Vec<ContentEntry>>,
        files: HashMap<String, String>,
        listed: Mutex<Vec<String>>,
        failing: Option<String>,
    }

    impl FakeTree {
        fn dir(mut self, path: &str, entries: &[(EntryKind, &str)]) -> Self {
            self.dirs.insert(
                path.to_string(),
                entries
                    .iter()
                    .map(|(kind, path)| ContentEntry::new(*kind, *path))
                    .collect(),
            );
            self
        }

        fn file(mut self, path: &str, content: &str) -> Self {
            self.files.insert(path.to_string(), content.to_string());
            self
        }
    }

    impl ContentsApi for FakeTree {
        fn list_dir(&self, path: &str) -> Result<Vec<ContentEntry>> {
            self.listed.lock().unwrap().push(path.to_string());
            if self.failing.as_deref() == Some(path) {
                return Err(Error::Transport {
                    status: 500,
                    text: "boom".to_string(),
                });
            }
            self.dirs.get(path).cloned().ok_or_else(|| Error::Transport {
                status: 404,
                text: "Not Found".to_string(),
            })
        }

        fn fetch_raw(&self, path: &str) -> Result<String> {
            self.files.get(path).cloned().ok_or_else(|| Error::Transport {
                status: 404,
                text: "Not Found".to_string(),
            })
        }
    }

    fn homelab() -> FakeTree {
        FakeTree::default()
            .dir(
                "",
                &[
                    (EntryKind::File, "README.md"),
                    (EntryKind::Dir, "media"),
                    (EntryKind::Dir, "infra"),
                ],
            )
            .dir(
                "media",
                &[
                    (EntryKind::Dir, "media/jellyfin"),
                    (EntryKind::File, "media/notes.txt"),
                ],
            )
            .dir(
                "infra",
                &[
                    (EntryKind::File, "infra/docker-compose.yaml"),
                    (EntryKind::Dir, "infra/traefik"),
                    (EntryKind::Symlink, "infra/link"),
                ],
            )
            .dir(
                "media/jellyfin",
                &[(EntryKind::File, "media/jellyfin/compose.yaml")],
            )
            .dir(
                "infra/traefik",
                &[
                    (EntryKind::File, "infra/traefik/compose.yml"),
                    (EntryKind::File, "infra/traefik/compose.yaml.bak"),
                ],
            )
            .file("media/jellyfin/compose.yaml", "services: {jellyfin: {}}\n")
            .file("infra/docker-compose.yaml", "services: {infra: {}}\n")
            .file("infra/traefik/compose.yaml.bak", "old\n")
    }

    #[test]
    fn test_list_matching_files_breadth_first() {
        let tree = homelab();
        let files = StackFetcher::new(&tree).list_matching_files("").unwrap();

        assert_eq!(
            files,
            vec![
                "infra/docker-compose.yaml",
                "media/jellyfin/compose.yaml",
                "infra/traefik/compose.yaml.bak",
            ]
        );
    }

    #[test]
    fn test_list_matching_files_visits_each_dir_once() {
        let tree = homelab();
        StackFetcher::new(&tree).list_matching_files("").unwrap();

        let mut listed = tree.listed.lock().unwrap().clone();
        listed.sort();
        assert_eq!(
            listed,
            vec!["", "infra", "infra/traefik", "media", "media/jellyfin"]
        );
    }

    #[test]
    fn test_fetch_all_stacks_names_by_parent_dir() {
        let tree = homelab();
        let stacks = StackFetcher::new(&tree).fetch_all_stacks().unwrap();

        let names: Vec<_> = stacks.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["infra", "jellyfin", "traefik"]);
        assert_eq!(stacks[1].content, "services: {jellyfin: {}}\n");
    }

    #[test]
    fn test_root_restricts_search() {
        let tree = homelab();
        let stacks = StackFetcher::new(&tree)
            .with_root("/media/")
            .fetch_all_stacks()
            .unwrap();
        assert_eq!(stacks, vec![StackFile::new("jellyfin", "services: {jellyfin: {}}\n")]);
    }

    #[test]
    fn test_listing_failure_aborts() {
        let mut tree = homelab();
        tree.failing = Some("infra/traefik".to_string());

        let err = StackFetcher::new(&tree).fetch_all_stacks().unwrap_err();
        assert!(matches!(err, Error::Transport { status: 500, .. }));
    }

    #[test]
    fn test_fetch_failure_aborts() {
        let tree = homelab().dir("", &[(EntryKind::File, "compose.yaml")]);
        let err = StackFetcher::new(&tree).fetch_all_stacks().unwrap_err();
        assert!(matches!(err, Error::Transport { status: 404, .. }));
    }

    #[test]
    fn test_root_level_file_is_unknown_stack() {
        let tree = FakeTree::default()
            .dir("", &[(EntryKind::File, "compose.yaml")])
            .file("compose.yaml", "services: {}\n");
        let stacks = StackFetcher::new(&tree).fetch_all_stacks().unwrap();
        assert_eq!(stacks, vec![StackFile::new("unknown", "services: {}\n")]);
    }
}
