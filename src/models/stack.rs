//! Stack files fetched from the remote repository.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Name used when a fetched path has no parent directory to name it by.
pub const UNKNOWN_STACK_NAME: &str = "unknown";

/// A compose file and the stack it belongs to.
///
/// Lives for the duration of one operation; never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StackFile {
    /// Stack identifier, the name of the directory holding the compose file.
    pub name: String,
    /// Raw text of the compose file.
    pub content: String,
}

impl StackFile {
    /// Creates a new stack file.
    #[must_use]
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
        }
    }

    /// Creates a stack file named after the directory of `path`.
    #[must_use]
    pub fn from_path(path: &str, content: impl Into<String>) -> Self {
        Self::new(stack_name_from_path(path), content)
    }
}

impl fmt::Display for StackFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Derives a stack name from a repository-relative file path.
///
/// Drops the file name and returns the last remaining segment, or
/// [`UNKNOWN_STACK_NAME`] when the file sits at the repository root.
///
/// # Examples
///
/// ```rust
/// use stacknotes::models::stack_name_from_path;
///
/// assert_eq!(stack_name_from_path("stacks/media/jellyfin/compose.yaml"), "jellyfin");
/// assert_eq!(stack_name_from_path("compose.yaml"), "unknown");
/// ```
#[must_use]
pub fn stack_name_from_path(path: &str) -> String {
    let mut segments: Vec<&str> = path.split('/').collect();
    segments.pop();
    segments
        .into_iter()
        .rev()
        .find(|segment| !segment.is_empty())
        .unwrap_or(UNKNOWN_STACK_NAME)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("stacks/jellyfin/compose.yaml", "jellyfin"; "nested")]
    #[test_case("jellyfin/docker-compose.yaml", "jellyfin"; "single level")]
    #[test_case("a/b/c/d/compose.yaml", "d"; "deep")]
    #[test_case("compose.yaml", "unknown"; "repository root")]
    #[test_case("/compose.yaml", "unknown"; "leading slash only")]
    fn test_stack_name_from_path(path: &str, expected: &str) {
        assert_eq!(stack_name_from_path(path), expected);
    }

    #[test]
    fn test_from_path() {
        let stack = StackFile::from_path("infra/traefik/compose.yaml", "services: {}");
        assert_eq!(stack.name, "traefik");
        assert_eq!(stack.content, "services: {}");
        assert_eq!(stack.to_string(), "traefik");
    }
}
