//! YAML frontmatter parsing.
//!
//! A note's frontmatter is the YAML mapping between a leading `---` line and
//! the next line that is exactly `---`:
//! ```text
//! ---
//! stackName: jellyfin
//! tags: [media]
//! ---
//! # Jellyfin
//! ```

use serde_yaml_ng::{Mapping, Value};

use crate::{Error, Result};

/// The frontmatter delimiter line.
const DELIMITER: &str = "---";

/// The key/value mapping of a note's frontmatter.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Frontmatter {
    values: Mapping,
}

impl Frontmatter {
    /// Creates empty frontmatter.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the value at `key` if it is a string.
    ///
    /// Numbers, lists and other non-string values count as absent.
    #[must_use]
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.values.get(key).and_then(Value::as_str)
    }

    /// Returns `true` if `key` is declared, whatever its value.
    #[must_use]
    pub fn has_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Sets `key` to `value`, keeping the position of an existing key.
    pub fn set(&mut self, key: &str, value: impl Into<Value>) {
        self.values.insert(Value::from(key), value.into());
    }

    /// Returns `true` when no keys are declared.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Parser for the YAML frontmatter of notes.
pub struct FrontmatterParser;

impl FrontmatterParser {
    /// Splits `content` into its frontmatter and body.
    ///
    /// Content without a leading `---` line has empty frontmatter and is
    /// returned whole as the body.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] if the closing delimiter is missing or
    /// the YAML is malformed or not a mapping.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use stacknotes::vault::FrontmatterParser;
    ///
    /// let (frontmatter, body) = FrontmatterParser::parse("---\nstackName: gitea\n---\n# Gitea\n").unwrap();
    /// assert_eq!(frontmatter.get_str("stackName"), Some("gitea"));
    /// assert_eq!(body, "# Gitea\n");
    /// ```
    pub fn parse(content: &str) -> Result<(Frontmatter, &str)> {
        let Some(after_open) = strip_delimiter_line(content) else {
            return Ok((Frontmatter::new(), content));
        };

        let (yaml, body) = split_at_closing(after_open).ok_or_else(|| {
            Error::InvalidInput("frontmatter missing closing delimiter".to_string())
        })?;

        let values = match serde_yaml_ng::from_str::<Value>(yaml)
            .map_err(|e| Error::InvalidInput(format!("invalid YAML frontmatter: {e}")))?
        {
            Value::Mapping(values) => values,
            Value::Null => Mapping::new(),
            _ => {
                return Err(Error::InvalidInput(
                    "frontmatter is not a key/value mapping".to_string(),
                ));
            },
        };

        Ok((Frontmatter { values }, body))
    }

    /// Writes `frontmatter` in front of `body`.
    ///
    /// Empty frontmatter yields the body unchanged.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn serialize(frontmatter: &Frontmatter, body: &str) -> Result<String> {
        if frontmatter.is_empty() {
            return Ok(body.to_string());
        }

        let yaml =
            serde_yaml_ng::to_string(&frontmatter.values).map_err(|e| Error::OperationFailed {
                operation: "serialize_frontmatter".to_string(),
                cause: e.to_string(),
            })?;

        Ok(format!("{DELIMITER}\n{yaml}{DELIMITER}\n{body}"))
    }

    /// Parses `content`, lets `update` edit the frontmatter, and writes it back.
    ///
    /// # Errors
    ///
    /// Returns an error if parsing or serialization fails.
    pub fn update(content: &str, update: impl FnOnce(&mut Frontmatter)) -> Result<String> {
        let (mut frontmatter, body) = Self::parse(content)?;
        update(&mut frontmatter);
        Self::serialize(&frontmatter, body)
    }
}

/// Returns the text after a leading `---` line.
fn strip_delimiter_line(content: &str) -> Option<&str> {
    let rest = content.strip_prefix(DELIMITER)?;
    rest.strip_prefix('\n')
        .or_else(|| rest.strip_prefix("\r\n"))
}

/// Splits at the first line that is exactly `---`, returning the YAML before
/// it and the body after it.
fn split_at_closing(text: &str) -> Option<(&str, &str)> {
    let mut offset = 0;
    for line in text.split_inclusive('\n') {
        if line.trim_end_matches(['\r', '\n']) == DELIMITER {
            return Some((&text[..offset], &text[offset + line.len()..]));
        }
        offset += line.len();
    }
    None
}
