//! The compose fenced-block convention.
//!
//! A compose block opens with a line such as
//! `` ```yaml title=docker-compose.yml `` and closes with a line that is
//! exactly `` ``` ``. Whatever the opening line said, the block is always
//! written back in the normalized form `` ```yaml title=compose.yaml ``.

use regex::{NoExpand, Regex};
use std::sync::LazyLock;

/// Opening line written for every normalized compose block.
pub const NORMALIZED_HEADER: &str = "```yaml title=compose.yaml";

/// Matches a compose block from its opening line through its closing fence.
///
/// The language tag is case-insensitive, the title is matched exactly.
static COMPOSE_BLOCK_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?mR)^```(?i:ya?ml)[ \t]+title=(?:docker-)?compose\.ya?ml[ \t]*\r?\n(?s:.*?)^```$",
    )
    .unwrap_or_else(|_| unreachable!())
});

/// Builds the normalized block for `content`, trimmed of surrounding whitespace.
#[must_use]
pub fn normalized_block(content: &str) -> String {
    format!("{NORMALIZED_HEADER}\n{}\n```", content.trim())
}

/// Returns `true` if `text` contains at least one compose block.
#[must_use]
pub fn has_compose_block(text: &str) -> bool {
    COMPOSE_BLOCK_PATTERN.is_match(text)
}

/// Replaces the first compose block in `text`.
///
/// Returns `None` when no block matches.
#[must_use]
pub fn replace_first(text: &str, content: &str) -> Option<String> {
    if !has_compose_block(text) {
        return None;
    }
    let block = normalized_block(content);
    Some(
        COMPOSE_BLOCK_PATTERN
            .replacen(text, 1, NoExpand(&block))
            .into_owned(),
    )
}

/// Replaces every compose block in `text`.
///
/// Returns `None` when no block matches.
#[must_use]
pub fn replace_all(text: &str, content: &str) -> Option<String> {
    if !has_compose_block(text) {
        return None;
    }
    let block = normalized_block(content);
    Some(
        COMPOSE_BLOCK_PATTERN
            .replace_all(text, NoExpand(&block))
            .into_owned(),
    )
}
