//! Note file names derived from stack names.

use chrono::{DateTime, Local, TimeZone};
use regex::Regex;
use std::sync::LazyLock;

use super::date_format::render_date_placeholders;
use crate::config::Settings;

/// Extension appended to every generated note name.
pub const NOTE_EXTENSION: &str = ".md";

static WORD_SEPARATORS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[-_\s]+").unwrap_or_else(|_| unreachable!()));

/// Turns a stack name into a title: `my-app_stack` becomes `My App Stack`.
///
/// Splits on runs of `-`, `_` and whitespace, uppercases each word's first
/// letter, lowercases the rest and joins the words with single spaces.
#[must_use]
pub fn capitalize_stack_name(name: &str) -> String {
    WORD_SEPARATORS
        .split(name)
        .filter(|word| !word.is_empty())
        .map(capitalize_word)
        .collect::<Vec<_>>()
        .join(" ")
}

fn capitalize_word(word: &str) -> String {
    let mut chars = word.chars();
    chars.next().map_or_else(String::new, |first| {
        first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect()
    })
}

/// Builds the note file name for a stack, using the current local time for
/// date placeholders in the prefix and suffix.
#[must_use]
pub fn generate_file_name(stack_name: &str, settings: &Settings) -> String {
    generate_file_name_at(stack_name, settings, &Local::now())
}

/// Builds the note file name for a stack at a fixed point in time.
#[must_use]
pub fn generate_file_name_at<Tz: TimeZone>(
    stack_name: &str,
    settings: &Settings,
    when: &DateTime<Tz>,
) -> String {
    let prefix = render_date_placeholders(&settings.file_name_prefix, when);
    let suffix = render_date_placeholders(&settings.file_name_suffix, when);
    format!(
        "{prefix}{}{suffix}{NOTE_EXTENSION}",
        capitalize_stack_name(stack_name)
    )
}
