//! Template renderer implementation.
//!
//! Turns a note template and a stack into the text of a new note:
//! - `{{stackContent}}` is replaced with the compose file verbatim
//! - without it, the first compose block is replaced with a normalized block
//! - `{{about}}` becomes a generated description or a placeholder sentence
//! - `{{date}}` / `{{date:FORMAT}}` become the current local date
//! - `{{stackName}}` becomes the stack name
//!
//! All tokens are substituted in one pass, so text inserted for one token is
//! never rescanned for another.

use chrono::{DateTime, Local, TimeZone};
use regex::Regex;
use std::sync::LazyLock;

use super::date_format::format_placeholder;
use super::fenced_block;
use crate::models::StackFile;

/// Inserted for `{{about}}` when no description is generated.
pub const DESCRIPTION_PLACEHOLDER: &str = "Write description here";

/// Token replaced with the raw compose file.
pub const STACK_CONTENT_TOKEN: &str = "{{stackContent}}";

/// Token replaced with the stack description.
pub const ABOUT_TOKEN: &str = "{{about}}";

/// Every recognized placeholder: `stackContent`, `stackName`, `about`, `date`, `date:FORMAT`.
static TOKEN_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\{(stackContent|stackName|about|date(?::([^}]*))?)\}\}")
        .unwrap_or_else(|_| unreachable!())
});

/// Source of stack descriptions for `{{about}}`.
pub trait DescriptionSource: Send + Sync {
    /// Returns a short description of the stack. Must not fail.
    fn describe(&self, stack: &StackFile) -> String;
}

/// Template rendering engine.
#[derive(Clone, Copy, Default)]
pub struct TemplateRenderer<'a> {
    /// Set only when generation is enabled.
    descriptions: Option<&'a dyn DescriptionSource>,
}

impl std::fmt::Debug for TemplateRenderer<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TemplateRenderer")
            .field("generates_descriptions", &self.descriptions.is_some())
            .finish()
    }
}

impl<'a> TemplateRenderer<'a> {
    /// Creates a renderer that uses the placeholder sentence for `{{about}}`.
    #[must_use]
    pub const fn new() -> Self {
        Self { descriptions: None }
    }

    /// Uses `source` to fill `{{about}}`.
    #[must_use]
    pub const fn with_descriptions(mut self, source: &'a dyn DescriptionSource) -> Self {
        self.descriptions = Some(source);
        self
    }

    /// Renders `template` for `stack` at the current local time.
    #[must_use]
    pub fn render(&self, template: &str, stack: &StackFile) -> String {
        self.render_at(template, stack, &Local::now())
    }

    /// Renders `template` for `stack` with `when` as the current time.
    #[must_use]
    pub fn render_at<Tz: TimeZone>(
        &self,
        template: &str,
        stack: &StackFile,
        when: &DateTime<Tz>,
    ) -> String {
        let embeds_content = template.contains(STACK_CONTENT_TOKEN);
        let about = if template.contains(ABOUT_TOKEN) {
            self.description(stack)
        } else {
            String::new()
        };

        let substituted = TOKEN_PATTERN.replace_all(template, |caps: &regex::Captures<'_>| {
            match caps.get(1).map_or("", |m| m.as_str()) {
                "stackContent" => stack.content.clone(),
                "stackName" => stack.name.clone(),
                "about" => about.clone(),
                _ => format_placeholder(caps.get(2).map(|m| m.as_str()), when),
            }
        });

        if embeds_content {
            return substituted.into_owned();
        }

        match fenced_block::replace_first(&substituted, &stack.content) {
            Some(rendered) => rendered,
            None => {
                tracing::debug!(
                    stack = %stack.name,
                    "Template has neither {{stackContent}} nor a compose block"
                );
                substituted.into_owned()
            },
        }
    }

    fn description(&self, stack: &StackFile) -> String {
        self.descriptions.map_or_else(
            || DESCRIPTION_PLACEHOLDER.to_string(),
            |source| source.describe(stack),
        )
    }
}
