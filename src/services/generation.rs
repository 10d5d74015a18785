//! Stack description and tag generation.
//!
//! # Fallback Behavior
//!
//! Generation never fails; every problem resolves to a placeholder:
//!
//! | Condition | `describe` | `tags` | Logging |
//! |-----------|------------|--------|---------|
//! | No provider configured | `Write description here` | empty | none, no request made |
//! | Network or API error | `Write description here` | empty | WARN |
//! | Empty or malformed reply | `Write description here` | empty | WARN |
//! | Success | model text | 1-3 tags | DEBUG |

use serde::Deserialize;
use serde_json::json;
use tracing::instrument;

use crate::llm::{CompletionRequest, JsonSchema, LlmProvider};
use crate::models::StackFile;
use crate::rendering::{DESCRIPTION_PLACEHOLDER, DescriptionSource};
use crate::{Error, Result};

/// System instruction for stack descriptions.
pub const DESCRIPTION_SYSTEM_PROMPT: &str = "You document self-hosted infrastructure. \
Given a container stack name and its compose file, write a short, pragmatic description \
of what the stack is and what it is used for in a homelab or server context. \
Use 20 to 50 words of plain prose with no markdown, no headings and no marketing language.";

/// System instruction for stack tags.
pub const TAGS_SYSTEM_PROMPT: &str = "You categorize self-hosted container stacks. \
Return between one and three lowercase single-word tags describing the stack's purpose, \
such as media, monitoring, networking or storage.";

/// Sampling temperature for both calls.
const TEMPERATURE: f32 = 0.3;

/// Output token cap for descriptions.
const DESCRIPTION_MAX_TOKENS: u32 = 200;

/// Output token cap for tags.
const TAGS_MAX_TOKENS: u32 = 100;

/// Tag count bounds.
const MAX_TAGS: usize = 3;

/// Maximum characters per tag.
const MAX_TAG_CHARS: usize = 20;

/// Schema the tags reply must follow.
fn tags_schema() -> JsonSchema {
    JsonSchema::new(
        "stack_tags",
        json!({
            "type": "object",
            "properties": {
                "tags": {
                    "type": "array",
                    "items": {"type": "string", "pattern": "^.{1,20}$"},
                    "minItems": 1,
                    "maxItems": MAX_TAGS
                }
            },
            "required": ["tags"],
            "additionalProperties": false
        }),
    )
}

#[derive(Debug, Deserialize)]
struct TagsReply {
    tags: Vec<String>,
}

/// Generates stack descriptions and tags with an optional LLM provider.
#[derive(Default)]
pub struct StackGenerator {
    provider: Option<Box<dyn LlmProvider>>,
}

impl std::fmt::Debug for StackGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StackGenerator")
            .field("provider", &self.provider.as_ref().map(|p| p.name()))
            .finish()
    }
}

impl StackGenerator {
    /// Creates a generator backed by `provider`.
    #[must_use]
    pub fn new(provider: Box<dyn LlmProvider>) -> Self {
        Self {
            provider: Some(provider),
        }
    }

    /// Creates a generator that always returns the fallbacks.
    #[must_use]
    pub fn disabled() -> Self {
        Self::default()
    }

    /// Returns `true` if a provider is configured.
    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.provider.is_some()
    }

    /// Returns a 20-50 word description of the stack.
    ///
    /// Falls back to [`DESCRIPTION_PLACEHOLDER`] on any failure.
    #[instrument(skip(self, stack), fields(operation = "describe_stack", stack = %stack.name))]
    pub fn describe(&self, stack: &StackFile) -> String {
        let Some(provider) = &self.provider else {
            return DESCRIPTION_PLACEHOLDER.to_string();
        };

        match Self::try_describe(provider.as_ref(), stack) {
            Ok(description) => {
                metrics::counter!("stacknotes_generation_total", "kind" => "description", "status" => "success")
                    .increment(1);
                description
            },
            Err(e) => {
                tracing::warn!("Description generation failed, using placeholder: {e}");
                metrics::counter!("stacknotes_generation_total", "kind" => "description", "status" => "fallback")
                    .increment(1);
                DESCRIPTION_PLACEHOLDER.to_string()
            },
        }
    }

    /// Returns one to three short tags for the stack.
    ///
    /// Falls back to an empty list on any failure.
    #[instrument(skip(self, stack), fields(operation = "tag_stack", stack = %stack.name))]
    pub fn tags(&self, stack: &StackFile) -> Vec<String> {
        let Some(provider) = &self.provider else {
            return Vec::new();
        };

        match Self::try_tags(provider.as_ref(), stack) {
            Ok(tags) => {
                metrics::counter!("stacknotes_generation_total", "kind" => "tags", "status" => "success")
                    .increment(1);
                tags
            },
            Err(e) => {
                tracing::warn!("Tag generation failed, leaving tags empty: {e}");
                metrics::counter!("stacknotes_generation_total", "kind" => "tags", "status" => "fallback")
                    .increment(1);
                Vec::new()
            },
        }
    }

    fn try_describe(provider: &dyn LlmProvider, stack: &StackFile) -> Result<String> {
        let user = user_message(stack);
        let request = CompletionRequest::new(&user)
            .with_system(DESCRIPTION_SYSTEM_PROMPT)
            .with_temperature(TEMPERATURE)
            .with_max_tokens(DESCRIPTION_MAX_TOKENS);

        let description = provider.complete_request(&request)?.trim().to_string();
        if description.is_empty() {
            return Err(Error::OperationFailed {
                operation: "describe_stack".to_string(),
                cause: "empty description".to_string(),
            });
        }
        tracing::debug!(words = description.split_whitespace().count(), "Generated description");
        Ok(description)
    }

    fn try_tags(provider: &dyn LlmProvider, stack: &StackFile) -> Result<Vec<String>> {
        let user = user_message(stack);
        let request = CompletionRequest::new(&user)
            .with_system(TAGS_SYSTEM_PROMPT)
            .with_temperature(TEMPERATURE)
            .with_max_tokens(TAGS_MAX_TOKENS);

        let value = provider.complete_json(&request, &tags_schema())?;
        let reply: TagsReply = serde_json::from_value(value).map_err(|e| Error::OperationFailed {
            operation: "tag_stack".to_string(),
            cause: format!("reply does not match schema: {e}"),
        })?;

        let tags: Vec<String> = reply
            .tags
            .into_iter()
            .map(|tag| tag.trim().to_string())
            .filter(|tag| (1..=MAX_TAG_CHARS).contains(&tag.chars().count()))
            .take(MAX_TAGS)
            .collect();

        if tags.is_empty() {
            return Err(Error::OperationFailed {
                operation: "tag_stack".to_string(),
                cause: "no usable tags in reply".to_string(),
            });
        }
        tracing::debug!(?tags, "Generated tags");
        Ok(tags)
    }
}

impl DescriptionSource for StackGenerator {
    fn describe(&self, stack: &StackFile) -> String {
        Self::describe(self, stack)
    }
}

fn user_message(stack: &StackFile) -> String {
    format!(
        "Stack name: {}\n\ncompose.yaml:\n{}",
        stack.name,
        stack.content.trim()
    )
}
