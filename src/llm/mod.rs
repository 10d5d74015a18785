//! LLM client abstraction.
//!
//! Provides a provider-neutral completion interface and the OpenAI-compatible
//! chat completions client used for stack descriptions and tags.

mod openai;

pub use openai::OpenAiClient;

use serde_json::Value;

use crate::{Error, Result};

/// One completion call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompletionRequest<'a> {
    /// Optional system instruction.
    pub system: Option<&'a str>,
    /// User message.
    pub user: &'a str,
    /// Sampling temperature; provider default when `None`.
    pub temperature: Option<f32>,
    /// Output token cap; provider default when `None`.
    pub max_tokens: Option<u32>,
}

impl<'a> CompletionRequest<'a> {
    /// Creates a request with only a user message.
    #[must_use]
    pub const fn new(user: &'a str) -> Self {
        Self {
            system: None,
            user,
            temperature: None,
            max_tokens: None,
        }
    }

    /// Sets the system instruction.
    #[must_use]
    pub const fn with_system(mut self, system: &'a str) -> Self {
        self.system = Some(system);
        self
    }

    /// Sets the sampling temperature.
    #[must_use]
    pub const fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Sets the output token cap.
    #[must_use]
    pub const fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }
}

/// A named JSON schema constraining structured output.
#[derive(Debug, Clone, PartialEq)]
pub struct JsonSchema {
    /// Schema name reported to the provider.
    pub name: String,
    /// The JSON schema document.
    pub schema: Value,
}

impl JsonSchema {
    /// Creates a named schema.
    #[must_use]
    pub fn new(name: impl Into<String>, schema: Value) -> Self {
        Self {
            name: name.into(),
            schema,
        }
    }
}

/// Trait for LLM providers.
pub trait LlmProvider: Send + Sync {
    /// The provider name.
    fn name(&self) -> &'static str;

    /// Generates a completion for `request`.
    ///
    /// # Errors
    ///
    /// Returns an error if the completion fails.
    fn complete_request(&self, request: &CompletionRequest<'_>) -> Result<String>;

    /// Generates a completion for the given prompt.
    ///
    /// # Errors
    ///
    /// Returns an error if the completion fails.
    fn complete(&self, prompt: &str) -> Result<String> {
        self.complete_request(&CompletionRequest::new(prompt))
    }

    /// Generates a JSON object conforming to `schema`.
    ///
    /// The default implementation describes the schema in the system prompt
    /// and extracts JSON from the reply. Providers with native structured
    /// output should override it.
    ///
    /// # Errors
    ///
    /// Returns an error if the completion fails or the reply is not JSON.
    fn complete_json(&self, request: &CompletionRequest<'_>, schema: &JsonSchema) -> Result<Value> {
        let system = format!(
            "{}\n\nRespond only with a JSON object matching this JSON schema:\n{}",
            request.system.unwrap_or_default(),
            schema.schema
        );
        let response = self.complete_request(&CompletionRequest {
            system: Some(system.trim_start()),
            ..*request
        })?;
        parse_json_response(&response)
    }
}

/// Parses a JSON value out of an LLM reply.
///
/// # Errors
///
/// Returns an error if no valid JSON can be found.
pub fn parse_json_response(response: &str) -> Result<Value> {
    let json_str = extract_json_from_response(response);
    serde_json::from_str(json_str).map_err(|e| Error::OperationFailed {
        operation: "parse_llm_json".to_string(),
        cause: format!("Invalid JSON: {e}. Response: {response}"),
    })
}

/// Extracts JSON from LLM response, handling markdown code blocks.
fn extract_json_from_response(response: &str) -> &str {
    let trimmed = response.trim();

    if let Some(start) = trimmed.find("```json") {
        let json_start = start + "```json".len();
        if let Some(end) = trimmed[json_start..].find("```") {
            return trimmed[json_start..json_start + end].trim();
        }
    }

    if let Some(start) = trimmed.find("```") {
        let content_start = start + 3;
        let json_start = trimmed[content_start..]
            .find('{')
            .map_or(content_start, |pos| content_start + pos);
        if let Some(end) = trimmed[json_start..].find("```") {
            return trimmed[json_start..json_start + end].trim();
        }
    }

    if let (Some(start), Some(end)) = (trimmed.find('{'), trimmed.rfind('}'))
        && start < end
    {
        return &trimmed[start..=end];
    }

    trimmed
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Mutex;

    #[test]
    fn test_extract_json_raw() {
        let response = r#"{"key": "value"}"#;
        assert_eq!(extract_json_from_response(response), r#"{"key": "value"}"#);
    }

    #[test]
    fn test_extract_json_markdown() {
        let response = "```json\n{\"tags\": [\"media\"]}\n```";
        assert_eq!(extract_json_from_response(response), "{\"tags\": [\"media\"]}");
    }

    #[test]
    fn test_extract_json_with_prefix() {
        let response = "Here you go: {\"key\": \"value\"} hope this helps";
        assert_eq!(extract_json_from_response(response), r#"{"key": "value"}"#);
    }

    #[test]
    fn test_parse_json_response_invalid() {
        assert!(parse_json_response("no json here").is_err());
    }

    #[test]
    fn test_request_builder() {
        let request = CompletionRequest::new("hi")
            .with_system("be brief")
            .with_temperature(0.3)
            .with_max_tokens(200);

        assert_eq!(request.system, Some("be brief"));
        assert_eq!(request.user, "hi");
        assert_eq!(request.temperature, Some(0.3));
        assert_eq!(request.max_tokens, Some(200));
    }

    /// Records the last request and replies with a fixed string.
    struct EchoProvider {
        reply: String,
        last_system: Mutex<Option<String>>,
    }

    impl LlmProvider for EchoProvider {
        fn name(&self) -> &'static str {
            "echo"
        }

        fn complete_request(&self, request: &CompletionRequest<'_>) -> Result<String> {
            *self.last_system.lock().unwrap() = request.system.map(str::to_string);
            Ok(self.reply.clone())
        }
    }

    #[test]
    fn test_default_complete_json_describes_schema() {
        let provider = EchoProvider {
            reply: "```json\n{\"tags\": [\"dns\"]}\n```".to_string(),
            last_system: Mutex::new(None),
        };
        let schema = JsonSchema::new("tags", json!({"type": "object"}));

        let value = provider
            .complete_json(&CompletionRequest::new("pihole").with_system("Tag it."), &schema)
            .unwrap();

        assert_eq!(value, json!({"tags": ["dns"]}));
        let system = provider.last_system.lock().unwrap().clone().unwrap();
        assert!(system.starts_with("Tag it."));
        assert!(system.contains(r#"{"type":"object"}"#));
    }
}
