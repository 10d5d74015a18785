//! Client builders for CLI commands.

use crate::Result;
use crate::config::Settings;
use crate::github::GitHubClient;
use crate::http::{HttpConfig, build_http_client};
use crate::llm::OpenAiClient;
use crate::services::StackGenerator;

/// Builds the GitHub client for the configured repository.
///
/// # Errors
///
/// Returns [`Error::Configuration`](crate::Error::Configuration) if the
/// repository owner or name is unset.
pub fn build_github_client(settings: &Settings) -> Result<GitHubClient> {
    let (owner, repository) = settings.repository()?;
    let mut client = GitHubClient::new(owner, repository)
        .with_api_url(&settings.gh_api_url)
        .with_ref(&settings.gh_ref)
        .with_http_client(build_http_client(HttpConfig::from_settings(settings)));
    if let Some(token) = settings.github_token() {
        client = client.with_token(token);
    }
    Ok(client)
}

/// Builds an `OpenAI` client from settings.
#[must_use]
pub fn build_openai_client(settings: &Settings) -> OpenAiClient {
    let mut client = OpenAiClient::new()
        .with_endpoint(&settings.openai_endpoint)
        .with_model(&settings.openai_model)
        .with_http_client(build_http_client(HttpConfig::from_settings(settings)));
    if let Some(key) = settings.openai_key() {
        client = client.with_api_key(key);
    }
    client
}

/// Builds the stack generator.
///
/// Disabled unless `use_ai` is on and an API key is available.
#[must_use]
pub fn build_generator(settings: &Settings) -> StackGenerator {
    if !settings.use_ai {
        return StackGenerator::disabled();
    }

    let client = build_openai_client(settings);
    if client.has_api_key() {
        StackGenerator::new(Box::new(client))
    } else {
        tracing::warn!("AI generation enabled but no OpenAI API key is set");
        StackGenerator::disabled()
    }
}
