//! GitHub contents API client.

use reqwest::Url;
use reqwest::blocking::{Client, Response};
use reqwest::header::{ACCEPT, AUTHORIZATION, USER_AGENT};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use super::{ContentEntry, ContentsApi};
use crate::config::{DEFAULT_GITHUB_API_URL, DEFAULT_GITHUB_REF};
use crate::{Error, Result};

/// Media type for JSON directory listings.
const LISTING_MEDIA_TYPE: &str = "application/vnd.github.v3+json";

/// Media type for raw file content.
const RAW_MEDIA_TYPE: &str = "application/vnd.github.v3.raw";

/// User agent sent with every request.
const CLIENT_USER_AGENT: &str = "stacknotes";

/// Blocking GitHub contents API client.
pub struct GitHubClient {
    /// API base URL.
    api_url: String,
    /// Repository owner.
    owner: String,
    /// Repository name.
    repository: String,
    /// Branch, tag or commit queried.
    git_ref: String,
    /// Bearer token.
    token: Option<SecretString>,
    /// HTTP client.
    client: Client,
}

impl std::fmt::Debug for GitHubClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHubClient")
            .field("api_url", &self.api_url)
            .field("owner", &self.owner)
            .field("repository", &self.repository)
            .field("git_ref", &self.git_ref)
            .field("authenticated", &self.token.is_some())
            .finish_non_exhaustive()
    }
}

/// A listing is an array for directories and a single object for files.
#[derive(Deserialize)]
#[serde(untagged)]
enum Listing {
    Directory(Vec<ContentEntry>),
    File(ContentEntry),
}

impl GitHubClient {
    /// Creates a client for `owner/repository` on the public API.
    #[must_use]
    pub fn new(owner: impl Into<String>, repository: impl Into<String>) -> Self {
        Self {
            api_url: DEFAULT_GITHUB_API_URL.to_string(),
            owner: owner.into(),
            repository: repository.into(),
            git_ref: DEFAULT_GITHUB_REF.to_string(),
            token: None,
            client: Client::new(),
        }
    }

    /// Sets the API base URL.
    #[must_use]
    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }

    /// Sets the branch, tag or commit to read.
    #[must_use]
    pub fn with_ref(mut self, git_ref: impl Into<String>) -> Self {
        self.git_ref = git_ref.into();
        self
    }

    /// Sets the bearer token.
    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(SecretString::from(token.into()));
        self
    }

    /// Sets the HTTP client.
    #[must_use]
    pub fn with_http_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }

    /// Builds the contents URL for a repository path.
    fn contents_url(&self, path: &str) -> Result<Url> {
        let mut url = Url::parse(&self.api_url).map_err(|e| {
            Error::Configuration(format!("invalid GitHub API URL '{}': {e}", self.api_url))
        })?;

        url.path_segments_mut()
            .map_err(|()| {
                Error::Configuration(format!("GitHub API URL cannot be a base: {}", self.api_url))
            })?
            .pop_if_empty()
            .extend([
                "repos",
                self.owner.as_str(),
                self.repository.as_str(),
                "contents",
            ])
            .extend(path.split('/').filter(|segment| !segment.is_empty()));

        url.query_pairs_mut().append_pair("ref", &self.git_ref);
        Ok(url)
    }

    /// Sends a GET for `path` accepting `media_type`.
    fn get(&self, path: &str, media_type: &str) -> Result<Response> {
        let url = self.contents_url(path)?;
        tracing::debug!(%url, "GitHub request");

        let mut request = self
            .client
            .get(url)
            .header(ACCEPT, media_type)
            .header(USER_AGENT, CLIENT_USER_AGENT);
        if let Some(token) = &self.token {
            request = request.header(AUTHORIZATION, format!("Bearer {}", token.expose_secret()));
        }

        let response = request.send().map_err(|e| Error::OperationFailed {
            operation: "github_request".to_string(),
            cause: e.to_string(),
        })?;

        let status = response.status();
        if !status.is_success() {
            let text = response
                .text()
                .ok()
                .filter(|body| !body.is_empty())
                .unwrap_or_else(|| status.canonical_reason().unwrap_or_default().to_string());
            tracing::error!(status = status.as_u16(), %text, path, "GitHub request failed");
            return Err(Error::Transport {
                status: status.as_u16(),
                text,
            });
        }

        Ok(response)
    }
}

impl ContentsApi for GitHubClient {
    fn list_dir(&self, path: &str) -> Result<Vec<ContentEntry>> {
        let listing: Listing =
            self.get(path, LISTING_MEDIA_TYPE)?
                .json()
                .map_err(|e| Error::OperationFailed {
                    operation: "github_listing".to_string(),
                    cause: e.to_string(),
                })?;

        Ok(match listing {
            Listing::Directory(entries) => entries,
            Listing::File(entry) => vec![entry],
        })
    }

    fn fetch_raw(&self, path: &str) -> Result<String> {
        self.get(path, RAW_MEDIA_TYPE)?
            .text()
            .map_err(|e| Error::OperationFailed {
                operation: "github_content".to_string(),
                cause: e.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contents_url_root() {
        let client = GitHubClient::new("octo", "homelab");
        assert_eq!(
            client.contents_url("").unwrap().as_str(),
            "https://api.github.com/repos/octo/homelab/contents?ref=main"
        );
    }

    #[test]
    fn test_contents_url_nested_with_ref_and_spaces() {
        let client = GitHubClient::new("octo", "homelab")
            .with_api_url("https://ghe.example.com/api/v3/")
            .with_ref("dev");
        assert_eq!(
            client
                .contents_url("stacks/home assistant/compose.yaml")
                .unwrap()
                .as_str(),
            "https://ghe.example.com/api/v3/repos/octo/homelab/contents/stacks/home%20assistant/compose.yaml?ref=dev"
        );
    }

    #[test]
    fn test_invalid_api_url_is_configuration_error() {
        let client = GitHubClient::new("octo", "homelab").with_api_url("not a url");
        assert!(matches!(
            client.contents_url(""),
            Err(Error::Configuration(_))
        ));
    }

    #[test]
    fn test_debug_hides_token() {
        let client = GitHubClient::new("octo", "homelab").with_token("ghp_secret");
        let debug = format!("{client:?}");
        assert!(!debug.contains("ghp_secret"));
        assert!(debug.contains("authenticated: true"));
    }
}
