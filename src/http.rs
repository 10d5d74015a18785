//! Shared blocking HTTP client construction.

use std::time::Duration;

use crate::config::Settings;

/// Timeouts applied to outbound HTTP clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HttpConfig {
    /// Request timeout in milliseconds (0 to disable).
    pub timeout_ms: u64,
    /// Connect timeout in milliseconds (0 to disable).
    pub connect_timeout_ms: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 30_000,
            connect_timeout_ms: 3_000,
        }
    }
}

impl HttpConfig {
    /// Reads the timeouts from settings.
    #[must_use]
    pub const fn from_settings(settings: &Settings) -> Self {
        Self {
            timeout_ms: settings.http_timeout_ms,
            connect_timeout_ms: settings.http_connect_timeout_ms,
        }
    }
}

/// Builds a blocking HTTP client with the configured timeouts.
///
/// Falls back to a default client if the builder fails.
#[must_use]
pub fn build_http_client(config: HttpConfig) -> reqwest::blocking::Client {
    let mut builder = reqwest::blocking::Client::builder();
    if config.timeout_ms > 0 {
        builder = builder.timeout(Duration::from_millis(config.timeout_ms));
    } else {
        builder = builder.timeout(None);
    }
    if config.connect_timeout_ms > 0 {
        builder = builder.connect_timeout(Duration::from_millis(config.connect_timeout_ms));
    }

    builder.build().unwrap_or_else(|err| {
        tracing::warn!("Failed to build HTTP client: {err}");
        reqwest::blocking::Client::new()
    })
}
