//! Configuration management.
//!
//! Settings live in a single TOML file. The file is read once at startup,
//! merged with defaults, and written back whole after every change.

mod logging;

pub use logging::{LogFormat, LoggingSettings};

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default frontmatter key that names the stack a note belongs to.
pub const DEFAULT_FRONTMATTER_PROPERTY: &str = "stackName";

/// Default GitHub API base URL.
pub const DEFAULT_GITHUB_API_URL: &str = "https://api.github.com";

/// Default git ref queried on the remote repository.
pub const DEFAULT_GITHUB_REF: &str = "main";

/// Default `OpenAI` API endpoint.
pub const DEFAULT_OPENAI_ENDPOINT: &str = "https://api.openai.com/v1";

/// Default `OpenAI` model.
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";

/// Environment variable consulted when `gh_token` is unset.
pub const GITHUB_TOKEN_ENV: &str = "GITHUB_TOKEN";

/// Environment variable consulted when `openai_api_key` is unset.
pub const OPENAI_API_KEY_ENV: &str = "OPENAI_API_KEY";

const REDACTED: &str = "********";

/// Process-wide settings.
///
/// Passed explicitly to every component that needs it; there is no global
/// settings instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Owner of the remote repository.
    pub gh_username: String,
    /// Name of the remote repository.
    pub gh_repository: String,
    /// Bearer token for the GitHub API.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gh_token: Option<String>,
    /// Git ref queried on the remote repository.
    pub gh_ref: String,
    /// GitHub API base URL.
    pub gh_api_url: String,
    /// Repository directory the stack search starts from (empty for the root).
    pub gh_root: String,
    /// Root directory of the notes vault.
    pub vault_path: PathBuf,
    /// Vault-relative folder that is scanned for notes and receives new ones.
    pub folder_path: String,
    /// Frontmatter key holding the stack name.
    pub frontmatter_property: String,
    /// Vault-relative path of the note template.
    pub template_file_path: String,
    /// Whether LLM generation is enabled.
    pub use_ai: bool,
    /// `OpenAI` API key.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub openai_api_key: Option<String>,
    /// `OpenAI` model used for descriptions and tags.
    pub openai_model: String,
    /// `OpenAI` API endpoint.
    pub openai_endpoint: String,
    /// Prefix for generated file names; may contain date placeholders.
    pub file_name_prefix: String,
    /// Suffix for generated file names; may contain date placeholders.
    pub file_name_suffix: String,
    /// HTTP request timeout in milliseconds (0 disables it).
    pub http_timeout_ms: u64,
    /// HTTP connect timeout in milliseconds (0 disables it).
    pub http_connect_timeout_ms: u64,
    /// Logging settings.
    pub logging: LoggingSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            gh_username: String::new(),
            gh_repository: String::new(),
            gh_token: None,
            gh_ref: DEFAULT_GITHUB_REF.to_string(),
            gh_api_url: DEFAULT_GITHUB_API_URL.to_string(),
            gh_root: String::new(),
            vault_path: PathBuf::from("."),
            folder_path: String::new(),
            frontmatter_property: DEFAULT_FRONTMATTER_PROPERTY.to_string(),
            template_file_path: String::new(),
            use_ai: false,
            openai_api_key: None,
            openai_model: DEFAULT_OPENAI_MODEL.to_string(),
            openai_endpoint: DEFAULT_OPENAI_ENDPOINT.to_string(),
            file_name_prefix: String::new(),
            file_name_suffix: String::new(),
            http_timeout_ms: 30_000,
            http_connect_timeout_ms: 3_000,
            logging: LoggingSettings::default(),
        }
    }
}

impl Settings {
    /// Creates settings with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads settings from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| Error::OperationFailed {
            operation: "read_config_file".to_string(),
            cause: format!("{}: {e}", path.display()),
        })?;

        toml::from_str(&contents).map_err(|e| Error::OperationFailed {
            operation: "parse_config_file".to_string(),
            cause: e.to_string(),
        })
    }

    /// Loads settings from `path`, or defaults when the file does not exist yet.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load_from_file(path)
        } else {
            tracing::debug!(path = %path.display(), "No config file, using defaults");
            Ok(Self::default())
        }
    }

    /// Returns the default config file location.
    ///
    /// Checks the following paths in order and returns the first that exists:
    /// 1. Platform-specific config dir (`~/Library/Application Support/stacknotes/` on macOS)
    /// 2. XDG config dir (`~/.config/stacknotes/` for Unix compatibility)
    ///
    /// When neither exists, the platform-specific path is returned so that a
    /// first `config set` creates it there.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        let base_dirs = directories::BaseDirs::new()?;

        let platform_config = base_dirs
            .config_dir()
            .join("stacknotes")
            .join("config.toml");
        if platform_config.exists() {
            return Some(platform_config);
        }

        let xdg_config = base_dirs
            .home_dir()
            .join(".config")
            .join("stacknotes")
            .join("config.toml");
        if xdg_config.exists() {
            return Some(xdg_config);
        }

        Some(platform_config)
    }

    /// Writes the whole settings object to `path`, creating parent directories.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the write fails.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| Error::OperationFailed {
                operation: "create_config_dir".to_string(),
                cause: e.to_string(),
            })?;
        }

        let contents = toml::to_string_pretty(self).map_err(|e| Error::OperationFailed {
            operation: "serialize_config".to_string(),
            cause: e.to_string(),
        })?;

        std::fs::write(path, contents).map_err(|e| Error::OperationFailed {
            operation: "write_config_file".to_string(),
            cause: format!("{}: {e}", path.display()),
        })?;

        tracing::debug!(path = %path.display(), "Saved settings");
        Ok(())
    }

    /// Updates one setting from its string form.
    ///
    /// Empty values clear optional credentials.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] for unknown keys or values that do not
    /// parse as the setting's type.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let value = value.trim();
        match key {
            "gh_username" => self.gh_username = value.to_string(),
            "gh_repository" => self.gh_repository = value.to_string(),
            "gh_token" => self.gh_token = non_empty(value),
            "gh_ref" => self.gh_ref = value.to_string(),
            "gh_api_url" => self.gh_api_url = value.trim_end_matches('/').to_string(),
            "gh_root" => self.gh_root = value.trim_matches('/').to_string(),
            "vault_path" => self.vault_path = PathBuf::from(value),
            "folder_path" => self.folder_path = value.to_string(),
            "frontmatter_property" => self.frontmatter_property = value.to_string(),
            "template_file_path" => self.template_file_path = value.to_string(),
            "use_ai" => self.use_ai = parse_bool(key, value)?,
            "openai_api_key" => self.openai_api_key = non_empty(value),
            "openai_model" => self.openai_model = value.to_string(),
            "openai_endpoint" => {
                self.openai_endpoint = value.trim_end_matches('/').to_string();
            },
            "file_name_prefix" => self.file_name_prefix = value.to_string(),
            "file_name_suffix" => self.file_name_suffix = value.to_string(),
            "http_timeout_ms" => self.http_timeout_ms = parse_u64(key, value)?,
            "http_connect_timeout_ms" => self.http_connect_timeout_ms = parse_u64(key, value)?,
            "logging.level" => self.logging.level = value.to_string(),
            "logging.format" => self.logging.format = LogFormat::parse(value)?,
            "logging.file" => self.logging.file = non_empty(value).map(PathBuf::from),
            _ => return Err(Error::InvalidInput(format!("unknown setting '{key}'"))),
        }
        Ok(())
    }

    /// Returns the repository owner and name.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] if either is unset.
    pub fn repository(&self) -> Result<(&str, &str)> {
        let owner = self.gh_username.trim();
        let repo = self.gh_repository.trim();
        if owner.is_empty() || repo.is_empty() {
            return Err(Error::Configuration(
                "GitHub username and repository must be set".to_string(),
            ));
        }
        Ok((owner, repo))
    }

    /// Returns the GitHub token, falling back to `GITHUB_TOKEN`.
    #[must_use]
    pub fn github_token(&self) -> Option<String> {
        self.gh_token
            .clone()
            .or_else(|| std::env::var(GITHUB_TOKEN_ENV).ok())
            .filter(|t| !t.trim().is_empty())
    }

    /// Returns the `OpenAI` API key, falling back to `OPENAI_API_KEY`.
    #[must_use]
    pub fn openai_key(&self) -> Option<String> {
        self.openai_api_key
            .clone()
            .or_else(|| std::env::var(OPENAI_API_KEY_ENV).ok())
            .filter(|k| !k.trim().is_empty())
    }

    /// Returns the configured template path, if any.
    #[must_use]
    pub fn template_path(&self) -> Option<&str> {
        let path = self.template_file_path.trim();
        (!path.is_empty()).then_some(path)
    }

    /// Returns a copy with credentials masked, for display.
    #[must_use]
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        copy.gh_token = copy.gh_token.as_ref().map(|_| REDACTED.to_string());
        copy.openai_api_key = copy.openai_api_key.as_ref().map(|_| REDACTED.to_string());
        copy
    }

    /// Renders the settings as TOML.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| Error::OperationFailed {
            operation: "serialize_config".to_string(),
            cause: e.to_string(),
        })
    }
}

fn non_empty(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    match value.to_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Ok(true),
        "false" | "no" | "off" | "0" => Ok(false),
        _ => Err(Error::InvalidInput(format!(
            "'{key}' expects true or false, got '{value}'"
        ))),
    }
}

fn parse_u64(key: &str, value: &str) -> Result<u64> {
    value
        .parse()
        .map_err(|_| Error::InvalidInput(format!("'{key}' expects a number, got '{value}'")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.frontmatter_property, "stackName");
        assert_eq!(settings.gh_ref, "main");
        assert!(!settings.use_ai);
        assert!(settings.template_path().is_none());
    }

    #[test]
    fn test_partial_file_merges_with_defaults() {
        let settings: Settings = toml::from_str(
            r#"
gh_username = "octo"
gh_repository = "homelab"
use_ai = true
"#,
        )
        .unwrap();

        assert_eq!(settings.gh_username, "octo");
        assert!(settings.use_ai);
        assert_eq!(settings.frontmatter_property, "stackName");
        assert_eq!(settings.openai_model, DEFAULT_OPENAI_MODEL);
    }

    #[test]
    fn test_save_and_reload() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut settings = Settings::default();
        settings.set("gh_username", "octo").unwrap();
        settings.set("use_ai", "yes").unwrap();
        settings.set("logging.format", "json").unwrap();
        settings.save(&path).unwrap();

        let loaded = Settings::load_or_default(&path).unwrap();
        assert_eq!(loaded, settings);
        assert_eq!(loaded.logging.format, LogFormat::Json);
    }

    #[test]
    fn test_load_missing_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let loaded = Settings::load_or_default(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(loaded, Settings::default());
    }

    #[test]
    fn test_set_rejects_unknown_key_and_bad_values() {
        let mut settings = Settings::default();
        assert!(matches!(
            settings.set("nope", "x"),
            Err(Error::InvalidInput(_))
        ));
        assert!(settings.set("use_ai", "maybe").is_err());
        assert!(settings.set("http_timeout_ms", "soon").is_err());
    }

    #[test]
    fn test_set_search_root_strips_slashes() {
        let mut settings = Settings::default();
        assert!(settings.gh_root.is_empty());
        settings.set("gh_root", "/stacks/media/").unwrap();
        assert_eq!(settings.gh_root, "stacks/media");
    }

    #[test]
    fn test_set_empty_clears_credential() {
        let mut settings = Settings::default();
        settings.set("gh_token", "abc").unwrap();
        assert_eq!(settings.gh_token.as_deref(), Some("abc"));
        settings.set("gh_token", "").unwrap();
        assert!(settings.gh_token.is_none());
    }

    #[test]
    fn test_repository_requires_coordinates() {
        let mut settings = Settings::default();
        assert!(matches!(
            settings.repository(),
            Err(Error::Configuration(_))
        ));
        settings.gh_username = "octo".to_string();
        settings.gh_repository = "homelab".to_string();
        assert_eq!(settings.repository().unwrap(), ("octo", "homelab"));
    }

    #[test]
    fn test_redacted_masks_credentials() {
        let mut settings = Settings::default();
        settings.gh_token = Some("ghp_secret".to_string());
        settings.openai_api_key = Some("sk-secret".to_string());

        let shown = settings.redacted().to_toml().unwrap();
        assert!(!shown.contains("ghp_secret"));
        assert!(!shown.contains("sk-secret"));
        assert!(shown.contains(REDACTED));
    }
}
