//! Logging setup.
//!
//! Installs a `tracing-subscriber` registry with one formatting layer:
//! pretty or JSON, written to stderr or appended to a log file. The filter
//! comes from `STACKNOTES_LOG` when set, else `debug` with `--verbose`,
//! else the configured level.

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, OnceLock};

use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::config::{LogFormat, LoggingSettings};
use crate::{Error, Result};

/// Environment variable holding a tracing filter directive.
pub const LOG_ENV: &str = "STACKNOTES_LOG";

static LOGGING_INIT: OnceLock<()> = OnceLock::new();

/// Resolved logging configuration.
#[derive(Debug)]
pub struct LoggingConfig {
    /// Event filter.
    pub filter: EnvFilter,
    /// Output format.
    pub format: LogFormat,
    /// Log file; stderr when `None`.
    pub file: Option<PathBuf>,
    /// A directive that failed to parse and was replaced by `warn`.
    pub rejected_directive: Option<String>,
}

impl LoggingConfig {
    /// Builds the configuration from settings, `--verbose` and `STACKNOTES_LOG`.
    #[must_use]
    pub fn from_settings(settings: &LoggingSettings, verbose: bool) -> Self {
        let directive = std::env::var(LOG_ENV)
            .ok()
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| default_directive(settings, verbose));

        let (filter, rejected_directive) = match EnvFilter::try_new(&directive) {
            Ok(filter) => (filter, None),
            Err(_) => (EnvFilter::new("warn"), Some(directive)),
        };

        Self {
            filter,
            format: settings.format,
            file: settings.file.clone(),
            rejected_directive,
        }
    }
}

fn default_directive(settings: &LoggingSettings, verbose: bool) -> String {
    if verbose {
        "debug".to_string()
    } else {
        settings.level.clone()
    }
}

/// Installs the global subscriber.
///
/// # Errors
///
/// Returns an error if logging was already initialized or the log file
/// cannot be opened.
pub fn init(config: LoggingConfig) -> Result<()> {
    if LOGGING_INIT.get().is_some() {
        return Err(Error::OperationFailed {
            operation: "logging_init".to_string(),
            cause: "logging already initialized".to_string(),
        });
    }

    let registry = tracing_subscriber::registry().with(config.filter);
    match (&config.file, config.format) {
        (Some(log_file), LogFormat::Json) => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(open_log_file(log_file)?)
                    .with_current_span(true)
                    .with_span_list(true)
                    .with_target(true)
                    .with_thread_names(true),
            )
            .try_init(),
        (Some(log_file), LogFormat::Pretty) => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_writer(open_log_file(log_file)?)
                    .with_ansi(false)
                    .with_target(true)
                    .with_thread_names(true),
            )
            .try_init(),
        (None, LogFormat::Json) => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(io::stderr)
                    .with_current_span(true)
                    .with_span_list(true)
                    .with_target(true),
            )
            .try_init(),
        (None, LogFormat::Pretty) => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_writer(io::stderr)
                    .with_target(false),
            )
            .try_init(),
    }
    .map_err(init_error)?;

    if let Some(directive) = &config.rejected_directive {
        tracing::warn!("Invalid log filter '{directive}', using 'warn'");
    }

    LOGGING_INIT.set(()).map_err(|()| Error::OperationFailed {
        operation: "logging_init".to_string(),
        cause: "failed to mark logging initialized".to_string(),
    })
}

/// Thread-safe file writer for logging.
#[derive(Clone)]
struct LogFileWriter {
    file: Arc<Mutex<File>>,
}

impl Write for LogFileWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut guard = self
            .file
            .lock()
            .map_err(|e| io::Error::other(e.to_string()))?;
        guard.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        let mut guard = self
            .file
            .lock()
            .map_err(|e| io::Error::other(e.to_string()))?;
        guard.flush()
    }
}

impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for LogFileWriter {
    type Writer = Self;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

/// Opens a log file for appending, creating parent directories.
fn open_log_file(path: &Path) -> Result<LogFileWriter> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| Error::OperationFailed {
            operation: "create_log_dir".to_string(),
            cause: e.to_string(),
        })?;
    }

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| Error::OperationFailed {
            operation: "open_log_file".to_string(),
            cause: format!("{}: {e}", path.display()),
        })?;

    Ok(LogFileWriter {
        file: Arc::new(Mutex::new(file)),
    })
}

#[allow(clippy::needless_pass_by_value)]
fn init_error(e: tracing_subscriber::util::TryInitError) -> Error {
    Error::OperationFailed {
        operation: "logging_init".to_string(),
        cause: e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_directive() {
        let settings = LoggingSettings::default();
        assert_eq!(default_directive(&settings, false), "warn");
        assert_eq!(default_directive(&settings, true), "debug");
    }

    #[test]
    fn test_config_keeps_format_and_file() {
        let settings = LoggingSettings {
            level: "info".to_string(),
            format: LogFormat::Json,
            file: Some(PathBuf::from("logs/stacknotes.log")),
        };
        let config = LoggingConfig::from_settings(&settings, false);
        assert_eq!(config.format, LogFormat::Json);
        assert_eq!(config.file, Some(PathBuf::from("logs/stacknotes.log")));
    }

    #[test]
    fn test_invalid_level_is_rejected() {
        let settings = LoggingSettings {
            level: "stacknotes=[".to_string(),
            ..LoggingSettings::default()
        };
        if std::env::var(LOG_ENV).is_err() {
            let config = LoggingConfig::from_settings(&settings, false);
            assert_eq!(config.rejected_directive.as_deref(), Some("stacknotes=["));
        }
    }

    #[test]
    fn test_open_log_file_creates_parents_and_appends() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested/dir/app.log");

        let mut writer = open_log_file(&path).unwrap();
        writer.write_all(b"one\n").unwrap();
        let mut writer = open_log_file(&path).unwrap();
        writer.write_all(b"two\n").unwrap();
        writer.flush().unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "one\ntwo\n");
    }
}
