//! Log output setup.
//!
//! One `tracing-subscriber` registry per process: an [`EnvFilter`] at the
//! configured level (`RUST_LOG` wins when set), a stderr layer in text or
//! JSON, and optionally a plain-text file layer. Every line carries its
//! level and timestamp.

use crate::config::{LogLevel, RunConfig};
use crate::result::VitrineResult;
use std::fmt;
use std::fs::OpenOptions;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Mutex;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt as fmt_layer, EnvFilter, Layer};

/// Name of the log file inside the log directory
pub const LOG_FILE_NAME: &str = "vitrine.log";

/// Stderr line format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable lines
    #[default]
    Text,
    /// One JSON object per line
    Json,
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Text => "text",
            Self::Json => "json",
        })
    }
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" | "pretty" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => Err(format!("unknown log format '{other}' (expected text or json)")),
        }
    }
}

/// Logging setup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    pub level: LogLevel,
    pub format: LogFormat,
    /// Also write plain text to `<dir>/vitrine.log`
    pub log_dir: Option<PathBuf>,
    /// Colored stderr output
    pub ansi: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            format: LogFormat::Text,
            log_dir: None,
            ansi: false,
        }
    }
}

impl LoggingConfig {
    /// Level and log directory of a run
    #[must_use]
    pub fn for_run(config: &RunConfig) -> Self {
        Self {
            level: config.log_level,
            log_dir: Some(config.log_dir.clone()),
            ..Self::default()
        }
    }

    #[must_use]
    pub const fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    #[must_use]
    pub const fn with_ansi(mut self, ansi: bool) -> Self {
        self.ansi = ansi;
        self
    }

    /// Path of the log file, if file logging is on
    #[must_use]
    pub fn log_file(&self) -> Option<PathBuf> {
        self.log_dir.as_ref().map(|dir| dir.join(LOG_FILE_NAME))
    }

    fn filter(&self) -> EnvFilter {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(self.level.as_directive()))
    }
}

/// Install the global subscriber.
///
/// Returns `false` when a subscriber was already installed; the existing one
/// stays in place.
///
/// # Errors
///
/// Returns an error if the log file cannot be created.
pub fn init_logging(config: &LoggingConfig) -> VitrineResult<bool> {
    let file_layer = match config.log_file() {
        Some(path) => {
            if let Some(dir) = path.parent() {
                std::fs::create_dir_all(dir)?;
            }
            let file = OpenOptions::new().create(true).append(true).open(&path)?;
            Some(
                fmt_layer::layer()
                    .with_writer(Mutex::new(file))
                    .with_ansi(false)
                    .with_target(true),
            )
        }
        None => None,
    };

    let stderr_layer = match config.format {
        LogFormat::Text => fmt_layer::layer()
            .with_writer(std::io::stderr)
            .with_ansi(config.ansi)
            .with_target(false)
            .boxed(),
        LogFormat::Json => fmt_layer::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_current_span(false)
            .boxed(),
    };

    let installed = tracing_subscriber::registry()
        .with(config.filter())
        .with(stderr_layer)
        .with(file_layer)
        .try_init()
        .is_ok();
    if installed {
        tracing::debug!(level = config.level.as_directive(), format = %config.format, "logging initialized");
    }
    Ok(installed)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_format_parse() {
        assert_eq!("JSON".parse::<LogFormat>().unwrap(), LogFormat::Json);
        assert_eq!("text".parse::<LogFormat>().unwrap(), LogFormat::Text);
        assert!("xml".parse::<LogFormat>().is_err());
    }

    #[test]
    fn test_for_run_uses_log_dir() {
        let config = RunConfig {
            log_level: LogLevel::Debug,
            log_dir: PathBuf::from("out/logs"),
            ..RunConfig::default()
        };
        let logging = LoggingConfig::for_run(&config).with_format(LogFormat::Json);
        assert_eq!(logging.level, LogLevel::Debug);
        assert_eq!(logging.format, LogFormat::Json);
        assert_eq!(logging.log_file(), Some(PathBuf::from("out/logs/vitrine.log")));
    }

    #[test]
    fn test_repeated_init_is_noop() {
        let dir = tempfile::tempdir().unwrap();
        let config = LoggingConfig {
            log_dir: Some(dir.path().join("logs")),
            ..LoggingConfig::default()
        };
        let _ = init_logging(&config).unwrap();
        assert!(!init_logging(&config).unwrap());
        assert!(dir.path().join("logs").join(LOG_FILE_NAME).exists());
    }
}
