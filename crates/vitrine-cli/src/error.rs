//! Error types for the CLI

use thiserror::Error;
use vitrine::VitrineError;

/// Result type for CLI operations
pub type CliResult<T> = Result<T, CliError>;

/// Process exit code: every selected test passed
pub const EXIT_PASSED: u8 = 0;
/// Process exit code: one or more tests failed
pub const EXIT_TESTS_FAILED: u8 = 1;
/// Process exit code: configuration or internal error, nothing ran
pub const EXIT_ERROR: u8 = 2;

/// Errors that can occur in the CLI
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration error
    #[error("Configuration error: {message}")]
    Config {
        /// Error message
        message: String,
    },

    /// Some selected tests failed
    #[error("{failed} of {total} tests failed")]
    TestsFailed {
        /// Failed tests
        failed: usize,
        /// Tests in the run
        total: usize,
    },

    /// IO error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Vitrine library error
    #[error("{0}")]
    Vitrine(#[from] VitrineError),

    /// Output serialization error
    #[error("Serialization failed: {message}")]
    Serialization {
        /// Error message
        message: String,
    },
}

impl CliError {
    /// Create a configuration error
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a serialization error
    #[must_use]
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization {
            message: message.into(),
        }
    }

    /// Exit code this error ends the process with
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::TestsFailed { .. } => EXIT_TESTS_FAILED,
            _ => EXIT_ERROR,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error() {
        let err = CliError::config("bad config");
        assert!(err.to_string().contains("Configuration"));
        assert!(err.to_string().contains("bad config"));
        assert_eq!(err.exit_code(), EXIT_ERROR);
    }

    #[test]
    fn test_tests_failed_exit_code() {
        let err = CliError::TestsFailed { failed: 2, total: 9 };
        assert_eq!(err.to_string(), "2 of 9 tests failed");
        assert_eq!(err.exit_code(), EXIT_TESTS_FAILED);
    }

    #[test]
    fn test_library_error_is_internal() {
        let err: CliError = VitrineError::config("base_url", "missing scheme").into();
        assert!(err.to_string().contains("base_url"));
        assert_eq!(err.exit_code(), EXIT_ERROR);
    }

    #[test]
    fn test_io_error_from() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let cli_err: CliError = io_err.into();
        assert!(cli_err.to_string().contains("I/O"));
        assert_eq!(cli_err.exit_code(), EXIT_ERROR);
    }
}
