//! Result and error types for Vitrine.

use thiserror::Error;

/// Result type for Vitrine operations
pub type VitrineResult<T> = Result<T, VitrineError>;

/// Errors that can occur in Vitrine
#[derive(Debug, Error)]
pub enum VitrineError {
    /// Locator matched nothing within the timeout
    #[error("Element not found: {locator} did not appear within {timeout_ms}ms")]
    ElementNotFound {
        /// Locator description
        locator: String,
        /// Timeout that elapsed
        timeout_ms: u64,
    },

    /// Locator matched an element that never became usable
    #[error("Element not actionable: {locator} was {reason} for {timeout_ms}ms")]
    ElementNotActionable {
        /// Locator description
        locator: String,
        /// Why the element could not be used (hidden, disabled, ...)
        reason: String,
        /// Timeout that elapsed
        timeout_ms: u64,
    },

    /// Single-target action resolved to several elements
    #[error("Strict mode violation: {locator} resolved to {count} elements")]
    AmbiguousLocator {
        /// Locator description
        locator: String,
        /// Number of matching elements
        count: usize,
    },

    /// No product row carries the requested name
    #[error("Product not found: {name}")]
    ProductNotFound {
        /// Requested product name
        name: String,
    },

    /// Sort criterion outside the supported set
    #[error("Unsupported sort criterion: '{criterion}' (expected one of az, za, lohi, hilo)")]
    UnsupportedSortCriterion {
        /// Rejected criterion
        criterion: String,
    },

    /// Invalid or missing run parameter
    #[error("Configuration error: {option}: {reason}")]
    ConfigurationError {
        /// Option (or environment variable) that failed validation
        option: String,
        /// Why it was rejected
        reason: String,
    },

    /// Generated test data failed its own validity predicate
    #[error("Generated {record} violates its constraints: {reason}")]
    GenerationConstraintViolation {
        /// Record type
        record: String,
        /// Violated constraint
        reason: String,
    },

    /// Operation timed out
    #[error("Timed out after {ms}ms waiting for {waiting_for}")]
    Timeout {
        /// Timeout in milliseconds
        ms: u64,
        /// What was being waited for
        waiting_for: String,
    },

    /// Browser launch error
    #[error("Failed to launch browser: {message}")]
    BrowserLaunchError {
        /// Error message
        message: String,
    },

    /// Navigation error
    #[error("Navigation to {url} failed: {message}")]
    NavigationError {
        /// URL that failed
        url: String,
        /// Error message
        message: String,
    },

    /// Page error
    #[error("Page error: {message}")]
    PageError {
        /// Error message
        message: String,
    },

    /// Screenshot error
    #[error("Screenshot failed: {message}")]
    ScreenshotError {
        /// Error message
        message: String,
    },

    /// Assertion failed
    #[error("Assertion failed: {message}")]
    AssertionFailed {
        /// Error message
        message: String,
    },

    /// Fixture error (setup/teardown failed)
    #[error("Fixture error: {message}")]
    FixtureError {
        /// Error message
        message: String,
    },

    /// Test body panicked
    #[error("Test panicked: {message}")]
    TestPanicked {
        /// Panic payload
        message: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML configuration error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),
}

impl VitrineError {
    /// Build a configuration error
    #[must_use]
    pub fn config(option: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ConfigurationError {
            option: option.into(),
            reason: reason.into(),
        }
    }

    /// Build a page error
    #[must_use]
    pub fn page(message: impl Into<String>) -> Self {
        Self::PageError {
            message: message.into(),
        }
    }

    /// Build a fixture error
    #[must_use]
    pub fn fixture(message: impl Into<String>) -> Self {
        Self::FixtureError {
            message: message.into(),
        }
    }

    /// Stable name of the error kind, used in reports
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::ElementNotFound { .. } => "ElementNotFound",
            Self::ElementNotActionable { .. } => "ElementNotActionable",
            Self::AmbiguousLocator { .. } => "AmbiguousLocator",
            Self::ProductNotFound { .. } => "ProductNotFound",
            Self::UnsupportedSortCriterion { .. } => "UnsupportedSortCriterion",
            Self::ConfigurationError { .. } => "ConfigurationError",
            Self::GenerationConstraintViolation { .. } => "GenerationConstraintViolation",
            Self::Timeout { .. } => "Timeout",
            Self::BrowserLaunchError { .. } => "BrowserLaunchError",
            Self::NavigationError { .. } => "NavigationError",
            Self::PageError { .. } => "PageError",
            Self::ScreenshotError { .. } => "ScreenshotError",
            Self::AssertionFailed { .. } => "AssertionFailed",
            Self::FixtureError { .. } => "FixtureError",
            Self::TestPanicked { .. } => "TestPanicked",
            Self::Io(_) => "Io",
            Self::Json(_) => "Json",
            Self::Yaml(_) => "Yaml",
        }
    }

    /// Whether the error aborts a run before any test executes
    #[must_use]
    pub const fn is_configuration(&self) -> bool {
        matches!(self, Self::ConfigurationError { .. } | Self::Yaml(_))
    }
}
