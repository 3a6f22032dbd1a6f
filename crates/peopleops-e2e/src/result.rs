//! Result and error types for the end-to-end suite.

use thiserror::Error;

/// Result type for suite operations
pub type E2eResult<T> = Result<T, E2eError>;

/// Errors raised by page objects, the driver layer and the runner
#[derive(Debug, Error)]
pub enum E2eError {
    /// Browser launch error
    #[error("Failed to launch browser: {message}")]
    BrowserLaunchError {
        /// Error message
        message: String,
    },

    /// Page-level driver error
    #[error("Page error: {message}")]
    PageError {
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

    /// An awaited condition did not occur in time
    #[error("Timed out after {ms}ms waiting for {what}")]
    Timeout {
        /// What was being awaited
        what: String,
        /// Timeout in milliseconds
        ms: u64,
    },

    /// No element matched a locator
    #[error("No element matches {selector}")]
    ElementNotFound {
        /// Locator display string
        selector: String,
    },

    /// An action locator matched more than one element
    #[error("Strict mode violation: {selector} resolved to {count} elements")]
    StrictModeViolation {
        /// Locator display string
        selector: String,
        /// Number of matches
        count: usize,
    },

    /// Element exists but cannot receive the action
    #[error("Element {selector} is not actionable: {reason}")]
    NotActionable {
        /// Locator display string
        selector: String,
        /// Why the action was refused
        reason: String,
    },

    /// Assertion failed
    #[error("Assertion failed: {message}")]
    AssertionFailed {
        /// Error message
        message: String,
    },

    /// Session snapshot could not be read, written or applied
    #[error("Session state error: {message}")]
    SessionError {
        /// Error message
        message: String,
    },

    /// Invalid runner configuration
    #[error("Configuration error: {message}")]
    ConfigError {
        /// Error message
        message: String,
    },

    /// Fixture generation failed
    #[error("Test data error: {message}")]
    DataError {
        /// Error message
        message: String,
    },

    /// Script evaluation in the page failed
    #[error("Script evaluation failed: {message}")]
    ScriptError {
        /// Error message
        message: String,
    },

    /// The application raised client-side errors during the test
    #[error("Page reported {} error(s): {}", errors.len(), errors.join("; "))]
    PageErrors {
        /// Recorded error descriptions
        errors: Vec<String>,
    },

    /// Focused tests are present while `forbid_only` is set
    #[error("Focused tests are forbidden in this run: {}", tests.join(", "))]
    FocusedTestsForbidden {
        /// Ids of the focused tests
        tests: Vec<String>,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),
}

impl E2eError {
    /// Build an assertion failure
    pub fn assertion(message: impl Into<String>) -> Self {
        Self::AssertionFailed {
            message: message.into(),
        }
    }

    /// Build a page error
    pub fn page(message: impl Into<String>) -> Self {
        Self::PageError {
            message: message.into(),
        }
    }

    /// Build a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::ConfigError {
            message: message.into(),
        }
    }

    /// Whether the error is a timeout of any kind
    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }

    /// Whether the error comes from configuration or its files
    #[must_use]
    pub const fn is_config(&self) -> bool {
        matches!(
            self,
            Self::ConfigError { .. } | Self::FocusedTestsForbidden { .. } | Self::Yaml(_)
        )
    }
}
