//! Unified error handling for the fleetwatch crate
//!
//! All pre-verdict failures (configuration, authentication, snapshot
//! acquisition) funnel into the single [`Error`] enum. Rule evaluation is
//! pure and cannot fail; alert delivery failures are logged and swallowed
//! at the dispatch site and never surface here.

use std::io;
use thiserror::Error;

/// Classification of errors for handling strategies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Network-related errors (HTTP, timeout)
    Network,
    /// Authentication failures
    Auth,
    /// Configuration and validation errors
    Config,
    /// Storage and I/O errors
    Storage,
    /// Other/unknown errors
    Other,
}

/// Unified error type for the fleetwatch crate
#[derive(Error, Debug)]
pub enum Error {
    /// Missing or invalid configuration
    #[error("Config error: {0}")]
    Config(String),

    /// Login rejected or token missing from the response
    #[error("Authentication error: {0}")]
    Auth(String),

    /// HTTP client errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with context
    #[error("{context}")]
    Other {
        context: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl Error {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an authentication error
    pub fn auth(msg: impl Into<String>) -> Self {
        Self::Auth(msg.into())
    }

    /// Create a generic error with context
    pub fn other(context: impl Into<String>) -> Self {
        Self::Other {
            context: context.into(),
            source: None,
        }
    }

    /// Get the error category for handling strategies
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Config(_) => ErrorCategory::Config,
            Self::Auth(_) => ErrorCategory::Auth,
            Self::Http(_) => ErrorCategory::Network,
            Self::Io(_) => ErrorCategory::Storage,
            Self::Json(_) => ErrorCategory::Other,
            Self::Other { .. } => ErrorCategory::Other,
        }
    }

    /// Check if this error is recoverable (worth retrying on a later run)
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::Http(_) | Self::Io(_) => true,
            Self::Config(_) | Self::Auth(_) | Self::Json(_) | Self::Other { .. } => false,
        }
    }
}

impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Self::Other {
            context: err.to_string(),
            source: None,
        }
    }
}

/// Result type alias using the unified Error type
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_category() {
        assert_eq!(Error::config("missing email").category(), ErrorCategory::Config);
        assert_eq!(Error::auth("bad password").category(), ErrorCategory::Auth);
        assert_eq!(Error::other("boom").category(), ErrorCategory::Other);
    }

    #[test]
    fn test_is_recoverable() {
        assert!(!Error::config("missing email").is_recoverable());
        assert!(!Error::auth("bad password").is_recoverable());

        let io_err = Error::Io(io::Error::new(io::ErrorKind::Other, "disk"));
        assert!(io_err.is_recoverable());
    }

    #[test]
    fn test_error_display() {
        let err = Error::auth("no token field in response");
        assert_eq!(err.to_string(), "Authentication error: no token field in response");
    }
}
