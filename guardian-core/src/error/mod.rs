//! Error types and handling framework.
//!
//! This module provides a hierarchical error type system with
//! domain-specific error categories for the Guardian dashboard client.
//!
//! # Error Hierarchy
//!
//! The error system is organized hierarchically:
//! - `GuardianError` - Top-level error type
//!   - `NetworkError` - Network and connection errors
//!   - `ConfigError` - Configuration errors
//!   - `DataError` - Wire frame decoding errors
//!
//! The realtime channel has no fatal failure modes of its own: every
//! network or data error resolves to either "drop and continue" or
//! "disconnect and retry". Only configuration errors are fatal, since a
//! bad endpoint can never recover on its own.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

// Define ErrorSeverity first so submodules can use it
/// Error severity levels for categorizing errors.
///
/// Severity levels help determine the appropriate response to an error:
/// - `Fatal`: Unrecoverable errors that require operator attention
/// - `Recoverable`: Errors that are retried or recovered from
/// - `Warning`: Non-critical issues that should be logged
///
/// # Examples
///
/// ```
/// use guardian_core::error::ErrorSeverity;
///
/// let severity = ErrorSeverity::Recoverable;
/// assert!(severity.is_recoverable());
/// assert!(!severity.is_fatal());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ErrorSeverity {
    /// Unrecoverable error requiring operator attention.
    Fatal,

    /// Error that is recovered from through retry or fallback.
    /// The operation failed but the system continues.
    #[default]
    Recoverable,

    /// Non-critical issue that should be logged but doesn't prevent
    /// operation.
    Warning,
}

impl ErrorSeverity {
    /// Returns true if this error is recoverable (not fatal).
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        !matches!(self, Self::Fatal)
    }

    /// Returns true if this error is fatal (unrecoverable).
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(self, Self::Fatal)
    }

    /// Returns the severity as a static string.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Fatal => "FATAL",
            Self::Recoverable => "RECOVERABLE",
            Self::Warning => "WARNING",
        }
    }
}

impl fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

mod config;
mod data;
mod network;

pub use config::ConfigError;
pub use data::DataError;
pub use network::NetworkError;

/// Top-level error type for the Guardian dashboard client.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GuardianError {
    /// Network-related error.
    #[error("{0}")]
    Network(#[from] NetworkError),

    /// Configuration error.
    #[error("{0}")]
    Config(#[from] ConfigError),

    /// Wire frame decoding error.
    #[error("{0}")]
    Data(#[from] DataError),
}

impl GuardianError {
    /// Returns the severity level of this error.
    #[must_use]
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Network(_) => ErrorSeverity::Recoverable,
            Self::Config(_) => ErrorSeverity::Fatal,
            Self::Data(_) => ErrorSeverity::Warning,
        }
    }

    /// Returns true if this error is recoverable.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        self.severity().is_recoverable()
    }

    /// Returns the error category as a string.
    #[must_use]
    pub fn category(&self) -> &'static str {
        match self {
            Self::Network(_) => "network",
            Self::Config(_) => "config",
            Self::Data(_) => "data",
        }
    }
}

/// A specialized Result type for Guardian operations.
pub type Result<T> = std::result::Result<T, GuardianError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_severity_display() {
        assert_eq!(ErrorSeverity::Fatal.to_string(), "FATAL");
        assert_eq!(ErrorSeverity::Recoverable.to_string(), "RECOVERABLE");
        assert_eq!(ErrorSeverity::Warning.to_string(), "WARNING");
    }

    #[test]
    fn test_error_severity_is_recoverable() {
        assert!(!ErrorSeverity::Fatal.is_recoverable());
        assert!(ErrorSeverity::Recoverable.is_recoverable());
        assert!(ErrorSeverity::Warning.is_recoverable());
    }

    #[test]
    fn test_network_error_conversion() {
        let network_err = NetworkError::Timeout { timeout_ms: 5000 };
        let err: GuardianError = network_err.into();
        assert_eq!(err.category(), "network");
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_config_error_is_fatal() {
        let config_err = ConfigError::MissingField {
            field: "url".to_string(),
        };
        let err: GuardianError = config_err.into();
        assert_eq!(err.category(), "config");
        assert!(err.severity().is_fatal());
    }

    #[test]
    fn test_data_error_is_warning() {
        let data_err = DataError::MalformedFrame {
            reason: "expected value at line 1".to_string(),
        };
        let err: GuardianError = data_err.into();
        assert_eq!(err.category(), "data");
        assert_eq!(err.severity(), ErrorSeverity::Warning);
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_serde_roundtrip() {
        let err = GuardianError::Network(NetworkError::Timeout { timeout_ms: 3000 });
        let json = serde_json::to_string(&err).unwrap();
        let parsed: GuardianError = serde_json::from_str(&json).unwrap();
        assert_eq!(err, parsed);
    }

    #[test]
    fn test_display() {
        let err = GuardianError::Network(NetworkError::Timeout { timeout_ms: 5000 });
        let display = format!("{err}");
        assert!(display.contains("5000ms"));
    }
}
