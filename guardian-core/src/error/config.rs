//! Configuration-related error types.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration error type covering missing fields and invalid values.
///
/// Configuration errors are the only fatal errors in the client: a bad
/// endpoint or a zero timer interval can never recover without operator
/// intervention.
///
/// # Examples
///
/// ```
/// use guardian_core::error::ConfigError;
///
/// let error = ConfigError::MissingField {
///     field: "url".to_string(),
/// };
/// assert!(error.to_string().contains("url"));
/// ```
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfigError {
    /// Required configuration field is missing.
    #[error("[Config] Missing field '{field}'")]
    MissingField {
        /// Name of the missing field.
        field: String,
    },

    /// Configuration value is invalid.
    #[error("[Config] Invalid value for '{field}': {reason}")]
    InvalidValue {
        /// Field with the invalid value.
        field: String,
        /// Reason why the value is invalid.
        reason: String,
    },

    /// Endpoint URL could not be derived or is not a WebSocket URL.
    #[error("[Config] Invalid endpoint '{url}': {reason}")]
    InvalidEndpoint {
        /// The offending URL.
        url: String,
        /// Reason why the endpoint is invalid.
        reason: String,
    },
}
