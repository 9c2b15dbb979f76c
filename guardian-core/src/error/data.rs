//! Wire data error types.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Data error type covering wire frame decoding and encoding failures.
///
/// A malformed inbound frame is dropped without affecting connection
/// state; the error exists so the drop is observable in logs.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataError {
    /// Inbound frame could not be decoded as a structured message.
    #[error("[Data] Malformed frame: {reason}")]
    MalformedFrame {
        /// Decoder error description.
        reason: String,
    },

    /// Outbound message could not be encoded.
    #[error("[Data] Encode failed: {reason}")]
    EncodeFailed {
        /// Encoder error description.
        reason: String,
    },
}
