//! Structured wire messages.
//!
//! Every frame on the realtime channel is a JSON object with a `type`
//! discriminator; all remaining fields are carried as an opaque payload.
//! Two types are reserved for the heartbeat: `ping` is the only message
//! this client sends unsolicited, and `pong` is the server's liveness
//! acknowledgment, filtered before it can reach any consumer-visible
//! state.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::DataError;

/// Reserved message type for the client-sent heartbeat probe.
pub const TYPE_PING: &str = "ping";

/// Reserved message type for the server's heartbeat acknowledgment.
pub const TYPE_PONG: &str = "pong";

/// Message type requesting a status snapshot from the server.
pub const TYPE_STATUS_REQUEST: &str = "get_status";

/// A structured message on the realtime channel.
///
/// # Examples
///
/// ```
/// use guardian_core::data::ChannelMessage;
///
/// let msg = ChannelMessage::from_frame(
///     r#"{"type":"scan_complete","timestamp":"2024-01-01T00:00:00Z","result":{}}"#,
/// )
/// .unwrap();
/// assert_eq!(msg.kind, "scan_complete");
/// assert!(msg.payload.contains_key("result"));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelMessage {
    /// Message type discriminator.
    #[serde(rename = "type")]
    pub kind: String,

    /// Event time as reported by the server, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,

    /// All remaining fields of the wire object.
    #[serde(flatten)]
    pub payload: Map<String, Value>,
}

impl ChannelMessage {
    /// Creates an empty message of the given type.
    #[must_use]
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            timestamp: None,
            payload: Map::new(),
        }
    }

    /// Creates the heartbeat probe message.
    #[must_use]
    pub fn ping() -> Self {
        Self::new(TYPE_PING)
    }

    /// Creates the status request message.
    #[must_use]
    pub fn status_request() -> Self {
        Self::new(TYPE_STATUS_REQUEST)
    }

    /// Returns true if this is the server's heartbeat acknowledgment.
    #[must_use]
    pub fn is_pong(&self) -> bool {
        self.kind == TYPE_PONG
    }

    /// Returns true if this is the heartbeat probe.
    #[must_use]
    pub fn is_ping(&self) -> bool {
        self.kind == TYPE_PING
    }

    /// Decodes a raw text frame into a structured message.
    ///
    /// # Errors
    ///
    /// Returns `DataError::MalformedFrame` if the frame is not a JSON
    /// object with a string `type` field.
    pub fn from_frame(frame: &str) -> Result<Self, DataError> {
        serde_json::from_str(frame).map_err(|e| DataError::MalformedFrame {
            reason: e.to_string(),
        })
    }

    /// Encodes this message as a text frame.
    ///
    /// # Errors
    ///
    /// Returns `DataError::EncodeFailed` if serialization fails.
    pub fn to_frame(&self) -> Result<String, DataError> {
        serde_json::to_string(self).map_err(|e| DataError::EncodeFailed {
            reason: e.to_string(),
        })
    }
}
