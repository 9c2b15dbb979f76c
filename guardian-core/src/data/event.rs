//! Immutable events stored in the bounded event log.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::message::ChannelMessage;
use crate::types::Timestamp;

/// An event as recorded in the activity log.
///
/// Created from a classified [`ChannelMessage`] on receipt and never
/// mutated afterwards. The `timestamp` falls back to the local receipt
/// time when the server did not report one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GuardianEvent {
    /// Unique event id, monotonically assigned on receipt.
    pub id: String,

    /// Event type discriminator.
    #[serde(rename = "type")]
    pub kind: String,

    /// Event time, ISO-8601.
    pub timestamp: String,

    /// Event payload as received on the wire.
    pub payload: Map<String, Value>,
}

impl GuardianEvent {
    /// Builds an event from a classified message.
    #[must_use]
    pub fn from_message(id: String, message: ChannelMessage, received: Timestamp) -> Self {
        let timestamp = message
            .timestamp
            .unwrap_or_else(|| received.to_rfc3339());
        Self {
            id,
            kind: message.kind,
            timestamp,
            payload: message.payload,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_timestamp_is_kept() {
        let msg = ChannelMessage::from_frame(
            r#"{"type":"scan_complete","timestamp":"2024-01-01T00:00:00Z"}"#,
        )
        .unwrap();
        let event =
            GuardianEvent::from_message("evt-1-0".to_string(), msg, Timestamp::now());
        assert_eq!(event.timestamp, "2024-01-01T00:00:00Z");
        assert_eq!(event.kind, "scan_complete");
    }

    #[test]
    fn test_receipt_time_fallback() {
        let received = Timestamp::new(1_704_067_200_000).unwrap();
        let msg = ChannelMessage::new("health_update");
        let event = GuardianEvent::from_message("evt-1-0".to_string(), msg, received);
        assert_eq!(event.timestamp, "2024-01-01T00:00:00.000Z");
    }
}
