//! Inbound frame classification.
//!
//! Every text frame is decoded into a structured message, then sorted
//! into one of three bins: a consumer-visible event, a heartbeat
//! acknowledgment, or a malformed frame. The latter two never reach any
//! consumer-visible state.

use tracing::debug;

use guardian_core::data::ChannelMessage;

/// Outcome of classifying a single inbound frame.
#[derive(Debug, Clone, PartialEq)]
pub enum Classification {
    /// A consumer-visible event message.
    Event(ChannelMessage),
    /// The server's heartbeat acknowledgment; proves liveness only.
    HeartbeatAck,
    /// An undecodable frame; dropped with no state change.
    Malformed,
}

/// Classifies a raw text frame.
///
/// Decoding failures are logged at debug level and otherwise silent: a
/// non-conforming frame must not crash or disturb the channel.
#[must_use]
pub fn classify(frame: &str) -> Classification {
    match ChannelMessage::from_frame(frame) {
        Ok(message) if message.is_pong() => Classification::HeartbeatAck,
        Ok(message) => Classification::Event(message),
        Err(error) => {
            debug!(error = %error, "dropping malformed frame");
            Classification::Malformed
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_frame() {
        let classification =
            classify(r#"{"type":"scan_complete","result":{"pods_checked":12}}"#);
        match classification {
            Classification::Event(message) => {
                assert_eq!(message.kind, "scan_complete");
                assert_eq!(message.payload["result"]["pods_checked"], 12);
            }
            other => panic!("expected event, got {other:?}"),
        }
    }

    #[test]
    fn test_pong_is_filtered() {
        assert_eq!(classify(r#"{"type":"pong"}"#), Classification::HeartbeatAck);
    }

    #[test]
    fn test_pong_with_extra_fields_is_still_filtered() {
        assert_eq!(
            classify(r#"{"type":"pong","timestamp":"2024-01-01T00:00:00Z"}"#),
            Classification::HeartbeatAck
        );
    }

    #[test]
    fn test_malformed_frames_are_dropped() {
        assert_eq!(classify("not json"), Classification::Malformed);
        assert_eq!(classify(""), Classification::Malformed);
        assert_eq!(classify(r#"{"no_type":true}"#), Classification::Malformed);
        assert_eq!(classify("[1,2,3]"), Classification::Malformed);
    }

    #[test]
    fn test_unknown_event_types_pass_through() {
        // Protocol evolution: new server-side types must stay visible.
        match classify(r#"{"type":"deploy_started"}"#) {
            Classification::Event(message) => assert_eq!(message.kind, "deploy_started"),
            other => panic!("expected event, got {other:?}"),
        }
    }
}
