//! Bounded, newest-first event log.
//!
//! Drives the dashboard's recent-activity view. The log holds at most
//! [`MAX_EVENTS`] entries; recording past capacity evicts the oldest.
//! Entries are immutable once recorded.

use std::collections::VecDeque;

use guardian_core::data::{ChannelMessage, GuardianEvent};
use guardian_core::types::Timestamp;

/// Maximum number of events retained.
pub const MAX_EVENTS: usize = 50;

/// Bounded event history, newest at index 0.
///
/// Event ids combine the receipt time with a monotonic sequence number,
/// so they stay unique even when a burst of events lands within one
/// millisecond.
#[derive(Debug)]
pub struct EventLog {
    entries: VecDeque<GuardianEvent>,
    capacity: usize,
    next_seq: u64,
}

impl EventLog {
    /// Creates a log with the default capacity of [`MAX_EVENTS`].
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(MAX_EVENTS)
    }

    /// Creates a log with a custom capacity.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
            next_seq: 0,
        }
    }

    /// Records a classified message as an event.
    ///
    /// Prepends the new event and evicts the oldest entry once the log
    /// is at capacity. Returns a copy of the recorded event.
    pub fn record(&mut self, message: ChannelMessage) -> GuardianEvent {
        let received = Timestamp::now();
        let seq = self.next_seq;
        self.next_seq += 1;
        let id = format!("evt-{}-{seq}", received.as_millis());

        let event = GuardianEvent::from_message(id, message, received);
        self.entries.push_front(event.clone());
        self.entries.truncate(self.capacity);
        event
    }

    /// Returns the most recently recorded event.
    #[must_use]
    pub fn latest(&self) -> Option<&GuardianEvent> {
        self.entries.front()
    }

    /// Returns a read-only snapshot of the log, newest first.
    #[must_use]
    pub fn snapshot(&self) -> Vec<GuardianEvent> {
        self.entries.iter().cloned().collect()
    }

    /// Returns the number of retained events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no events have been retained.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the log capacity.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for EventLog {
    fn default() -> Self {
        Self::new()
    }
}
