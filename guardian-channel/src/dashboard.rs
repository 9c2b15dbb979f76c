//! Consumer-facing facade for the realtime channel.
//!
//! [`DashboardChannel`] is the single entry point the dashboard works
//! with: the connection flag, the most recent message, the bounded event
//! snapshot, and a send function. Internally it wires the channel client
//! to the event log and the invalidation bridge.

use async_trait::async_trait;
use parking_lot::RwLock;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info};

use guardian_core::data::{ChannelMessage, GuardianEvent};
use guardian_core::error::GuardianError;
use guardian_core::traits::ReadModelCache;

use crate::events::EventLog;
use crate::invalidation::{InvalidationBridge, InvalidationTable};
use crate::ws::{ChannelCallback, ChannelClient, ChannelConfig, ConnectionState};

/// State shared between the facade and the connection task.
struct ChannelShared {
    log: RwLock<EventLog>,
    last_message: RwLock<Option<ChannelMessage>>,
    bridge: InvalidationBridge,
}

/// Internal sink: records classified messages and dispatches
/// invalidations.
struct DashboardSink {
    shared: Arc<ChannelShared>,
    label: String,
}

#[async_trait]
impl ChannelCallback for DashboardSink {
    async fn on_event(&self, message: ChannelMessage) {
        *self.shared.last_message.write() = Some(message.clone());
        let event = self.shared.log.write().record(message);
        debug!(channel = %self.label, kind = %event.kind, id = %event.id, "event recorded");
        self.shared.bridge.apply(&event);
    }

    async fn on_connected(&self) {
        info!(channel = %self.label, "dashboard channel online");
    }

    async fn on_disconnected(&self, reason: Option<String>) {
        info!(
            channel = %self.label,
            reason = reason.as_deref().unwrap_or("unknown"),
            "dashboard channel offline"
        );
    }
}

/// The realtime channel as seen by the dashboard.
///
/// Owns the connection lifecycle: create on mount, connect, and the
/// channel tears itself down when dropped. Consumers only read the
/// connection flag and the event snapshot; the socket and all timers
/// stay inside the channel client.
///
/// # Example
///
/// ```ignore
/// use std::sync::Arc;
/// use guardian_channel::dashboard::DashboardChannel;
/// use guardian_channel::ws::ChannelConfig;
/// use guardian_core::traits::NullCache;
///
/// let config = ChannelConfig::builder()
///     .url("wss://guardian.example.com/ws")
///     .build();
/// let channel = DashboardChannel::new(config, Arc::new(NullCache))?;
/// channel.connect();
///
/// if channel.connected() {
///     println!("latest: {:?}", channel.last_message());
/// }
/// ```
pub struct DashboardChannel {
    client: ChannelClient,
    shared: Arc<ChannelShared>,
}

impl DashboardChannel {
    /// Creates a channel with the standard invalidation table.
    ///
    /// # Errors
    ///
    /// Returns `GuardianError::Config` if the configuration is invalid.
    pub fn new(
        config: ChannelConfig,
        cache: Arc<dyn ReadModelCache>,
    ) -> Result<Self, GuardianError> {
        Self::with_table(config, cache, InvalidationTable::default())
    }

    /// Creates a channel with a custom invalidation table.
    ///
    /// # Errors
    ///
    /// Returns `GuardianError::Config` if the configuration is invalid.
    pub fn with_table(
        config: ChannelConfig,
        cache: Arc<dyn ReadModelCache>,
        table: InvalidationTable,
    ) -> Result<Self, GuardianError> {
        config.validate()?;

        let shared = Arc::new(ChannelShared {
            log: RwLock::new(EventLog::new()),
            last_message: RwLock::new(None),
            bridge: InvalidationBridge::with_table(table, cache),
        });

        let client = ChannelClient::new(config.clone());
        client.set_callback(DashboardSink {
            shared: Arc::clone(&shared),
            label: config.label,
        });

        Ok(Self { client, shared })
    }

    /// Starts the connection. Idempotent while already running.
    pub fn connect(&self) {
        self.client.connect();
    }

    /// Tears the channel down. Idempotent; also invoked on drop.
    pub fn teardown(&self) {
        self.client.teardown();
    }

    /// Returns whether the channel is currently open.
    #[must_use]
    pub fn connected(&self) -> bool {
        self.client.is_open()
    }

    /// Returns the current connection state.
    #[must_use]
    pub fn state(&self) -> ConnectionState {
        self.client.state()
    }

    /// Returns the most recent consumer-visible message, if any.
    #[must_use]
    pub fn last_message(&self) -> Option<ChannelMessage> {
        self.shared.last_message.read().clone()
    }

    /// Returns the recent-activity snapshot, newest first.
    #[must_use]
    pub fn events(&self) -> Vec<GuardianEvent> {
        self.shared.log.read().snapshot()
    }

    /// Sends a message to the server; silently dropped while not open.
    pub async fn send<T: Serialize>(&self, message: &T) {
        self.client.send(message).await;
    }

    /// Asks the server for a status snapshot. The reply arrives as a
    /// regular `status` event.
    pub async fn request_status(&self) {
        self.send(&ChannelMessage::status_request()).await;
    }
}

impl Drop for DashboardChannel {
    fn drop(&mut self) {
        self.client.teardown();
    }
}
