//! # Guardian Channel
//!
//! Realtime plumbing for the Cluster Guardian dashboard.
//!
//! This crate keeps the dashboard's cached read-models synchronized with
//! server-pushed events over a long-lived WebSocket connection, tolerating
//! network interruption transparently. It provides:
//! - A WebSocket client with automatic reconnection and heartbeat
//! - Inbound frame classification with heartbeat filtering
//! - A bounded, newest-first event log driving the recent-activity view
//! - An invalidation bridge dispatching cache refreshes by event type
//! - The [`DashboardChannel`](dashboard::DashboardChannel) facade composing
//!   all of the above
//!
//! # Architecture
//!
//! The crate is organized into:
//! - `ws` - WebSocket client infrastructure
//! - `events` - Bounded event log
//! - `invalidation` - Event type to cache key dispatch
//! - `dashboard` - Consumer-facing facade
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use guardian_channel::dashboard::DashboardChannel;
//! use guardian_channel::ws::{endpoint_for_page, ChannelConfig};
//! use guardian_core::traits::NullCache;
//!
//! let config = ChannelConfig::builder()
//!     .url(endpoint_for_page("https://guardian.example.com/dashboard")?)
//!     .build();
//!
//! let channel = DashboardChannel::new(config, Arc::new(NullCache))?;
//! channel.connect();
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::cast_possible_truncation)]

/// WebSocket client infrastructure
pub mod ws;

/// Bounded event log
pub mod events;

/// Cache invalidation dispatch
pub mod invalidation;

/// Consumer-facing facade
pub mod dashboard;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::dashboard::DashboardChannel;
    pub use crate::events::{EventLog, MAX_EVENTS};
    pub use crate::invalidation::{keys, InvalidationBridge, InvalidationTable};
    pub use crate::ws::{
        endpoint_for_page, ChannelCallback, ChannelClient, ChannelConfig, ChannelConfigBuilder,
        ConnectionState,
    };
}
