//! WebSocket client infrastructure.
//!
//! This module provides the realtime channel's transport layer:
//! - Automatic reconnection with a fixed, tunable delay
//! - Heartbeat probe sent while the connection is open
//! - Inbound frame classification with heartbeat filtering
//! - Connection state management with an explicit terminal state
//!
//! # Example
//!
//! ```ignore
//! use guardian_channel::ws::{ChannelCallback, ChannelClient, ChannelConfig};
//!
//! let config = ChannelConfig::builder()
//!     .url("wss://guardian.example.com/ws")
//!     .build();
//!
//! let client = ChannelClient::new(config);
//! client.set_callback(MyCallback);
//! client.connect();
//! ```

pub mod classify;
mod client;
mod config;
mod state;

pub use classify::{classify, Classification};
pub use client::{ChannelCallback, ChannelClient};
pub use config::{endpoint_for_page, ChannelConfig, ChannelConfigBuilder};
pub use state::ConnectionState;
