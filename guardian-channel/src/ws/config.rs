//! Channel client configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use guardian_core::error::ConfigError;

/// Configuration for the realtime channel client.
///
/// Contains the endpoint, reconnection parameters, and heartbeat
/// configuration. The reconnect delay is fixed, not exponential: the
/// channel is small and trusted, an idle reconnect attempt is cheap, and
/// the dashboard must recover without user intervention. The delay is a
/// tunable should constant-rate reconnect traffic ever become a concern.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelConfig {
    /// WebSocket endpoint URL.
    pub url: String,

    /// Connection timeout in milliseconds.
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,

    /// Whether automatic reconnection is enabled.
    #[serde(default = "default_reconnect_enabled")]
    pub reconnect_enabled: bool,

    /// Fixed delay before each reconnection attempt, in milliseconds.
    #[serde(default = "default_reconnect_delay_ms")]
    pub reconnect_delay_ms: u64,

    /// Heartbeat probe interval in milliseconds.
    #[serde(default = "default_heartbeat_interval_ms")]
    pub heartbeat_interval_ms: u64,

    /// Whether to send heartbeat probes automatically.
    #[serde(default = "default_auto_ping")]
    pub auto_ping: bool,

    /// Channel identifier for logging.
    #[serde(default = "default_label")]
    pub label: String,
}

fn default_connect_timeout_ms() -> u64 {
    10_000
}

fn default_reconnect_enabled() -> bool {
    true
}

fn default_reconnect_delay_ms() -> u64 {
    3_000
}

fn default_heartbeat_interval_ms() -> u64 {
    30_000
}

fn default_auto_ping() -> bool {
    true
}

fn default_label() -> String {
    "guardian".to_string()
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            connect_timeout_ms: default_connect_timeout_ms(),
            reconnect_enabled: default_reconnect_enabled(),
            reconnect_delay_ms: default_reconnect_delay_ms(),
            heartbeat_interval_ms: default_heartbeat_interval_ms(),
            auto_ping: default_auto_ping(),
            label: default_label(),
        }
    }
}

impl ChannelConfig {
    /// Creates a new builder for `ChannelConfig`.
    #[must_use]
    pub fn builder() -> ChannelConfigBuilder {
        ChannelConfigBuilder::default()
    }

    /// Returns the connection timeout as a Duration.
    #[must_use]
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    /// Returns the reconnect delay as a Duration.
    #[must_use]
    pub fn reconnect_delay(&self) -> Duration {
        Duration::from_millis(self.reconnect_delay_ms)
    }

    /// Returns the heartbeat interval as a Duration.
    #[must_use]
    pub fn heartbeat_interval(&self) -> Duration {
        Duration::from_millis(self.heartbeat_interval_ms)
    }

    /// Checks the configuration for values the client cannot run with.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the endpoint is missing or not a
    /// WebSocket URL, or if a timer interval is zero.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.url.is_empty() {
            return Err(ConfigError::MissingField {
                field: "url".to_string(),
            });
        }
        if !self.url.starts_with("ws://") && !self.url.starts_with("wss://") {
            return Err(ConfigError::InvalidEndpoint {
                url: self.url.clone(),
                reason: "expected a ws or wss URL".to_string(),
            });
        }
        if self.heartbeat_interval_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "heartbeat_interval_ms".to_string(),
                reason: "must be positive".to_string(),
            });
        }
        if self.reconnect_delay_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "reconnect_delay_ms".to_string(),
                reason: "must be positive".to_string(),
            });
        }
        Ok(())
    }
}

/// Derives the channel endpoint from the hosting page URL.
///
/// A secure page gets a secure socket scheme, the host is kept, and the
/// fixed channel path is appended.
///
/// # Errors
///
/// Returns `ConfigError::InvalidEndpoint` if the page URL is not http(s)
/// or has no host.
///
/// # Examples
///
/// ```
/// use guardian_channel::ws::endpoint_for_page;
///
/// let url = endpoint_for_page("https://guardian.example.com/dashboard").unwrap();
/// assert_eq!(url, "wss://guardian.example.com/ws");
///
/// let url = endpoint_for_page("http://localhost:8000").unwrap();
/// assert_eq!(url, "ws://localhost:8000/ws");
/// ```
pub fn endpoint_for_page(page_url: &str) -> Result<String, ConfigError> {
    let (scheme, rest) = if let Some(rest) = page_url.strip_prefix("https://") {
        ("wss", rest)
    } else if let Some(rest) = page_url.strip_prefix("http://") {
        ("ws", rest)
    } else {
        return Err(ConfigError::InvalidEndpoint {
            url: page_url.to_string(),
            reason: "expected an http or https page URL".to_string(),
        });
    };

    let authority = rest
        .split(['/', '?', '#'])
        .next()
        .unwrap_or_default();
    if authority.is_empty() {
        return Err(ConfigError::InvalidEndpoint {
            url: page_url.to_string(),
            reason: "page URL has no host".to_string(),
        });
    }

    Ok(format!("{scheme}://{authority}/ws"))
}

/// Builder for `ChannelConfig`.
#[derive(Debug, Default)]
pub struct ChannelConfigBuilder {
    url: Option<String>,
    connect_timeout_ms: Option<u64>,
    reconnect_enabled: Option<bool>,
    reconnect_delay_ms: Option<u64>,
    heartbeat_interval_ms: Option<u64>,
    auto_ping: Option<bool>,
    label: Option<String>,
}

impl ChannelConfigBuilder {
    /// Sets the WebSocket endpoint URL.
    #[must_use]
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Sets the connection timeout.
    #[must_use]
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout_ms = Some(timeout.as_millis() as u64);
        self
    }

    /// Sets whether reconnection is enabled.
    #[must_use]
    pub fn reconnect_enabled(mut self, enabled: bool) -> Self {
        self.reconnect_enabled = Some(enabled);
        self
    }

    /// Sets the fixed reconnection delay.
    #[must_use]
    pub fn reconnect_delay(mut self, delay: Duration) -> Self {
        self.reconnect_delay_ms = Some(delay.as_millis() as u64);
        self
    }

    /// Sets the heartbeat interval.
    #[must_use]
    pub fn heartbeat_interval(mut self, interval: Duration) -> Self {
        self.heartbeat_interval_ms = Some(interval.as_millis() as u64);
        self
    }

    /// Sets whether heartbeat probes are sent automatically.
    #[must_use]
    pub fn auto_ping(mut self, enabled: bool) -> Self {
        self.auto_ping = Some(enabled);
        self
    }

    /// Sets the channel identifier used in logs.
    #[must_use]
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Builds the `ChannelConfig`.
    #[must_use]
    pub fn build(self) -> ChannelConfig {
        ChannelConfig {
            url: self.url.unwrap_or_default(),
            connect_timeout_ms: self
                .connect_timeout_ms
                .unwrap_or_else(default_connect_timeout_ms),
            reconnect_enabled: self
                .reconnect_enabled
                .unwrap_or_else(default_reconnect_enabled),
            reconnect_delay_ms: self
                .reconnect_delay_ms
                .unwrap_or_else(default_reconnect_delay_ms),
            heartbeat_interval_ms: self
                .heartbeat_interval_ms
                .unwrap_or_else(default_heartbeat_interval_ms),
            auto_ping: self.auto_ping.unwrap_or_else(default_auto_ping),
            label: self.label.unwrap_or_else(default_label),
        }
    }
}
