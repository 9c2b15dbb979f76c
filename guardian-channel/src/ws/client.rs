//! Channel client with automatic reconnection and heartbeat.

use async_trait::async_trait;
use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use parking_lot::RwLock;
use serde::Serialize;
use std::sync::Arc;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::time::{interval_at, sleep, timeout, Instant, MissedTickBehavior};
use tokio_tungstenite::tungstenite::protocol::Message as TungsteniteMessage;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::{debug, info, warn};

use guardian_core::data::ChannelMessage;
use guardian_core::error::NetworkError;

use super::classify::{classify, Classification};
use super::config::ChannelConfig;
use super::state::{ConnectionState, InternalState};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;
type WsSink = SplitSink<WsStream, TungsteniteMessage>;
type WsSource = SplitStream<WsStream>;

/// Callback trait for channel events.
///
/// Heartbeat acknowledgments and malformed frames are filtered before
/// this seam: `on_event` only ever sees consumer-visible messages.
#[async_trait]
pub trait ChannelCallback: Send + Sync {
    /// Called for each classified, consumer-visible message.
    async fn on_event(&self, message: ChannelMessage);

    /// Called when the connection is established.
    async fn on_connected(&self) {}

    /// Called when the connection is lost or closed.
    async fn on_disconnected(&self, reason: Option<String>) {
        let _ = reason;
    }

    /// Called when a transport error occurs.
    async fn on_error(&self, error: NetworkError) {
        let _ = error;
    }
}

/// Channel client with automatic reconnection and heartbeat.
///
/// The client owns exactly one underlying socket at a time, driven by a
/// single spawned connection task. The task holds the socket and both
/// timers (heartbeat, reconnect delay), so tearing it down cancels all
/// scheduled work at once; there is no timer to leak.
///
/// # Example
///
/// ```ignore
/// use guardian_channel::ws::{ChannelClient, ChannelConfig};
///
/// let config = ChannelConfig::builder()
///     .url("wss://guardian.example.com/ws")
///     .build();
///
/// let client = ChannelClient::new(config);
/// client.connect();
/// ```
pub struct ChannelClient {
    config: ChannelConfig,
    state: Arc<RwLock<InternalState>>,
    callback: RwLock<Option<Arc<dyn ChannelCallback>>>,
    send_tx: Arc<RwLock<Option<mpsc::Sender<String>>>>,
    shutdown_tx: Arc<RwLock<Option<mpsc::Sender<()>>>>,
}

impl ChannelClient {
    /// Creates a new channel client with the given configuration.
    #[must_use]
    pub fn new(config: ChannelConfig) -> Self {
        Self {
            config,
            state: Arc::new(RwLock::new(InternalState::new())),
            callback: RwLock::new(None),
            send_tx: Arc::new(RwLock::new(None)),
            shutdown_tx: Arc::new(RwLock::new(None)),
        }
    }

    /// Sets the callback for receiving events.
    ///
    /// The callback is captured when `connect` spawns the connection
    /// task; set it before connecting.
    pub fn set_callback(&self, callback: impl ChannelCallback + 'static) {
        *self.callback.write() = Some(Arc::new(callback));
    }

    /// Returns the current connection state.
    #[must_use]
    pub fn state(&self) -> ConnectionState {
        self.state.read().state
    }

    /// Returns whether the channel is open.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.state.read().state.is_open()
    }

    /// Returns the number of reconnection attempts since the last
    /// successful open.
    #[must_use]
    pub fn reconnect_attempts(&self) -> u32 {
        self.state.read().reconnect_attempts
    }

    /// Starts the connection task.
    ///
    /// Idempotent: while a connection task is already running, or after
    /// `teardown`, this is a no-op. Must be called from within a Tokio
    /// runtime; returns immediately, the socket opens in the background.
    pub fn connect(&self) {
        let mut shutdown_slot = self.shutdown_tx.write();
        if shutdown_slot.is_some() {
            debug!(channel = %self.config.label, "connect ignored, channel already running");
            return;
        }
        {
            let mut state = self.state.write();
            if state.state.is_terminal() {
                debug!(channel = %self.config.label, "connect ignored after teardown");
                return;
            }
            state.mark_connecting();
        }

        let (shutdown_tx, shutdown_rx) = mpsc::channel(1);
        *shutdown_slot = Some(shutdown_tx);

        let task = ConnectionTask {
            config: self.config.clone(),
            state: Arc::clone(&self.state),
            callback: self.callback.read().clone(),
            send_slot: Arc::clone(&self.send_tx),
            shutdown_slot: Arc::clone(&self.shutdown_tx),
        };
        tokio::spawn(task.run(shutdown_rx));
    }

    /// Tears the channel down.
    ///
    /// A hard cut: marks the channel closed, signals the connection task
    /// to close any open socket, and cancels the pending reconnect and
    /// heartbeat along with it. Safe to call multiple times; no reconnect
    /// occurs afterwards even if a close event is still in flight.
    pub fn teardown(&self) {
        let sender = self.shutdown_tx.write().take();
        let was_live = sender.is_some();
        if let Some(sender) = sender {
            let _ = sender.try_send(());
        }
        *self.send_tx.write() = None;
        {
            let mut state = self.state.write();
            if !state.state.is_terminal() {
                state.mark_closed();
            }
        }
        if was_live {
            info!(channel = %self.config.label, "channel torn down");
        }
    }

    /// Sends a message to the server.
    ///
    /// Transmits only while the channel is open; otherwise the message is
    /// silently dropped. There is no queueing and no error surfaced to
    /// the caller.
    pub async fn send<T: Serialize>(&self, message: &T) {
        let open = self.state.read().state.is_open();
        if !open {
            debug!(channel = %self.config.label, "channel not open, dropping outbound message");
            return;
        }
        let text = match serde_json::to_string(message) {
            Ok(text) => text,
            Err(error) => {
                warn!(channel = %self.config.label, error = %error, "failed to encode outbound message");
                return;
            }
        };
        let sender = self.send_tx.read().clone();
        match sender {
            Some(sender) => {
                if sender.send(text).await.is_err() {
                    debug!(channel = %self.config.label, "connection task gone, message dropped");
                }
            }
            None => {
                debug!(channel = %self.config.label, "no active connection, message dropped");
            }
        }
    }
}

/// How a connection session ended.
enum SessionEnd {
    /// Teardown was requested; the task must exit.
    Teardown,
    /// The connection was lost; a reconnect may follow.
    Lost,
}

/// The spawned task owning the socket and both timers.
struct ConnectionTask {
    config: ChannelConfig,
    state: Arc<RwLock<InternalState>>,
    callback: Option<Arc<dyn ChannelCallback>>,
    send_slot: Arc<RwLock<Option<mpsc::Sender<String>>>>,
    shutdown_slot: Arc<RwLock<Option<mpsc::Sender<()>>>>,
}

impl ConnectionTask {
    async fn run(self, mut shutdown_rx: mpsc::Receiver<()>) {
        let end = loop {
            match self.session(&mut shutdown_rx).await {
                SessionEnd::Teardown => break SessionEnd::Teardown,
                SessionEnd::Lost => {
                    if !self.config.reconnect_enabled {
                        info!(channel = %self.config.label, "reconnect disabled, channel stays down");
                        break SessionEnd::Lost;
                    }
                    tokio::select! {
                        _ = shutdown_rx.recv() => break SessionEnd::Teardown,
                        () = sleep(self.config.reconnect_delay()) => {}
                    }
                    let attempt = {
                        let mut state = self.state.write();
                        if state.state.is_terminal() {
                            None
                        } else {
                            state.record_reconnect_attempt();
                            state.mark_connecting();
                            Some(state.reconnect_attempts)
                        }
                    };
                    match attempt {
                        Some(attempt) => {
                            debug!(channel = %self.config.label, attempt, "reconnecting");
                        }
                        None => break SessionEnd::Teardown,
                    }
                }
            }
        };

        *self.send_slot.write() = None;
        *self.shutdown_slot.write() = None;
        if matches!(end, SessionEnd::Teardown) {
            self.state.write().mark_closed();
        }
        debug!(channel = %self.config.label, "connection task finished");
    }

    /// Runs one connection attempt plus, on success, the frame loop.
    async fn session(&self, shutdown_rx: &mut mpsc::Receiver<()>) -> SessionEnd {
        let connecting = timeout(
            self.config.connect_timeout(),
            connect_async(self.config.url.as_str()),
        );
        let mut ws_stream = tokio::select! {
            _ = shutdown_rx.recv() => return SessionEnd::Teardown,
            outcome = connecting => match outcome {
                Ok(Ok((stream, _response))) => stream,
                Ok(Err(error)) => {
                    warn!(channel = %self.config.label, error = %error, "connection failed");
                    self.state.write().mark_disconnected();
                    self.notify_error(NetworkError::ConnectionFailed {
                        reason: error.to_string(),
                    })
                    .await;
                    return SessionEnd::Lost;
                }
                Err(_) => {
                    warn!(
                        channel = %self.config.label,
                        timeout_ms = self.config.connect_timeout_ms,
                        "connection attempt timed out"
                    );
                    self.state.write().mark_disconnected();
                    self.notify_error(NetworkError::Timeout {
                        timeout_ms: self.config.connect_timeout_ms,
                    })
                    .await;
                    return SessionEnd::Lost;
                }
            }
        };

        let torn_down = {
            let mut state = self.state.write();
            if state.state.is_terminal() {
                true
            } else {
                state.mark_connected();
                false
            }
        };
        if torn_down {
            // Teardown raced the handshake; the fresh socket must not live.
            debug!(channel = %self.config.label, "torn down during handshake, closing socket");
            let _ = ws_stream.close(None).await;
            return SessionEnd::Teardown;
        }
        info!(channel = %self.config.label, url = %self.config.url, "channel connected");
        if let Some(callback) = &self.callback {
            callback.on_connected().await;
        }

        let (sink, stream) = ws_stream.split();
        let (send_tx, send_rx) = mpsc::channel::<String>(64);
        *self.send_slot.write() = Some(send_tx);

        let end = self.drive(sink, stream, send_rx, shutdown_rx).await;
        *self.send_slot.write() = None;
        end
    }

    /// The frame loop: inbound frames, outbound sends, heartbeat,
    /// shutdown. Runs until the socket drops or teardown is requested.
    async fn drive(
        &self,
        mut sink: WsSink,
        mut stream: WsSource,
        mut send_rx: mpsc::Receiver<String>,
        shutdown_rx: &mut mpsc::Receiver<()>,
    ) -> SessionEnd {
        let period = self.config.heartbeat_interval();
        // First probe one full interval after open, then steady-state.
        let mut heartbeat = interval_at(Instant::now() + period, period);
        heartbeat.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = shutdown_rx.recv() => {
                    debug!(channel = %self.config.label, "shutdown requested, closing socket");
                    let _ = sink.close().await;
                    return SessionEnd::Teardown;
                }

                Some(text) = send_rx.recv() => {
                    if let Err(error) = sink.send(TungsteniteMessage::Text(text)).await {
                        warn!(channel = %self.config.label, error = %error, "failed to send message");
                        self.notify_error(NetworkError::WebSocket {
                            reason: error.to_string(),
                        })
                        .await;
                    }
                }

                frame = stream.next() => {
                    match frame {
                        Some(Ok(message)) => {
                            if let Some(end) = self.handle_frame(&mut sink, message).await {
                                return end;
                            }
                        }
                        Some(Err(error)) => {
                            warn!(channel = %self.config.label, error = %error, "transport error");
                            self.state.write().mark_disconnected();
                            self.notify_error(NetworkError::WebSocket {
                                reason: error.to_string(),
                            })
                            .await;
                            self.notify_disconnected(Some(error.to_string())).await;
                            return SessionEnd::Lost;
                        }
                        None => {
                            info!(channel = %self.config.label, "stream ended");
                            self.state.write().mark_disconnected();
                            self.notify_disconnected(Some("stream ended".to_string())).await;
                            return SessionEnd::Lost;
                        }
                    }
                }

                _ = heartbeat.tick() => {
                    // Liveness check: teardown may have landed between the
                    // tick being scheduled and this branch running.
                    let open = self.state.read().state.is_open();
                    if self.config.auto_ping && open {
                        self.send_heartbeat(&mut sink).await;
                    }
                }
            }
        }
    }

    /// Handles one inbound frame. Returns `Some` when the session ends.
    async fn handle_frame(
        &self,
        sink: &mut WsSink,
        message: TungsteniteMessage,
    ) -> Option<SessionEnd> {
        match message {
            TungsteniteMessage::Text(text) => {
                self.state.write().record_frame();
                match classify(&text) {
                    Classification::Event(message) => {
                        if let Some(callback) = &self.callback {
                            callback.on_event(message).await;
                        }
                    }
                    Classification::HeartbeatAck => {
                        self.state.write().record_pong();
                        debug!(channel = %self.config.label, "heartbeat acknowledged");
                    }
                    Classification::Malformed => {}
                }
                None
            }
            TungsteniteMessage::Ping(data) => {
                if let Err(error) = sink.send(TungsteniteMessage::Pong(data)).await {
                    warn!(channel = %self.config.label, error = %error, "failed to answer protocol ping");
                }
                None
            }
            TungsteniteMessage::Pong(_) => {
                self.state.write().record_pong();
                None
            }
            TungsteniteMessage::Close(frame) => {
                info!(channel = %self.config.label, "server closed connection");
                self.state.write().mark_disconnected();
                self.notify_disconnected(frame.map(|f| f.reason.to_string()))
                    .await;
                Some(SessionEnd::Lost)
            }
            TungsteniteMessage::Binary(_) => {
                debug!(channel = %self.config.label, "ignoring binary frame");
                None
            }
            TungsteniteMessage::Frame(_) => None,
        }
    }

    async fn send_heartbeat(&self, sink: &mut WsSink) {
        match ChannelMessage::ping().to_frame() {
            Ok(text) => {
                self.state.write().record_ping();
                if let Err(error) = sink.send(TungsteniteMessage::Text(text)).await {
                    warn!(channel = %self.config.label, error = %error, "failed to send heartbeat");
                } else {
                    debug!(channel = %self.config.label, "heartbeat sent");
                }
            }
            Err(error) => {
                warn!(channel = %self.config.label, error = %error, "failed to encode heartbeat");
            }
        }
    }

    async fn notify_error(&self, error: NetworkError) {
        if let Some(callback) = &self.callback {
            callback.on_error(error).await;
        }
    }

    async fn notify_disconnected(&self, reason: Option<String>) {
        if let Some(callback) = &self.callback {
            callback.on_disconnected(reason).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use tokio::net::TcpListener;
    use tokio_tungstenite::accept_async;

    fn test_config(url: String) -> ChannelConfig {
        ChannelConfig::builder()
            .url(url)
            .connect_timeout(Duration::from_secs(5))
            .reconnect_delay(Duration::from_millis(100))
            .heartbeat_interval(Duration::from_secs(30))
            .label("test")
            .build()
    }

    #[derive(Default)]
    struct RecorderState {
        events: Mutex<Vec<ChannelMessage>>,
        connects: AtomicUsize,
        disconnects: AtomicUsize,
    }

    struct Recorder(Arc<RecorderState>);

    #[async_trait]
    impl ChannelCallback for Recorder {
        async fn on_event(&self, message: ChannelMessage) {
            self.0.events.lock().push(message);
        }

        async fn on_connected(&self) {
            self.0.connects.fetch_add(1, Ordering::SeqCst);
        }

        async fn on_disconnected(&self, _reason: Option<String>) {
            self.0.disconnects.fetch_add(1, Ordering::SeqCst);
        }
    }

    async fn wait_until(what: &str, mut condition: impl FnMut() -> bool) {
        let deadline = Instant::now() + Duration::from_secs(5);
        while !condition() {
            assert!(Instant::now() < deadline, "timed out waiting for {what}");
            sleep(Duration::from_millis(10)).await;
        }
    }

    #[tokio::test]
    async fn delivers_classified_events_and_filters_noise() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            let mut ws = accept_async(stream).await.unwrap();
            ws.send(TungsteniteMessage::Text(r#"{"type":"pong"}"#.into()))
                .await
                .unwrap();
            ws.send(TungsteniteMessage::Text("not json".into()))
                .await
                .unwrap();
            ws.send(TungsteniteMessage::Text(
                r#"{"type":"health_update","status":"healthy"}"#.into(),
            ))
            .await
            .unwrap();
            while ws.next().await.is_some() {}
        });

        let recorder = Arc::new(RecorderState::default());
        let client = ChannelClient::new(test_config(format!("ws://{addr}")));
        client.set_callback(Recorder(Arc::clone(&recorder)));
        client.connect();

        wait_until("event delivery", || !recorder.events.lock().is_empty()).await;

        let events = recorder.events.lock().clone();
        assert_eq!(events.len(), 1, "pong and malformed frames must not surface");
        assert_eq!(events[0].kind, "health_update");
        assert!(client.is_open());
        assert_eq!(recorder.connects.load(Ordering::SeqCst), 1);

        client.teardown();
    }

    #[tokio::test]
    async fn connect_is_idempotent_while_running() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let accepted = Arc::new(AtomicUsize::new(0));
        let server_accepted = Arc::clone(&accepted);
        tokio::spawn(async move {
            loop {
                let (stream, _) = listener.accept().await.unwrap();
                server_accepted.fetch_add(1, Ordering::SeqCst);
                tokio::spawn(async move {
                    let mut ws = accept_async(stream).await.unwrap();
                    while ws.next().await.is_some() {}
                });
            }
        });

        let client = ChannelClient::new(test_config(format!("ws://{addr}")));
        client.connect();
        client.connect();
        client.connect();

        wait_until("open", || client.is_open()).await;
        client.connect();
        sleep(Duration::from_millis(200)).await;

        assert_eq!(accepted.load(Ordering::SeqCst), 1);
        client.teardown();
    }

    #[tokio::test]
    async fn reconnects_after_remote_drop() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let accepted = Arc::new(AtomicUsize::new(0));
        let server_accepted = Arc::clone(&accepted);
        tokio::spawn(async move {
            loop {
                let (stream, _) = listener.accept().await.unwrap();
                let n = server_accepted.fetch_add(1, Ordering::SeqCst);
                tokio::spawn(async move {
                    let mut ws = accept_async(stream).await.unwrap();
                    if n == 0 {
                        // Drop the first connection right after the handshake.
                        let _ = ws.close(None).await;
                    } else {
                        while ws.next().await.is_some() {}
                    }
                });
            }
        });

        let recorder = Arc::new(RecorderState::default());
        let client = ChannelClient::new(test_config(format!("ws://{addr}")));
        client.set_callback(Recorder(Arc::clone(&recorder)));
        client.connect();

        wait_until("second accept", || accepted.load(Ordering::SeqCst) >= 2).await;
        wait_until("reopen", || client.is_open()).await;

        assert!(recorder.disconnects.load(Ordering::SeqCst) >= 1);
        assert_eq!(recorder.connects.load(Ordering::SeqCst), 2);
        client.teardown();
    }

    #[tokio::test]
    async fn teardown_is_idempotent_and_stops_reconnect() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let accepted = Arc::new(AtomicUsize::new(0));
        let server_accepted = Arc::clone(&accepted);
        tokio::spawn(async move {
            loop {
                let (stream, _) = listener.accept().await.unwrap();
                server_accepted.fetch_add(1, Ordering::SeqCst);
                tokio::spawn(async move {
                    let mut ws = accept_async(stream).await.unwrap();
                    while ws.next().await.is_some() {}
                });
            }
        });

        let client = ChannelClient::new(test_config(format!("ws://{addr}")));
        client.connect();
        wait_until("open", || client.is_open()).await;

        client.teardown();
        client.teardown();

        assert_eq!(client.state(), ConnectionState::Closed);
        assert!(!client.is_open());

        // Well past the reconnect delay: no new connection may appear.
        sleep(Duration::from_millis(400)).await;
        assert_eq!(accepted.load(Ordering::SeqCst), 1);

        // The channel is inert now.
        client.connect();
        sleep(Duration::from_millis(200)).await;
        assert_eq!(accepted.load(Ordering::SeqCst), 1);
        assert_eq!(client.state(), ConnectionState::Closed);
    }

    #[tokio::test]
    async fn sends_heartbeat_probe_while_open() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (seen_tx, mut seen_rx) = mpsc::channel::<String>(8);
        tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            let mut ws = accept_async(stream).await.unwrap();
            while let Some(Ok(message)) = ws.next().await {
                if let TungsteniteMessage::Text(text) = message {
                    seen_tx.send(text).await.unwrap();
                }
            }
        });

        let config = ChannelConfig::builder()
            .url(format!("ws://{addr}"))
            .heartbeat_interval(Duration::from_millis(100))
            .reconnect_delay(Duration::from_millis(100))
            .label("test")
            .build();
        let client = ChannelClient::new(config);
        client.connect();

        let first = timeout(Duration::from_secs(5), seen_rx.recv())
            .await
            .expect("heartbeat not sent")
            .unwrap();
        assert_eq!(first, r#"{"type":"ping"}"#);
        client.teardown();
    }

    #[tokio::test]
    async fn send_while_disconnected_is_silently_dropped() {
        let client = ChannelClient::new(test_config("ws://127.0.0.1:9".to_string()));
        client.send(&ChannelMessage::status_request()).await;
        assert!(!client.is_open());
    }

    #[tokio::test]
    async fn send_reaches_server_while_open() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (seen_tx, mut seen_rx) = mpsc::channel::<String>(8);
        tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            let mut ws = accept_async(stream).await.unwrap();
            while let Some(Ok(message)) = ws.next().await {
                if let TungsteniteMessage::Text(text) = message {
                    seen_tx.send(text).await.unwrap();
                }
            }
        });

        let client = ChannelClient::new(test_config(format!("ws://{addr}")));
        client.connect();
        wait_until("open", || client.is_open()).await;

        client.send(&ChannelMessage::status_request()).await;

        let seen = timeout(Duration::from_secs(5), seen_rx.recv())
            .await
            .expect("message not delivered")
            .unwrap();
        assert_eq!(seen, r#"{"type":"get_status"}"#);
        client.teardown();
    }
}
