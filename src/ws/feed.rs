//! The live feed session: connect, authenticate, dispatch, reconnect.
//!
//! # Architecture
//!
//! ```text
//!   caller ── start/stop ──┐            ┌── subscribe/unsubscribe (block until Authenticated)
//!                          ▼            ▼
//!                    StreamingFeed ── Shared { state, writer (async mutex), subscriptions }
//!                          │                      ▲
//!                     tokio task                  │ writes serialized by the mutex
//!                          ▼                      │
//!        Disconnected → Connecting → Connected → Authenticated
//!              ▲                                   │
//!              └──── fixed delay ◄── read error ───┘
//! ```
//!
//! A single worker task owns the read half. It decodes each frame and calls
//! the registered [`FeedHandlers`] inline, so messages are dispatched one at
//! a time in arrival order. Any read error tears the connection down
//! completely and, after [`FeedConfig::reconnect_delay`], a new one is
//! attempted. There is no retry cap and no backoff. A handler that panics
//! is treated the same way as a read error.
//!
//! # Example
//!
//! ```no_run
//! use noren_rs::NorenClient;
//! use noren_rs::ws::handler::FeedHandlers;
//! use noren_rs::ws::message::{FeedKind, MarketData};
//!
//! # #[tokio::main]
//! # async fn main() -> noren_rs::Result<()> {
//! let mut client = NorenClient::new("https://broker.example/NorenWClientTP", "wss://broker.example/NorenWSTP/");
//! client.set_session("FA12345", "session-token");
//!
//! let feed = client.feed()?;
//! feed.start(FeedHandlers::new().on_market_data(|d: &MarketData| println!("{d:?}")));
//! feed.subscribe(&["NSE|22", "NSE|2885"], FeedKind::Touchline).await?;
//! feed.subscribe_orders().await?;
//! // ...
//! feed.stop().await;
//! # Ok(())
//! # }
//! ```

use std::collections::BTreeSet;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::sync::{Mutex as AsyncMutex, watch};
use tokio::task::JoinHandle;

use crate::constants::{DEFAULT_RECONNECT_DELAY_MS, SOURCE_API};
use crate::error::{NorenError, Result};
use crate::ws::handler::FeedHandlers;
use crate::ws::message::{FeedKind, InboundMessage, OutboundFrame};
use crate::ws::transport::{Connector, FrameSink, FrameStream, WsConnector};

/// Upper bound on waiting for the close handshake during teardown.
const CLOSE_TIMEOUT: Duration = Duration::from_secs(2);

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// State of the feed connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    /// Socket open, `connect` frame sent, acknowledgement pending.
    Connected,
    /// The feed acknowledged the session; subscriptions may be sent.
    Authenticated,
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Disconnected => "disconnected",
            Self::Connecting => "connecting",
            Self::Connected => "connected",
            Self::Authenticated => "authenticated",
        };
        f.write_str(s)
    }
}

/// Identity the feed authenticates with.
#[derive(Clone, PartialEq, Eq)]
pub struct FeedCredentials {
    user_id: String,
    account_id: String,
    session_token: String,
}

impl FeedCredentials {
    pub fn new(
        user_id: impl Into<String>,
        account_id: impl Into<String>,
        session_token: impl Into<String>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            account_id: account_id.into(),
            session_token: session_token.into(),
        }
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn account_id(&self) -> &str {
        &self.account_id
    }

    fn connect_frame(&self, source: &str) -> OutboundFrame {
        OutboundFrame::Connect {
            uid: self.user_id.clone(),
            actid: self.account_id.clone(),
            susertoken: self.session_token.clone(),
            source: source.to_owned(),
        }
    }
}

impl fmt::Debug for FeedCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FeedCredentials")
            .field("user_id", &self.user_id)
            .field("account_id", &self.account_id)
            .finish_non_exhaustive()
    }
}

/// Configuration for a [`StreamingFeed`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedConfig {
    /// WebSocket endpoint.
    pub url: String,
    /// Fixed delay before each reconnect attempt.
    pub reconnect_delay: Duration,
    /// Value of the `source` field in the connect frame.
    pub source: String,
    /// Whether remembered subscriptions are re-sent after every
    /// acknowledgement.
    pub resubscribe_on_reconnect: bool,
}

impl FeedConfig {
    /// Defaults: 3 s reconnect delay, source `API`, resubscription on.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            reconnect_delay: Duration::from_millis(DEFAULT_RECONNECT_DELAY_MS),
            source: SOURCE_API.to_owned(),
            resubscribe_on_reconnect: true,
        }
    }

    /// Set the reconnect delay in milliseconds.
    pub fn reconnect_delay_ms(mut self, ms: u64) -> Self {
        self.reconnect_delay = Duration::from_millis(ms);
        self
    }

    /// Set the `source` field of the connect frame.
    pub fn source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }

    /// Enable or disable resubscription after reconnect.
    pub fn resubscribe_on_reconnect(mut self, enable: bool) -> Self {
        self.resubscribe_on_reconnect = enable;
        self
    }
}

/// Instruments and streams currently subscribed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Subscriptions {
    pub touchline: BTreeSet<String>,
    pub snap_quote: BTreeSet<String>,
    pub orders: bool,
}

impl Subscriptions {
    fn keys_mut(&mut self, kind: FeedKind) -> &mut BTreeSet<String> {
        match kind {
            FeedKind::Touchline => &mut self.touchline,
            FeedKind::SnapQuote => &mut self.snap_quote,
        }
    }

    /// Whether nothing is subscribed.
    pub fn is_empty(&self) -> bool {
        self.touchline.is_empty() && self.snap_quote.is_empty() && !self.orders
    }

    fn frames(&self, account_id: &str) -> Vec<OutboundFrame> {
        let mut frames = Vec::with_capacity(3);
        if !self.touchline.is_empty() {
            let keys: Vec<&String> = self.touchline.iter().collect();
            frames.push(OutboundFrame::subscribe(FeedKind::Touchline, &keys));
        }
        if !self.snap_quote.is_empty() {
            let keys: Vec<&String> = self.snap_quote.iter().collect();
            frames.push(OutboundFrame::subscribe(FeedKind::SnapQuote, &keys));
        }
        if self.orders {
            frames.push(OutboundFrame::SubscribeOrders {
                actid: account_id.to_owned(),
            });
        }
        frames
    }
}

// ---------------------------------------------------------------------------
// Shared state
// ---------------------------------------------------------------------------

struct Shared {
    state: watch::Sender<ConnectionState>,
    shutdown: watch::Sender<bool>,
    /// `true` whenever no worker task is running.
    exited: watch::Sender<bool>,
    /// Write half of the live connection. `None` whenever disconnected.
    writer: AsyncMutex<Option<FrameSink>>,
    subscriptions: Mutex<Subscriptions>,
    reconnects: AtomicU64,
}

impl Shared {
    fn subscriptions(&self) -> MutexGuard<'_, Subscriptions> {
        self.subscriptions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn state(&self) -> ConnectionState {
        *self.state.borrow()
    }

    /// Send on the live connection regardless of state.
    async fn send_frame(&self, frame: &OutboundFrame) -> Result<()> {
        let mut guard = self.writer.lock().await;
        let sink = guard.as_mut().ok_or(NorenError::NotConnected)?;
        send_on(sink, frame).await
    }
}

async fn send_on(sink: &mut FrameSink, frame: &OutboundFrame) -> Result<()> {
    sink.send(frame.to_json()?).await?;
    tracing::debug!(?frame, "frame sent");
    Ok(())
}

async fn wait_shutdown(rx: &mut watch::Receiver<bool>) {
    // A dropped sender means the feed itself is gone.
    let _ = rx.wait_for(|stop| *stop).await;
}

// ---------------------------------------------------------------------------
// StreamingFeed
// ---------------------------------------------------------------------------

/// The live feed: one persistent connection at a time, authenticated with
/// the session token, dispatching to [`FeedHandlers`].
///
/// All methods take `&self`; wrap the feed in an `Arc` to share it between
/// tasks.
pub struct StreamingFeed {
    config: FeedConfig,
    credentials: FeedCredentials,
    connector: Arc<dyn Connector>,
    shared: Arc<Shared>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl StreamingFeed {
    /// A feed over a real WebSocket connection.
    pub fn new(config: FeedConfig, credentials: FeedCredentials) -> Self {
        Self::with_connector(config, credentials, Arc::new(WsConnector))
    }

    /// A feed over a custom [`Connector`].
    pub fn with_connector(
        config: FeedConfig,
        credentials: FeedCredentials,
        connector: Arc<dyn Connector>,
    ) -> Self {
        let (state, _) = watch::channel(ConnectionState::Disconnected);
        let (shutdown, _) = watch::channel(false);
        let (exited, _) = watch::channel(true);
        Self {
            config,
            credentials,
            connector,
            shared: Arc::new(Shared {
                state,
                shutdown,
                exited,
                writer: AsyncMutex::new(None),
                subscriptions: Mutex::new(Subscriptions::default()),
                reconnects: AtomicU64::new(0),
            }),
            worker: Mutex::new(None),
        }
    }

    /// Start the worker task. Does nothing if it is already running.
    ///
    /// Returns immediately; connection progress is reported through the
    /// lifecycle handler and [`state_changes`](Self::state_changes). Must be
    /// called from within a Tokio runtime.
    pub fn start(&self, handlers: FeedHandlers) {
        let mut worker = self.worker.lock().unwrap_or_else(PoisonError::into_inner);
        if worker.as_ref().is_some_and(|h| !h.is_finished()) {
            tracing::debug!("feed already running");
            return;
        }

        self.shared.shutdown.send_replace(false);
        self.shared.exited.send_replace(false);
        let task = Worker {
            config: self.config.clone(),
            credentials: self.credentials.clone(),
            connector: Arc::clone(&self.connector),
            shared: Arc::clone(&self.shared),
            handlers,
            shutdown: self.shared.shutdown.subscribe(),
        };
        *worker = Some(tokio::spawn(task.run()));
        tracing::info!(url = %self.config.url, "feed started");
    }

    /// Stop the feed: close the socket and wait for the worker to exit.
    ///
    /// Idempotent, and safe to call from several tasks at once. Once any call
    /// returns no handler will be invoked again until the next
    /// [`start`](Self::start).
    pub async fn stop(&self) {
        self.shared.shutdown.send_replace(true);
        let handle = self
            .worker
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();

        if let Some(handle) = handle {
            if let Err(e) = handle.await {
                tracing::error!(error = %e, "feed worker ended abnormally");
                // The worker didn't get to tear down; make sure nothing leaks.
                self.shared.writer.lock().await.take();
                self.shared.state.send_replace(ConnectionState::Disconnected);
            }
            tracing::info!("feed stopped");
        }

        // Another caller may have taken the handle and still be waiting on it.
        let mut exited = self.shared.exited.subscribe();
        let _ = exited.wait_for(|done| *done).await;
    }

    /// Ask the worker to exit without waiting for it. The worker notices and
    /// tears the connection down on its own.
    pub(crate) fn shutdown(&self) {
        self.shared.shutdown.send_replace(true);
    }

    /// The credentials the feed authenticates with.
    pub fn credentials(&self) -> &FeedCredentials {
        &self.credentials
    }

    /// Whether the worker task is running.
    pub fn is_running(&self) -> bool {
        self.worker
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(|h| !h.is_finished())
    }

    /// Current connection state.
    pub fn state(&self) -> ConnectionState {
        self.shared.state()
    }

    /// A receiver that observes every state change.
    pub fn state_changes(&self) -> watch::Receiver<ConnectionState> {
        self.shared.state.subscribe()
    }

    /// Number of reconnect attempts made since construction.
    pub fn reconnect_count(&self) -> u64 {
        self.shared.reconnects.load(Ordering::Relaxed)
    }

    /// Snapshot of the remembered subscriptions.
    pub fn subscriptions(&self) -> Subscriptions {
        self.shared.subscriptions().clone()
    }

    /// The feed configuration.
    pub fn config(&self) -> &FeedConfig {
        &self.config
    }

    /// Wait until the feed is [`ConnectionState::Authenticated`].
    ///
    /// Fails with [`NorenError::NotConnected`] if the feed is not running or
    /// is stopped while waiting.
    pub async fn wait_until_authenticated(&self) -> Result<()> {
        if !self.is_running() {
            return Err(NorenError::NotConnected);
        }
        let mut state = self.shared.state.subscribe();
        let mut shutdown = self.shared.shutdown.subscribe();
        tokio::select! {
            biased;
            _ = wait_shutdown(&mut shutdown) => Err(NorenError::NotConnected),
            r = state.wait_for(|s| *s == ConnectionState::Authenticated) => {
                r.map(|_| ()).map_err(|_| NorenError::NotConnected)
            }
        }
    }

    /// Subscribe to `instruments` (`EXCH|TOKEN` keys).
    ///
    /// Blocks until the session is authenticated, then sends
    /// `{"t": "t" | "d", "k": "<keys joined by #>"}`.
    pub async fn subscribe(
        &self,
        instruments: &[impl AsRef<str>],
        kind: FeedKind,
    ) -> Result<()> {
        let keys = owned_keys(instruments)?;
        let frame = OutboundFrame::subscribe(kind, &keys);
        let count = keys.len();
        self.send_authenticated(&frame, |subs| subs.keys_mut(kind).extend(keys))
            .await?;
        tracing::debug!(?kind, count, "subscribed");
        Ok(())
    }

    /// Unsubscribe from `instruments`.
    ///
    /// Blocks until the session is authenticated, then sends
    /// `{"t": "u" | "ud", "k": "<keys joined by #>"}`.
    pub async fn unsubscribe(
        &self,
        instruments: &[impl AsRef<str>],
        kind: FeedKind,
    ) -> Result<()> {
        let keys = owned_keys(instruments)?;
        let frame = OutboundFrame::unsubscribe(kind, &keys);
        self.send_authenticated(&frame, |subs| {
            let set = subs.keys_mut(kind);
            for key in &keys {
                set.remove(key);
            }
        })
        .await?;
        tracing::debug!(?kind, count = keys.len(), "unsubscribed");
        Ok(())
    }

    /// Subscribe to order updates for the account.
    pub async fn subscribe_orders(&self) -> Result<()> {
        let frame = OutboundFrame::SubscribeOrders {
            actid: self.credentials.account_id.clone(),
        };
        self.send_authenticated(&frame, |subs| subs.orders = true)
            .await
    }

    /// Send `frame` once the session is authenticated, then apply `update` to
    /// the remembered subscriptions.
    ///
    /// The state is re-checked under the writer lock because a reconnect may
    /// have happened between the wake-up and acquiring the lock. `update` runs
    /// before the lock is released so a resubscribe never sees the wire and
    /// the set disagree.
    async fn send_authenticated(
        &self,
        frame: &OutboundFrame,
        update: impl FnOnce(&mut Subscriptions),
    ) -> Result<()> {
        loop {
            self.wait_until_authenticated().await?;

            let mut guard = self.shared.writer.lock().await;
            if self.shared.state() != ConnectionState::Authenticated {
                continue;
            }
            let Some(sink) = guard.as_mut() else {
                continue;
            };
            send_on(sink, frame).await?;
            update(&mut self.shared.subscriptions());
            return Ok(());
        }
    }
}

fn owned_keys(instruments: &[impl AsRef<str>]) -> Result<Vec<String>> {
    if instruments.is_empty() {
        return Err(NorenError::InvalidArgument(
            "instrument list is empty".into(),
        ));
    }
    Ok(instruments.iter().map(|i| i.as_ref().to_owned()).collect())
}

impl fmt::Debug for StreamingFeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StreamingFeed")
            .field("config", &self.config)
            .field("credentials", &self.credentials)
            .field("state", &self.state())
            .field("running", &self.is_running())
            .finish()
    }
}

impl Drop for StreamingFeed {
    fn drop(&mut self) {
        self.shutdown();
    }
}

// ---------------------------------------------------------------------------
// Worker
// ---------------------------------------------------------------------------

/// Why a connection ended.
enum SessionEnd {
    Shutdown,
    Lost(Option<NorenError>),
}

struct Worker {
    config: FeedConfig,
    credentials: FeedCredentials,
    connector: Arc<dyn Connector>,
    shared: Arc<Shared>,
    handlers: FeedHandlers,
    shutdown: watch::Receiver<bool>,
}

/// Marks the worker as exited however `run` ends, unwinding included.
struct ExitGuard(Arc<Shared>);

impl Drop for ExitGuard {
    fn drop(&mut self) {
        if let Ok(mut writer) = self.0.writer.try_lock() {
            writer.take();
        }
        self.0.state.send_replace(ConnectionState::Disconnected);
        self.0.exited.send_replace(true);
    }
}

impl Worker {
    async fn run(mut self) {
        let _exit = ExitGuard(Arc::clone(&self.shared));
        loop {
            if *self.shutdown.borrow() {
                break;
            }

            self.set_state(ConnectionState::Connecting);
            tracing::info!(url = %self.config.url, "connecting to feed");

            let connected = tokio::select! {
                biased;
                _ = wait_shutdown(&mut self.shutdown) => break,
                r = self.connector.connect(&self.config.url) => r,
            };

            match connected {
                Ok((sink, stream)) => {
                    let end = self.session(sink, stream).await;
                    if let SessionEnd::Lost(Some(e)) = &end {
                        self.handlers.error(e);
                    }
                    self.teardown().await;
                    self.handlers.close();
                    if let SessionEnd::Shutdown = end {
                        break;
                    }
                }
                Err(e) => {
                    tracing::error!(error = %e, "feed connection failed");
                    self.set_state(ConnectionState::Disconnected);
                    self.handlers.error(&e);
                }
            }

            tracing::info!(
                delay_ms = self.config.reconnect_delay.as_millis() as u64,
                "reconnecting to feed"
            );
            tokio::select! {
                biased;
                _ = wait_shutdown(&mut self.shutdown) => break,
                _ = tokio::time::sleep(self.config.reconnect_delay) => {}
            }
            self.shared.reconnects.fetch_add(1, Ordering::Relaxed);
        }

        self.teardown().await;
        tracing::debug!("feed worker exited");
    }

    /// Run one connection until it is lost or shutdown is requested.
    async fn session(&mut self, sink: FrameSink, mut stream: FrameStream) -> SessionEnd {
        *self.shared.writer.lock().await = Some(sink);
        self.set_state(ConnectionState::Connected);
        tracing::info!("feed connected");

        let connect = self.credentials.connect_frame(&self.config.source);
        if let Err(e) = self.shared.send_frame(&connect).await {
            tracing::error!(error = %e, "failed to send connect frame");
            return SessionEnd::Lost(Some(e));
        }

        loop {
            let next = tokio::select! {
                biased;
                _ = wait_shutdown(&mut self.shutdown) => return SessionEnd::Shutdown,
                next = stream.next() => next,
            };

            match next {
                Some(Ok(text)) => {
                    if let Err(e) = self.handle_frame(&text).await {
                        return SessionEnd::Lost(Some(e));
                    }
                }
                Some(Err(e)) => {
                    tracing::warn!(error = %e, "feed read failed");
                    return SessionEnd::Lost(Some(e));
                }
                None => {
                    tracing::info!("feed stream ended");
                    return SessionEnd::Lost(None);
                }
            }
        }
    }

    /// Decode and dispatch one frame. Fails only when a handler panicked.
    async fn handle_frame(&self, text: &str) -> Result<()> {
        let msg = match InboundMessage::decode(text) {
            Ok(msg) => msg,
            Err(e) => {
                tracing::warn!(error = %e, "dropping malformed frame");
                return Ok(());
            }
        };

        match msg {
            InboundMessage::MarketData(data) => self.handlers.market_data(&data)?,
            InboundMessage::OrderUpdate(update) => self.handlers.order_update(&update)?,
            InboundMessage::ConnectionAck(ack) if ack.is_ok() => {
                self.set_state(ConnectionState::Authenticated);
                tracing::info!("feed session acknowledged");
                if self.config.resubscribe_on_reconnect {
                    if let Err(e) = self.resubscribe().await {
                        tracing::warn!(error = %e, "resubscribe failed");
                    }
                }
                self.handlers.open()?;
            }
            InboundMessage::ConnectionAck(ack) => {
                tracing::error!(status = ?ack.status, "feed session rejected");
                self.handlers.error(&NorenError::FeedRejected {
                    status: ack.status,
                    raw: ack.raw,
                });
            }
            InboundMessage::Unknown { tag, .. } => {
                tracing::debug!(%tag, "ignoring frame with unknown tag");
            }
        }
        Ok(())
    }

    async fn resubscribe(&self) -> Result<()> {
        let mut guard = self.shared.writer.lock().await;
        let sink = guard.as_mut().ok_or(NorenError::NotConnected)?;
        let frames = self
            .shared
            .subscriptions()
            .frames(&self.credentials.account_id);
        for frame in &frames {
            send_on(sink, frame).await?;
        }
        if !frames.is_empty() {
            tracing::info!(frames = frames.len(), "resubscribed");
        }
        Ok(())
    }

    /// Drop the writer (closing the socket) and mark the feed disconnected.
    /// Safe to call when already disconnected.
    async fn teardown(&self) {
        let mut guard = self.shared.writer.lock().await;
        let sink = guard.take();
        self.set_state(ConnectionState::Disconnected);
        drop(guard);

        if let Some(mut sink) = sink {
            match tokio::time::timeout(CLOSE_TIMEOUT, sink.close()).await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => tracing::debug!(error = %e, "error closing feed socket"),
                Err(_) => tracing::debug!("timed out closing feed socket"),
            }
            tracing::info!("feed disconnected");
        }
    }

    fn set_state(&self, state: ConnectionState) {
        let previous = self.shared.state.send_replace(state);
        if previous != state {
            tracing::debug!(from = %previous, to = %state, "feed state");
            self.handlers.state_change(state);
        }
    }
}
