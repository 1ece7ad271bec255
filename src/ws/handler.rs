//! Handler interfaces the feed dispatches to.
//!
//! Three independent, optional handlers:
//!
//! - [`MarketDataHandler`]: touchline and depth quotes
//! - [`OrderUpdateHandler`]: order state transitions
//! - [`LifecycleHandler`]: open / close / error / state changes
//!
//! Handlers run on the feed's worker task, one message at a time in arrival
//! order. A handler that blocks stalls the feed, so hand heavy work off to a
//! channel or a spawned task.
//!
//! A panic in a data handler or in `on_open` is caught and reported through
//! `on_error`, and the connection is recycled as if it had dropped. Panics in
//! the other lifecycle callbacks are logged and ignored.
//!
//! Closures implement the two data handlers:
//!
//! ```
//! use noren_rs::ws::handler::FeedHandlers;
//! use noren_rs::ws::message::{MarketData, OrderUpdate};
//!
//! let handlers = FeedHandlers::new()
//!     .on_market_data(|data: &MarketData| println!("{:?} {:?}", data.quote.key(), data.quote.last_price))
//!     .on_order_update(|update: &OrderUpdate| println!("{:?} -> {:?}", update.order_no, update.status));
//! ```

use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use crate::error::{NorenError, Result};
use crate::ws::feed::ConnectionState;
use crate::ws::message::{MarketData, OrderUpdate};

/// Receives touchline and depth messages.
pub trait MarketDataHandler: Send + Sync {
    fn on_market_data(&self, data: &MarketData);
}

impl<F> MarketDataHandler for F
where
    F: Fn(&MarketData) + Send + Sync,
{
    fn on_market_data(&self, data: &MarketData) {
        self(data)
    }
}

/// Receives order updates.
pub trait OrderUpdateHandler: Send + Sync {
    fn on_order_update(&self, update: &OrderUpdate);
}

impl<F> OrderUpdateHandler for F
where
    F: Fn(&OrderUpdate) + Send + Sync,
{
    fn on_order_update(&self, update: &OrderUpdate) {
        self(update)
    }
}

/// Connection lifecycle notifications. Every method defaults to a no-op.
pub trait LifecycleHandler: Send + Sync {
    /// The feed acknowledged the session. Fires once per (re)connection.
    fn on_open(&self) {}

    /// The connection was torn down, either by the peer, by an error or by
    /// [`StreamingFeed::stop`](crate::ws::feed::StreamingFeed::stop).
    fn on_close(&self) {}

    /// A transport error, a failed connect attempt or a rejected session.
    fn on_error(&self, _error: &NorenError) {}

    /// The connection state changed.
    fn on_state_change(&self, _state: ConnectionState) {}
}

/// The set of handlers a feed dispatches to.
#[derive(Clone, Default)]
pub struct FeedHandlers {
    market_data: Option<Arc<dyn MarketDataHandler>>,
    order_update: Option<Arc<dyn OrderUpdateHandler>>,
    lifecycle: Option<Arc<dyn LifecycleHandler>>,
}

impl FeedHandlers {
    /// No handlers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the market-data handler.
    pub fn on_market_data(mut self, handler: impl MarketDataHandler + 'static) -> Self {
        self.market_data = Some(Arc::new(handler));
        self
    }

    /// Set the order-update handler.
    pub fn on_order_update(mut self, handler: impl OrderUpdateHandler + 'static) -> Self {
        self.order_update = Some(Arc::new(handler));
        self
    }

    /// Set the lifecycle handler.
    pub fn lifecycle(mut self, handler: impl LifecycleHandler + 'static) -> Self {
        self.lifecycle = Some(Arc::new(handler));
        self
    }

    /// Set a lifecycle handler that is shared with the caller.
    pub fn lifecycle_arc(mut self, handler: Arc<dyn LifecycleHandler>) -> Self {
        self.lifecycle = Some(handler);
        self
    }

    pub(crate) fn market_data(&self, data: &MarketData) -> Result<()> {
        match &self.market_data {
            Some(h) => guarded("market data", || h.on_market_data(data)),
            None => Ok(()),
        }
    }

    pub(crate) fn order_update(&self, update: &OrderUpdate) -> Result<()> {
        match &self.order_update {
            Some(h) => guarded("order update", || h.on_order_update(update)),
            None => Ok(()),
        }
    }

    pub(crate) fn open(&self) -> Result<()> {
        match &self.lifecycle {
            Some(h) => guarded("open", || h.on_open()),
            None => Ok(()),
        }
    }

    pub(crate) fn close(&self) {
        if let Some(h) = &self.lifecycle {
            let _ = guarded("close", || h.on_close());
        }
    }

    pub(crate) fn error(&self, error: &NorenError) {
        if let Some(h) = &self.lifecycle {
            let _ = guarded("error", || h.on_error(error));
        }
    }

    pub(crate) fn state_change(&self, state: ConnectionState) {
        if let Some(h) = &self.lifecycle {
            let _ = guarded("state change", || h.on_state_change(state));
        }
    }
}

/// Run a user callback, turning a panic into [`NorenError::HandlerPanicked`].
fn guarded(handler: &'static str, f: impl FnOnce()) -> Result<()> {
    panic::catch_unwind(AssertUnwindSafe(f)).map_err(|payload| {
        let message = payload
            .downcast_ref::<&str>()
            .map(|s| (*s).to_owned())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_default();
        tracing::error!(handler, %message, "feed handler panicked");
        NorenError::HandlerPanicked { handler, message }
    })
}

impl fmt::Debug for FeedHandlers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FeedHandlers")
            .field("market_data", &self.market_data.is_some())
            .field("order_update", &self.order_update.is_some())
            .field("lifecycle", &self.lifecycle.is_some())
            .finish()
    }
}
