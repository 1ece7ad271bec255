//! Live streaming feed.
//!
//! The Noren feed is a single WebSocket carrying JSON text frames for both
//! market data and order updates.
//!
//! ## [`feed`]: the session
//!
//! [`StreamingFeed`](feed::StreamingFeed) owns the connection lifecycle:
//! connect, authenticate with the session token, dispatch inbound frames to
//! the registered handlers and reconnect after a fixed delay when the
//! connection drops.
//!
//! ## [`message`]: the frames
//!
//! Outbound control frames and decoding of the inbound `tk`/`tf`, `dk`/`df`,
//! `ck` and `om` messages.
//!
//! ## [`handler`]: the callbacks
//!
//! Market data, order updates and connection lifecycle, each optional.
//!
//! ## [`transport`]: the socket
//!
//! The [`Connector`](transport::Connector) seam and its `tokio-tungstenite`
//! implementation.

pub mod feed;
pub mod handler;
pub mod message;
pub mod transport;
