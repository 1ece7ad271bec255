//! The socket seam under the streaming feed.
//!
//! The feed only ever exchanges JSON text frames, so a connection is a pair
//! of boxed halves: a [`FrameSink`] taking outbound text and a
//! [`FrameStream`] yielding inbound text. [`WsConnector`] produces them from a
//! real WebSocket; tests plug in their own [`Connector`].

use std::pin::Pin;

use futures_util::future::{self, BoxFuture};
use futures_util::{Sink, SinkExt, Stream, StreamExt};
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;

use crate::error::{NorenError, Result};

/// Write half of a feed connection.
pub type FrameSink = Pin<Box<dyn Sink<String, Error = NorenError> + Send>>;

/// Read half of a feed connection. Ends (or yields an error) when the
/// connection is lost.
pub type FrameStream = Pin<Box<dyn Stream<Item = Result<String>> + Send>>;

/// Opens feed connections.
pub trait Connector: Send + Sync + 'static {
    /// Connect to `url` and return the split connection.
    fn connect<'a>(&'a self, url: &'a str) -> BoxFuture<'a, Result<(FrameSink, FrameStream)>>;
}

/// [`Connector`] over `tokio-tungstenite`.
///
/// Only text frames are surfaced. Ping/pong is answered by tungstenite; a
/// close frame from the server surfaces as [`NorenError::ConnectionClosed`].
#[derive(Debug, Clone, Copy, Default)]
pub struct WsConnector;

impl Connector for WsConnector {
    fn connect<'a>(&'a self, url: &'a str) -> BoxFuture<'a, Result<(FrameSink, FrameStream)>> {
        Box::pin(async move {
            let (ws, resp) = connect_async(url).await?;
            tracing::debug!(status = %resp.status(), "WebSocket handshake complete");

            let (write, read) = ws.split();

            let sink = write.with(|text: String| {
                future::ready(Ok::<_, NorenError>(Message::Text(text.into())))
            });

            let stream = read.filter_map(|msg| {
                future::ready(match msg {
                    Ok(Message::Text(text)) => Some(Ok(text.as_str().to_owned())),
                    Ok(Message::Close(frame)) => {
                        tracing::info!(?frame, "WebSocket closed by server");
                        Some(Err(NorenError::ConnectionClosed))
                    }
                    Ok(_) => None,
                    Err(e) => Some(Err(NorenError::WebSocket(e))),
                })
            });

            Ok((Box::pin(sink) as FrameSink, Box::pin(stream) as FrameStream))
        })
    }
}
