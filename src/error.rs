//! Error types for the `noren-rs` crate.
//!
//! All fallible operations in this crate return [`Result<T>`], which is an
//! alias for `std::result::Result<T, NorenError>`.
//!
//! [`NorenError`] covers:
//! - **API errors**: Structured non-`Ok` responses from the service, raw body kept
//! - **HTTP status errors**: Unexpected status codes with a non-JSON body
//! - **Transport errors**: Network, TLS, timeout and WebSocket failures
//! - **Decode errors**: Malformed JSON or feed frames
//! - **Handler panics**: A feed callback panicked; the connection is recycled
//! - **State errors**: Calls made before login or while the feed is down
//! - **Invalid arguments**: Client-side validation errors

use std::fmt;

use serde_json::Value;

/// A failure body returned by the service.
///
/// The service reports failures as `{"stat": "Not_Ok", "emsg": "..."}` with a
/// 200 status. List endpoints return the same object in place of the array.
/// The raw body is kept so callers can inspect fields this type doesn't name.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiErrorBody {
    /// The `stat` field (usually `"Not_Ok"`).
    pub stat: Option<String>,
    /// Human-readable error message.
    pub emsg: Option<String>,
    /// Server time of the request, when reported.
    pub request_time: Option<String>,
    /// The full response body as received.
    pub raw: Value,
}

impl ApiErrorBody {
    /// Extract the known fields from a response body.
    pub fn from_value(raw: Value) -> Self {
        let field = |name: &str| raw.get(name).and_then(Value::as_str).map(str::to_owned);
        Self {
            stat: field("stat"),
            emsg: field("emsg"),
            request_time: field("request_time"),
            raw,
        }
    }
}

impl fmt::Display for ApiErrorBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.stat, &self.emsg) {
            (Some(stat), Some(emsg)) => write!(f, "[{stat}] {emsg}"),
            (Some(stat), None) => write!(f, "[{stat}] {}", self.raw),
            _ => write!(f, "unexpected response: {}", self.raw),
        }
    }
}

/// All possible errors produced by the `noren-rs` client.
#[derive(Debug, thiserror::Error)]
pub enum NorenError {
    /// The service answered with a failure body (or the wrong shape).
    #[error("API error: {0}")]
    Api(ApiErrorBody),

    /// The server returned an unexpected HTTP status with a non-JSON body.
    #[error("HTTP {status}: {body}")]
    HttpStatus {
        /// The HTTP status code.
        status: reqwest::StatusCode,
        /// The response body text.
        body: String,
    },

    /// A network or transport-level error from `reqwest`.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Failed to serialize or deserialize JSON.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A WebSocket-level error.
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    /// The feed connection was closed by the peer.
    #[error("connection closed")]
    ConnectionClosed,

    /// A feed frame could not be decoded.
    #[error("malformed frame: {0}")]
    Decode(String),

    /// The feed rejected the `connect` frame.
    #[error("feed authentication rejected (status {status:?})")]
    FeedRejected {
        /// The `s` field of the acknowledgement.
        status: Option<String>,
        /// The acknowledgement frame as received.
        raw: Value,
    },

    /// A feed handler panicked while processing a message.
    #[error("{handler} handler panicked: {message}")]
    HandlerPanicked {
        /// Which handler panicked.
        handler: &'static str,
        /// The panic payload, when it was a string.
        message: String,
    },

    /// An authorized operation was attempted without a session token.
    #[error("not authenticated: login or set_session first")]
    NotAuthenticated,

    /// A feed operation was attempted while the feed is not running.
    #[error("feed not running")]
    NotConnected,

    /// The caller provided an invalid argument.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, NorenError>;
