//! Core HTTP client for the Noren REST API.
//!
//! The [`NorenClient`] struct is the main entry point. It owns the session
//! state (user, account, token) and the single [`send`](NorenClient::send)
//! primitive every operation routes through: the payload goes out as a
//! `jData=<json>` form field, followed by `jKey=<token>` for authorized
//! operations, and the JSON reply is checked against the route's declared
//! [`ResponseShape`].
//!
//! API endpoint methods are added to `NorenClient` via `impl` blocks in the
//! [`crate::api`] module.

use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use reqwest::header::{self, HeaderValue};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::config::{ResponseShape, Route, ServiceConfig};
use crate::constants::STAT_OK;
use crate::error::{ApiErrorBody, NorenError, Result};
use crate::types::payload::Payload;
use crate::ws::feed::{FeedConfig, FeedCredentials, StreamingFeed};

// ---------------------------------------------------------------------------
// Session state
// ---------------------------------------------------------------------------

/// Authentication state of a client.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Session {
    user_id: Option<String>,
    account_id: Option<String>,
    token: Option<String>,
}

impl Session {
    /// The logged-in user ID.
    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }

    /// The trading account ID.
    pub fn account_id(&self) -> Option<&str> {
        self.account_id.as_deref()
    }

    /// The session token (`susertoken`).
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Whether a token is present.
    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("user_id", &self.user_id)
            .field("account_id", &self.account_id)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

// ---------------------------------------------------------------------------
// NorenClient
// ---------------------------------------------------------------------------

/// Core HTTP client for the Noren REST API.
///
/// Cloning is cheap for the transport and configuration; each clone carries
/// its own copy of the session state. Clones share the streaming feed slot,
/// so a client and its clones hold at most one feed per session.
///
/// # Example
///
/// ```no_run
/// use noren_rs::client::NorenClient;
/// use noren_rs::types::auth::LoginRequest;
///
/// # #[tokio::main]
/// # async fn main() -> noren_rs::error::Result<()> {
/// let mut client = NorenClient::new("https://broker.example/NorenWClientTP", "wss://broker.example/NorenWSTP/");
/// client
///     .login(&LoginRequest {
///         user_id: "FA12345".into(),
///         password: "secret".into(),
///         two_fa: "123456".into(),
///         vendor_code: "FA12345_U".into(),
///         api_secret: "api-secret".into(),
///         imei: "abc1234".into(),
///     })
///     .await?;
/// let positions = client.get_positions().await?;
/// println!("{} open positions", positions.len());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct NorenClient {
    http: reqwest::Client,
    config: Arc<ServiceConfig>,
    session: Session,
    feed: Arc<Mutex<Option<Arc<StreamingFeed>>>>,
}

impl NorenClient {
    /// Create a client for the given REST host and WebSocket endpoint with
    /// the default route table.
    pub fn new(host: impl Into<String>, websocket_endpoint: impl Into<String>) -> Self {
        Self::with_config(ServiceConfig::new(host, websocket_endpoint))
    }

    /// Create a client from an explicit [`ServiceConfig`].
    pub fn with_config(config: ServiceConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config: Arc::new(config),
            session: Session::default(),
            feed: Arc::default(),
        }
    }

    /// Returns a reference to the underlying `reqwest::Client`.
    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }

    /// Returns the service configuration.
    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// Returns the current session state.
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Returns the session token, if logged in.
    pub fn session_token(&self) -> Option<&str> {
        self.session.token()
    }

    /// Whether the client holds a session token.
    pub fn is_authenticated(&self) -> bool {
        self.session.is_authenticated()
    }

    /// Install a previously obtained session token.
    ///
    /// Overwrites any existing session without validating the token; use this
    /// when authentication is managed outside this client.
    pub fn set_session(&mut self, user_id: impl Into<String>, token: impl Into<String>) {
        let user_id = user_id.into();
        tracing::debug!(%user_id, "session set");
        self.session = Session {
            account_id: Some(user_id.clone()),
            user_id: Some(user_id),
            token: Some(token.into()),
        };
    }

    pub(crate) fn store_session(&mut self, user_id: String, account_id: String, token: String) {
        self.session = Session {
            user_id: Some(user_id),
            account_id: Some(account_id),
            token: Some(token),
        };
    }

    pub(crate) fn clear_session(&mut self) {
        self.session = Session::default();
    }

    /// `(user_id, account_id)` of the current session.
    ///
    /// Fails with [`NorenError::NotAuthenticated`] when no token is held, so
    /// payloads are never built under a stale identity.
    pub(crate) fn identity(&self) -> Result<(&str, &str)> {
        match (&self.session.token, &self.session.user_id) {
            (Some(_), Some(uid)) => {
                let uid = uid.as_str();
                let actid = self.session.account_id.as_deref().unwrap_or(uid);
                Ok((uid, actid))
            }
            _ => Err(NorenError::NotAuthenticated),
        }
    }

    /// Credentials for authenticating the streaming feed.
    pub fn feed_credentials(&self) -> Result<FeedCredentials> {
        let (uid, actid) = self.identity()?;
        let token = self.session.token().ok_or(NorenError::NotAuthenticated)?;
        Ok(FeedCredentials::new(uid, actid, token))
    }

    /// The [`StreamingFeed`] for this session, pointed at the configured
    /// WebSocket endpoint.
    ///
    /// Every call returns the same feed while the session is unchanged. Once
    /// the session changes a new feed is built and the previous one is told
    /// to shut down.
    pub fn feed(&self) -> Result<Arc<StreamingFeed>> {
        let credentials = self.feed_credentials()?;
        let mut slot = self.feed.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(feed) = slot.as_ref().filter(|f| *f.credentials() == credentials) {
            return Ok(Arc::clone(feed));
        }
        if let Some(previous) = slot.take() {
            tracing::info!("session changed, shutting down previous feed");
            previous.shutdown();
        }

        let config = FeedConfig::new(self.config.websocket_endpoint());
        let feed = Arc::new(StreamingFeed::new(config, credentials));
        *slot = Some(Arc::clone(&feed));
        Ok(feed)
    }

    // -----------------------------------------------------------------------
    // Request/response primitive
    // -----------------------------------------------------------------------

    /// Send `payload` to `route` and return the JSON reply.
    ///
    /// When `authorized` is true the session token is appended as `jKey`; if
    /// there is no token the call fails with [`NorenError::NotAuthenticated`]
    /// without touching the network. A reply that doesn't match the route's
    /// [`ResponseShape`] is returned as [`NorenError::Api`] with the raw body.
    pub async fn send(&self, route: Route, payload: &Payload, authorized: bool) -> Result<Value> {
        let mut body = format!("jData={}", payload.to_json()?);
        if authorized {
            let token = self.session.token().ok_or(NorenError::NotAuthenticated)?;
            body.push_str("&jKey=");
            body.push_str(token);
        }

        let url = self.config.url(route);
        tracing::debug!(%url, ?route, authorized, "POST");

        let resp = self
            .http
            .post(&url)
            .header(
                header::CONTENT_TYPE,
                HeaderValue::from_static(route.content_type()),
            )
            .body(body)
            .send()
            .await?;

        let status = resp.status();
        let text = resp.text().await?;
        // The login reply carries the session token.
        if route != Route::Authorize {
            tracing::trace!(%status, body = %text, "response");
        }

        let value: Value = match serde_json::from_str(&text) {
            Ok(v) => v,
            Err(_) if !status.is_success() => {
                return Err(NorenError::HttpStatus { status, body: text });
            }
            Err(e) => return Err(NorenError::Json(e)),
        };

        check_shape(route.shape(), value)
    }

    /// [`send`](Self::send) and deserialize the reply into `R`.
    pub async fn send_as<R: DeserializeOwned>(
        &self,
        route: Route,
        payload: &Payload,
        authorized: bool,
    ) -> Result<R> {
        let value = self.send(route, payload, authorized).await?;
        serde_json::from_value(value).map_err(NorenError::Json)
    }
}

/// Accept `value` if it has the declared shape, otherwise surface it as an
/// API error.
pub(crate) fn check_shape(shape: ResponseShape, value: Value) -> Result<Value> {
    let ok = match shape {
        ResponseShape::List => value.is_array(),
        ResponseShape::Object => value.get("stat").and_then(Value::as_str) == Some(STAT_OK),
    };
    if ok {
        Ok(value)
    } else {
        Err(NorenError::Api(ApiErrorBody::from_value(value)))
    }
}
