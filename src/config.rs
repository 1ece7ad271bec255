//! Service configuration: the REST host, the WebSocket endpoint, and the
//! route table.
//!
//! A [`ServiceConfig`] is an immutable value handed to
//! [`NorenClient::with_config`](crate::client::NorenClient::with_config).
//! Two clients built from different configs never interfere with each other.

use std::collections::HashMap;

use crate::constants::{self, routes};

// ---------------------------------------------------------------------------
// Routes
// ---------------------------------------------------------------------------

/// Every operation the REST API exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Authorize,
    Logout,
    ForgotPassword,
    ChangePassword,
    WatchlistNames,
    Watchlist,
    WatchlistAdd,
    WatchlistDelete,
    PlaceOrder,
    ModifyOrder,
    CancelOrder,
    ExitOrder,
    ProductConversion,
    OrderBook,
    TradeBook,
    SingleOrderHistory,
    SearchScrip,
    TimePriceSeries,
    OptionChain,
    Holdings,
    Limits,
    Positions,
    SecurityInfo,
    Quotes,
    SpanCalculator,
    OptionGreek,
    DailyPriceSeries,
}

/// The JSON shape a route returns on success.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseShape {
    /// An object whose `stat` field equals `"Ok"`.
    Object,
    /// A bare JSON array.
    List,
}

impl Route {
    /// All routes, in declaration order.
    pub const ALL: [Route; 27] = [
        Route::Authorize,
        Route::Logout,
        Route::ForgotPassword,
        Route::ChangePassword,
        Route::WatchlistNames,
        Route::Watchlist,
        Route::WatchlistAdd,
        Route::WatchlistDelete,
        Route::PlaceOrder,
        Route::ModifyOrder,
        Route::CancelOrder,
        Route::ExitOrder,
        Route::ProductConversion,
        Route::OrderBook,
        Route::TradeBook,
        Route::SingleOrderHistory,
        Route::SearchScrip,
        Route::TimePriceSeries,
        Route::OptionChain,
        Route::Holdings,
        Route::Limits,
        Route::Positions,
        Route::SecurityInfo,
        Route::Quotes,
        Route::SpanCalculator,
        Route::OptionGreek,
        Route::DailyPriceSeries,
    ];

    /// The default path suffix for this route.
    pub fn default_path(self) -> &'static str {
        match self {
            Self::Authorize => routes::AUTHORIZE,
            Self::Logout => routes::LOGOUT,
            Self::ForgotPassword => routes::FORGOT_PASSWORD,
            Self::ChangePassword => routes::CHANGE_PASSWORD,
            Self::WatchlistNames => routes::WATCHLIST_NAMES,
            Self::Watchlist => routes::WATCHLIST,
            Self::WatchlistAdd => routes::WATCHLIST_ADD,
            Self::WatchlistDelete => routes::WATCHLIST_DELETE,
            Self::PlaceOrder => routes::PLACE_ORDER,
            Self::ModifyOrder => routes::MODIFY_ORDER,
            Self::CancelOrder => routes::CANCEL_ORDER,
            Self::ExitOrder => routes::EXIT_ORDER,
            Self::ProductConversion => routes::PRODUCT_CONVERSION,
            Self::OrderBook => routes::ORDER_BOOK,
            Self::TradeBook => routes::TRADE_BOOK,
            Self::SingleOrderHistory => routes::SINGLE_ORDER_HISTORY,
            Self::SearchScrip => routes::SEARCH_SCRIP,
            Self::TimePriceSeries => routes::TIME_PRICE_SERIES,
            Self::OptionChain => routes::OPTION_CHAIN,
            Self::Holdings => routes::HOLDINGS,
            Self::Limits => routes::LIMITS,
            Self::Positions => routes::POSITIONS,
            Self::SecurityInfo => routes::SECURITY_INFO,
            Self::Quotes => routes::QUOTES,
            Self::SpanCalculator => routes::SPAN_CALCULATOR,
            Self::OptionGreek => routes::OPTION_GREEK,
            Self::DailyPriceSeries => routes::DAILY_PRICE_SERIES,
        }
    }

    /// The response shape that counts as success for this route.
    pub fn shape(self) -> ResponseShape {
        match self {
            Self::OrderBook
            | Self::TradeBook
            | Self::SingleOrderHistory
            | Self::Holdings
            | Self::Positions
            | Self::TimePriceSeries
            | Self::DailyPriceSeries => ResponseShape::List,
            _ => ResponseShape::Object,
        }
    }

    /// `Content-Type` header sent with this route's request body.
    pub fn content_type(self) -> &'static str {
        match self {
            Self::DailyPriceSeries => "application/json; charset=utf-8",
            _ => "application/x-www-form-urlencoded",
        }
    }
}

/// Mapping of [`Route`] to path suffix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteTable {
    paths: HashMap<Route, String>,
}

impl Default for RouteTable {
    fn default() -> Self {
        let paths = Route::ALL
            .iter()
            .map(|r| (*r, r.default_path().to_owned()))
            .collect();
        Self { paths }
    }
}

impl RouteTable {
    /// Path suffix for `route`.
    pub fn path(&self, route: Route) -> &str {
        self.paths
            .get(&route)
            .map(String::as_str)
            .unwrap_or_else(|| route.default_path())
    }

    /// Return a table with `route` pointing at `path`.
    pub fn with_route(mut self, route: Route, path: impl Into<String>) -> Self {
        self.paths.insert(route, path.into());
        self
    }
}

// ---------------------------------------------------------------------------
// ServiceConfig
// ---------------------------------------------------------------------------

/// Immutable endpoint configuration for a client instance.
///
/// # Example
///
/// ```
/// use noren_rs::config::{Route, ServiceConfig};
///
/// let config = ServiceConfig::new("https://broker.example/NorenWClientTP/", "wss://broker.example/NorenWSTP/")
///     .with_route(Route::DailyPriceSeries, "/EODChartData");
/// assert_eq!(config.host(), "https://broker.example/NorenWClientTP");
/// assert_eq!(config.url(Route::PlaceOrder), "https://broker.example/NorenWClientTP/PlaceOrder");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    host: String,
    websocket_endpoint: String,
    routes: RouteTable,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self::new(
            constants::DEFAULT_HOST,
            constants::DEFAULT_WEBSOCKET_ENDPOINT,
        )
    }
}

impl ServiceConfig {
    /// Create a config for the given host and WebSocket endpoint with the
    /// default route table. A trailing slash on the host is stripped.
    pub fn new(host: impl Into<String>, websocket_endpoint: impl Into<String>) -> Self {
        Self {
            host: host.into().trim_end_matches('/').to_owned(),
            websocket_endpoint: websocket_endpoint.into(),
            routes: RouteTable::default(),
        }
    }

    /// Build a config from `NOREN_HOST` / `NOREN_WS_ENDPOINT`, falling back to
    /// the defaults for whichever is unset.
    pub fn from_env() -> Self {
        let host = std::env::var(constants::ENV_HOST)
            .unwrap_or_else(|_| constants::DEFAULT_HOST.to_owned());
        let ws = std::env::var(constants::ENV_WEBSOCKET_ENDPOINT)
            .unwrap_or_else(|_| constants::DEFAULT_WEBSOCKET_ENDPOINT.to_owned());
        Self::new(host, ws)
    }

    /// Override a single route path.
    pub fn with_route(mut self, route: Route, path: impl Into<String>) -> Self {
        self.routes = self.routes.with_route(route, path);
        self
    }

    /// Replace the whole route table.
    pub fn with_routes(mut self, routes: RouteTable) -> Self {
        self.routes = routes;
        self
    }

    /// The REST host, without a trailing slash.
    pub fn host(&self) -> &str {
        &self.host
    }

    /// The WebSocket endpoint for the live feed.
    pub fn websocket_endpoint(&self) -> &str {
        &self.websocket_endpoint
    }

    /// The route table.
    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    /// Full URL for `route`.
    pub fn url(&self, route: Route) -> String {
        let path = self.routes.path(route);
        if path.starts_with('/') {
            format!("{}{}", self.host, path)
        } else {
            format!("{}/{}", self.host, path)
        }
    }
}
