//! Constants for the Noren trading API.
//!
//! Contains the default endpoints, the route path suffixes, and the fixed
//! literals the service expects in every payload. These are used internally
//! by [`ServiceConfig`](crate::config::ServiceConfig) and the streaming feed,
//! but are also exported for advanced usage.

// ---------------------------------------------------------------------------
// Endpoints
// ---------------------------------------------------------------------------

/// Default base URL for the REST API. Brokers host their own deployments, so
/// this is normally overridden via [`ServiceConfig`](crate::config::ServiceConfig).
pub const DEFAULT_HOST: &str = "http://wsapihost/NorenWClientTP";

/// Default WebSocket endpoint for the live feed.
pub const DEFAULT_WEBSOCKET_ENDPOINT: &str = "wss://wsendpoint/NorenWSTP/";

/// Environment variable overriding the REST host.
pub const ENV_HOST: &str = "NOREN_HOST";

/// Environment variable overriding the WebSocket endpoint.
pub const ENV_WEBSOCKET_ENDPOINT: &str = "NOREN_WS_ENDPOINT";

// ---------------------------------------------------------------------------
// Route paths
// ---------------------------------------------------------------------------

/// Path suffixes appended to the host for each operation.
pub mod routes {
    pub const AUTHORIZE: &str = "/QuickAuth";
    pub const LOGOUT: &str = "/Logout";
    pub const FORGOT_PASSWORD: &str = "/ForgotPassword";
    pub const CHANGE_PASSWORD: &str = "/Changepwd";
    pub const WATCHLIST_NAMES: &str = "/MWList";
    pub const WATCHLIST: &str = "/MarketWatch";
    pub const WATCHLIST_ADD: &str = "/AddMultiScripsToMW";
    pub const WATCHLIST_DELETE: &str = "/DeleteMultiMWScrips";
    pub const PLACE_ORDER: &str = "/PlaceOrder";
    pub const MODIFY_ORDER: &str = "/ModifyOrder";
    pub const CANCEL_ORDER: &str = "/CancelOrder";
    pub const EXIT_ORDER: &str = "/ExitSNOOrder";
    pub const PRODUCT_CONVERSION: &str = "/ProductConversion";
    pub const ORDER_BOOK: &str = "/OrderBook";
    pub const TRADE_BOOK: &str = "/TradeBook";
    pub const SINGLE_ORDER_HISTORY: &str = "/SingleOrdHist";
    pub const SEARCH_SCRIP: &str = "/SearchScrip";
    pub const TIME_PRICE_SERIES: &str = "/TPSeries";
    pub const OPTION_CHAIN: &str = "/GetOptionChain";
    pub const HOLDINGS: &str = "/Holdings";
    pub const LIMITS: &str = "/Limits";
    pub const POSITIONS: &str = "/PositionBook";
    pub const SECURITY_INFO: &str = "/GetSecurityInfo";
    pub const QUOTES: &str = "/GetQuotes";
    pub const SPAN_CALCULATOR: &str = "/SpanCalc";
    pub const OPTION_GREEK: &str = "/GetOptionGreek";
    pub const DAILY_PRICE_SERIES: &str = "/EODChartData";
}

// ---------------------------------------------------------------------------
// Protocol literals
// ---------------------------------------------------------------------------

/// Value of the `source` / `ordersource` fields for API clients.
pub const SOURCE_API: &str = "API";

/// Application version reported at login.
pub const APK_VERSION: &str = "1.0.0";

/// The `stat` value the service uses for a successful object response.
pub const STAT_OK: &str = "Ok";

/// The `s` value of a successful `ck` acknowledgement on the feed.
pub const FEED_ACK_OK: &str = "OK";

/// Delimiter joining instrument keys (`EXCH|TOKEN`) and watch-list scrips.
pub const KEY_DELIMITER: &str = "#";

/// Fixed delay between feed reconnect attempts, in milliseconds.
pub const DEFAULT_RECONNECT_DELAY_MS: u64 = 3_000;
