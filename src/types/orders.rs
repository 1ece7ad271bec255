//! Order placement, modification and acknowledgement types.

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::constants::SOURCE_API;
use crate::error::{NorenError, Result};
use crate::types::enums::*;
use crate::types::payload::Payload;

// ---------------------------------------------------------------------------
// Place order
// ---------------------------------------------------------------------------

/// Request body for placing a new order.
///
/// # Example
///
/// ```
/// use noren_rs::types::enums::*;
/// use noren_rs::types::orders::PlaceOrderRequest;
///
/// let req = PlaceOrderRequest {
///     price: 101.5,
///     ..PlaceOrderRequest::new(
///         TransactionType::Buy,
///         ProductType::Intraday,
///         "NSE",
///         "INFY-EQ",
///         10,
///         PriceType::Limit,
///     )
/// };
/// let payload = req.to_payload("FA12345", "FA12345");
/// assert_eq!(payload.get("prc"), Some("101.5"));
/// assert!(!payload.contains("blprc"));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct PlaceOrderRequest {
    pub side: TransactionType,
    pub product: ProductType,
    pub exchange: String,
    pub trading_symbol: String,
    pub quantity: u64,
    pub disclosed_quantity: u64,
    pub price_type: PriceType,
    pub price: f64,
    pub trigger_price: Option<f64>,
    pub retention: Retention,
    pub after_market_order: bool,
    pub remarks: Option<String>,
    /// Stop-loss leg for cover and bracket orders.
    pub book_loss_price: f64,
    /// Target leg for bracket orders.
    pub book_profit_price: f64,
    /// Trailing stop for cover and bracket orders; `0.0` disables it.
    pub trail_price: f64,
}

impl PlaceOrderRequest {
    /// A request with zero prices, `DAY` retention and no optional fields.
    pub fn new(
        side: TransactionType,
        product: ProductType,
        exchange: impl Into<String>,
        trading_symbol: impl Into<String>,
        quantity: u64,
        price_type: PriceType,
    ) -> Self {
        Self {
            side,
            product,
            exchange: exchange.into(),
            trading_symbol: trading_symbol.into(),
            quantity,
            disclosed_quantity: 0,
            price_type,
            price: 0.0,
            trigger_price: None,
            retention: Retention::Day,
            after_market_order: false,
            remarks: None,
            book_loss_price: 0.0,
            book_profit_price: 0.0,
            trail_price: 0.0,
        }
    }

    /// Build the `/PlaceOrder` payload.
    pub fn to_payload(&self, user_id: &str, account_id: &str) -> Payload {
        let mut p = Payload::new()
            .with("ordersource", SOURCE_API)
            .with("uid", user_id)
            .with("actid", account_id)
            .with("trantype", self.side)
            .with("prd", self.product)
            .with("exch", &self.exchange);
        p.insert_encoded("tsym", &self.trading_symbol);
        p.insert("qty", self.quantity);
        p.insert("dscqty", self.disclosed_quantity);
        p.insert("prctyp", self.price_type);
        p.insert("prc", self.price);
        p.insert_opt("trgprc", self.trigger_price);
        p.insert("ret", self.retention);
        p.insert_opt("remarks", self.remarks.as_deref());
        p.insert("amo", if self.after_market_order { "YES" } else { "NO" });

        match self.product {
            ProductType::CoverOrder => {
                p.insert("blprc", self.book_loss_price);
            }
            ProductType::BracketOrder => {
                p.insert("blprc", self.book_loss_price);
                p.insert("bpprc", self.book_profit_price);
            }
            _ => return p,
        }
        if self.trail_price != 0.0 {
            p.insert("trailprc", self.trail_price);
        }
        p
    }
}

// ---------------------------------------------------------------------------
// Modify order
// ---------------------------------------------------------------------------

/// Request body for modifying a pending order.
#[derive(Debug, Clone, PartialEq)]
pub struct ModifyOrderRequest {
    pub order_no: String,
    pub exchange: String,
    pub trading_symbol: String,
    pub quantity: u64,
    pub price_type: PriceType,
    pub price: f64,
    /// Required for stop-loss price types.
    pub trigger_price: Option<f64>,
    /// Sent only when non-zero.
    pub book_loss_price: f64,
    /// Sent only when non-zero.
    pub book_profit_price: f64,
    /// Sent only when non-zero.
    pub trail_price: f64,
}

impl ModifyOrderRequest {
    /// A request with zero prices and no trigger.
    pub fn new(
        order_no: impl Into<String>,
        exchange: impl Into<String>,
        trading_symbol: impl Into<String>,
        quantity: u64,
        price_type: PriceType,
    ) -> Self {
        Self {
            order_no: order_no.into(),
            exchange: exchange.into(),
            trading_symbol: trading_symbol.into(),
            quantity,
            price_type,
            price: 0.0,
            trigger_price: None,
            book_loss_price: 0.0,
            book_profit_price: 0.0,
            trail_price: 0.0,
        }
    }

    /// Build the `/ModifyOrder` payload.
    ///
    /// Fails with [`NorenError::InvalidArgument`] when a stop-loss price type
    /// has no trigger price.
    pub fn to_payload(&self, user_id: &str, account_id: &str) -> Result<Payload> {
        let mut p = Payload::new()
            .with("ordersource", SOURCE_API)
            .with("uid", user_id)
            .with("actid", account_id)
            .with("norenordno", &self.order_no)
            .with("exch", &self.exchange);
        p.insert_encoded("tsym", &self.trading_symbol);
        p.insert("qty", self.quantity);
        p.insert("prctyp", self.price_type);
        p.insert("prc", self.price);

        if self.price_type.requires_trigger() {
            let trigger = self.trigger_price.ok_or_else(|| {
                NorenError::InvalidArgument(format!(
                    "trigger price is required for {} orders",
                    self.price_type
                ))
            })?;
            p.insert("trgprc", trigger);
        }
        if self.book_loss_price != 0.0 {
            p.insert("blprc", self.book_loss_price);
        }
        if self.trail_price != 0.0 {
            p.insert("trailprc", self.trail_price);
        }
        if self.book_profit_price != 0.0 {
            p.insert("bpprc", self.book_profit_price);
        }
        Ok(p)
    }
}

// ---------------------------------------------------------------------------
// Responses
// ---------------------------------------------------------------------------

/// Acknowledgement returned by place/modify/cancel/exit.
#[derive(Debug, Clone, Deserialize)]
pub struct OrderAck {
    pub stat: String,
    /// Order number (place order).
    #[serde(default)]
    pub norenordno: Option<String>,
    /// Order number echoed back (modify/cancel).
    #[serde(default)]
    pub result: Option<String>,
    #[serde(default)]
    pub request_time: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl OrderAck {
    /// The order number this acknowledgement refers to.
    pub fn order_no(&self) -> Option<&str> {
        self.norenordno.as_deref().or(self.result.as_deref())
    }
}
