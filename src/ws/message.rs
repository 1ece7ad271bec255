//! Feed frames: outbound control frames and decoding of inbound messages.
//!
//! Every frame is a JSON object tagged by its `t` field.
//!
//! | Direction | `t` | Meaning |
//! |---|---|---|
//! | out | `c` | connect / authenticate |
//! | out | `t` / `u` | touchline subscribe / unsubscribe |
//! | out | `d` / `ud` | snap-quote (depth) subscribe / unsubscribe |
//! | out | `o` | order-update subscribe |
//! | in | `tk` / `tf` | touchline snapshot / update |
//! | in | `dk` / `df` | depth snapshot / update |
//! | in | `ck` | connect acknowledgement, status in `s` |
//! | in | `om` | order update |

use serde::{Deserialize, Deserializer, Serialize};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::constants::{FEED_ACK_OK, KEY_DELIMITER};
use crate::error::{NorenError, Result};

// ---------------------------------------------------------------------------
// Feed kind
// ---------------------------------------------------------------------------

/// Which market-data stream a subscription refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeedKind {
    /// Top of book: best bid/ask and last traded price.
    Touchline,
    /// Full market depth.
    SnapQuote,
}

impl FeedKind {
    /// `t` tag of the subscribe frame.
    pub fn subscribe_tag(self) -> &'static str {
        match self {
            Self::Touchline => "t",
            Self::SnapQuote => "d",
        }
    }

    /// `t` tag of the unsubscribe frame.
    pub fn unsubscribe_tag(self) -> &'static str {
        match self {
            Self::Touchline => "u",
            Self::SnapQuote => "ud",
        }
    }
}

// ---------------------------------------------------------------------------
// Outbound frames
// ---------------------------------------------------------------------------

/// A control frame sent to the feed.
#[derive(Clone, PartialEq, Serialize)]
#[serde(tag = "t")]
pub enum OutboundFrame {
    #[serde(rename = "c")]
    Connect {
        uid: String,
        actid: String,
        susertoken: String,
        source: String,
    },
    #[serde(rename = "t")]
    SubscribeTouchline { k: String },
    #[serde(rename = "u")]
    UnsubscribeTouchline { k: String },
    #[serde(rename = "d")]
    SubscribeDepth { k: String },
    #[serde(rename = "ud")]
    UnsubscribeDepth { k: String },
    #[serde(rename = "o")]
    SubscribeOrders { actid: String },
}

impl OutboundFrame {
    /// Subscribe frame for `keys` (`EXCH|TOKEN`), joined with `#`.
    pub fn subscribe<S: AsRef<str>>(kind: FeedKind, keys: &[S]) -> Self {
        let k = join_keys(keys);
        match kind {
            FeedKind::Touchline => Self::SubscribeTouchline { k },
            FeedKind::SnapQuote => Self::SubscribeDepth { k },
        }
    }

    /// Unsubscribe frame for `keys`.
    pub fn unsubscribe<S: AsRef<str>>(kind: FeedKind, keys: &[S]) -> Self {
        let k = join_keys(keys);
        match kind {
            FeedKind::Touchline => Self::UnsubscribeTouchline { k },
            FeedKind::SnapQuote => Self::UnsubscribeDepth { k },
        }
    }

    /// The `t` tag this frame serializes with.
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Connect { .. } => "c",
            Self::SubscribeTouchline { .. } => FeedKind::Touchline.subscribe_tag(),
            Self::UnsubscribeTouchline { .. } => FeedKind::Touchline.unsubscribe_tag(),
            Self::SubscribeDepth { .. } => FeedKind::SnapQuote.subscribe_tag(),
            Self::UnsubscribeDepth { .. } => FeedKind::SnapQuote.unsubscribe_tag(),
            Self::SubscribeOrders { .. } => "o",
        }
    }

    /// Serialize to JSON text.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

// The connect frame carries the session token.
impl std::fmt::Debug for OutboundFrame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Connect { uid, actid, source, .. } => f
                .debug_struct("Connect")
                .field("uid", uid)
                .field("actid", actid)
                .field("source", source)
                .finish_non_exhaustive(),
            Self::SubscribeTouchline { k }
            | Self::UnsubscribeTouchline { k }
            | Self::SubscribeDepth { k }
            | Self::UnsubscribeDepth { k } => write!(f, "{}({k})", self.tag()),
            Self::SubscribeOrders { actid } => write!(f, "o({actid})"),
        }
    }
}

fn join_keys<S: AsRef<str>>(keys: &[S]) -> String {
    keys.iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join(KEY_DELIMITER)
}

// ---------------------------------------------------------------------------
// Inbound payloads
// ---------------------------------------------------------------------------

/// Accept a string, a number or a bool; the feed is not consistent about
/// which it sends.
fn lenient_string<'de, D: Deserializer<'de>>(
    d: D,
) -> std::result::Result<Option<String>, D::Error> {
    Ok(match Option::<Value>::deserialize(d)? {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s),
        Some(other) => Some(other.to_string()),
    })
}

/// One side of one depth level.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DepthLevel {
    pub price: Option<String>,
    pub quantity: Option<String>,
    pub orders: Option<String>,
}

/// A touchline or depth quote. Only fields present in the frame are set;
/// updates (`tf`/`df`) carry just what changed.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Quote {
    #[serde(rename = "e", default, deserialize_with = "lenient_string")]
    pub exchange: Option<String>,
    #[serde(rename = "tk", default, deserialize_with = "lenient_string")]
    pub token: Option<String>,
    #[serde(rename = "ts", default, deserialize_with = "lenient_string")]
    pub trading_symbol: Option<String>,
    #[serde(rename = "lp", default, deserialize_with = "lenient_string")]
    pub last_price: Option<String>,
    #[serde(rename = "pc", default, deserialize_with = "lenient_string")]
    pub percent_change: Option<String>,
    #[serde(rename = "v", default, deserialize_with = "lenient_string")]
    pub volume: Option<String>,
    #[serde(rename = "o", default, deserialize_with = "lenient_string")]
    pub open: Option<String>,
    #[serde(rename = "h", default, deserialize_with = "lenient_string")]
    pub high: Option<String>,
    #[serde(rename = "l", default, deserialize_with = "lenient_string")]
    pub low: Option<String>,
    #[serde(rename = "c", default, deserialize_with = "lenient_string")]
    pub close: Option<String>,
    #[serde(rename = "ap", default, deserialize_with = "lenient_string")]
    pub average_price: Option<String>,
    #[serde(rename = "oi", default, deserialize_with = "lenient_string")]
    pub open_interest: Option<String>,
    #[serde(rename = "ltq", default, deserialize_with = "lenient_string")]
    pub last_trade_qty: Option<String>,
    #[serde(rename = "ltt", default, deserialize_with = "lenient_string")]
    pub last_trade_time: Option<String>,
    #[serde(rename = "ft", default, deserialize_with = "lenient_string")]
    pub feed_time: Option<String>,
    /// Depth levels (`bp1`..`sq5`) and any other fields.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Quote {
    /// The instrument key `EXCH|TOKEN`, when both parts are present.
    pub fn key(&self) -> Option<String> {
        match (&self.exchange, &self.token) {
            (Some(e), Some(tk)) => Some(format!("{e}|{tk}")),
            _ => None,
        }
    }

    /// A field not modelled above, as text.
    pub fn field(&self, name: &str) -> Option<String> {
        match self.extra.get(name)? {
            Value::String(s) => Some(s.clone()),
            Value::Null => None,
            other => Some(other.to_string()),
        }
    }

    /// Bid side of depth level `n` (1–5).
    pub fn bid(&self, n: usize) -> DepthLevel {
        DepthLevel {
            price: self.field(&format!("bp{n}")),
            quantity: self.field(&format!("bq{n}")),
            orders: self.field(&format!("bo{n}")),
        }
    }

    /// Ask side of depth level `n` (1–5).
    pub fn ask(&self, n: usize) -> DepthLevel {
        DepthLevel {
            price: self.field(&format!("sp{n}")),
            quantity: self.field(&format!("sq{n}")),
            orders: self.field(&format!("so{n}")),
        }
    }
}

/// A market-data message.
#[derive(Debug, Clone, PartialEq)]
pub struct MarketData {
    pub kind: FeedKind,
    /// `true` for the full snapshot sent on subscribe (`tk`/`dk`), `false` for
    /// incremental updates (`tf`/`df`).
    pub snapshot: bool,
    pub quote: Quote,
}

/// An order state transition pushed by the feed.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct OrderUpdate {
    #[serde(rename = "norenordno", default, deserialize_with = "lenient_string")]
    pub order_no: Option<String>,
    #[serde(rename = "uid", default, deserialize_with = "lenient_string")]
    pub user_id: Option<String>,
    #[serde(rename = "actid", default, deserialize_with = "lenient_string")]
    pub account_id: Option<String>,
    #[serde(rename = "exch", default, deserialize_with = "lenient_string")]
    pub exchange: Option<String>,
    #[serde(rename = "tsym", default, deserialize_with = "lenient_string")]
    pub trading_symbol: Option<String>,
    #[serde(rename = "trantype", default, deserialize_with = "lenient_string")]
    pub side: Option<String>,
    #[serde(rename = "prd", default, deserialize_with = "lenient_string")]
    pub product: Option<String>,
    #[serde(rename = "prctyp", default, deserialize_with = "lenient_string")]
    pub price_type: Option<String>,
    #[serde(rename = "qty", default, deserialize_with = "lenient_string")]
    pub quantity: Option<String>,
    #[serde(rename = "prc", default, deserialize_with = "lenient_string")]
    pub price: Option<String>,
    #[serde(rename = "trgprc", default, deserialize_with = "lenient_string")]
    pub trigger_price: Option<String>,
    /// Order status, e.g. `OPEN`, `COMPLETE`, `REJECTED`, `CANCELED`.
    #[serde(default, deserialize_with = "lenient_string")]
    pub status: Option<String>,
    /// What triggered the update, e.g. `New`, `Fill`, `Replaced`.
    #[serde(rename = "reporttype", default, deserialize_with = "lenient_string")]
    pub report_type: Option<String>,
    #[serde(rename = "fillshares", default, deserialize_with = "lenient_string")]
    pub filled_qty: Option<String>,
    #[serde(rename = "avgprc", default, deserialize_with = "lenient_string")]
    pub average_price: Option<String>,
    #[serde(rename = "rejreason", default, deserialize_with = "lenient_string")]
    pub rejection_reason: Option<String>,
    #[serde(rename = "exchordid", default, deserialize_with = "lenient_string")]
    pub exchange_order_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub remarks: Option<String>,
    #[serde(rename = "exch_tm", default, deserialize_with = "lenient_string")]
    pub exchange_time: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Acknowledgement of the connect frame.
#[derive(Debug, Clone, PartialEq)]
pub struct ConnectionAck {
    /// The `s` field; `"OK"` on success.
    pub status: Option<String>,
    /// The frame as received.
    pub raw: Value,
}

impl ConnectionAck {
    /// Whether the feed accepted the session.
    pub fn is_ok(&self) -> bool {
        self.status.as_deref() == Some(FEED_ACK_OK)
    }
}

/// A decoded inbound frame.
#[derive(Debug, Clone, PartialEq)]
pub enum InboundMessage {
    MarketData(MarketData),
    OrderUpdate(OrderUpdate),
    ConnectionAck(ConnectionAck),
    /// A tag this client does not know. Ignored by the feed.
    Unknown { tag: String, raw: Value },
}

impl InboundMessage {
    /// Decode one text frame.
    ///
    /// Fails with [`NorenError::Json`] when the text is not JSON and with
    /// [`NorenError::Decode`] when it has no `t` tag or the wrong shape for
    /// its tag.
    pub fn decode(text: &str) -> Result<Self> {
        let Value::Object(mut obj) = serde_json::from_str::<Value>(text)? else {
            return Err(NorenError::Decode("frame is not a JSON object".into()));
        };
        let tag = match obj.remove("t") {
            Some(Value::String(t)) => t,
            _ => return Err(NorenError::Decode("frame has no `t` tag".into())),
        };

        let msg = match tag.as_str() {
            "tk" | "tf" => Self::MarketData(MarketData {
                kind: FeedKind::Touchline,
                snapshot: tag == "tk",
                quote: from_object(&tag, obj)?,
            }),
            "dk" | "df" => Self::MarketData(MarketData {
                kind: FeedKind::SnapQuote,
                snapshot: tag == "dk",
                quote: from_object(&tag, obj)?,
            }),
            "om" => Self::OrderUpdate(from_object(&tag, obj)?),
            "ck" => {
                let status = obj.get("s").and_then(Value::as_str).map(str::to_owned);
                obj.insert("t".into(), Value::String(tag));
                Self::ConnectionAck(ConnectionAck {
                    status,
                    raw: Value::Object(obj),
                })
            }
            _ => {
                obj.insert("t".into(), Value::String(tag.clone()));
                Self::Unknown {
                    tag,
                    raw: Value::Object(obj),
                }
            }
        };
        Ok(msg)
    }
}

fn from_object<T: DeserializeOwned>(tag: &str, obj: Map<String, Value>) -> Result<T> {
    serde_json::from_value(Value::Object(obj))
        .map_err(|e| NorenError::Decode(format!("`{tag}` frame: {e}")))
}
