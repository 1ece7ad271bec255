//! Shared enum types that map directly to the service's single-letter and
//! short string codes.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Implements `as_str` and `Display` for a code enum.
macro_rules! wire_codes {
    ($name:ident { $($variant:ident => $code:literal),+ $(,)? }) => {
        impl $name {
            /// The wire code for this value.
            pub fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $code,)+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

// ---------------------------------------------------------------------------
// Transaction Type
// ---------------------------------------------------------------------------

/// Buy or sell side of a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransactionType {
    #[serde(rename = "B")]
    Buy,
    #[serde(rename = "S")]
    Sell,
}

wire_codes!(TransactionType { Buy => "B", Sell => "S" });

// ---------------------------------------------------------------------------
// Product Type
// ---------------------------------------------------------------------------

/// Product type for an order (`prd`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProductType {
    /// Cash & carry delivery.
    #[serde(rename = "C")]
    Delivery,
    /// Intraday (MIS).
    #[serde(rename = "I")]
    Intraday,
    /// Normal / carry-forward for derivatives.
    #[serde(rename = "M")]
    Normal,
    /// Cover order (high leverage).
    #[serde(rename = "H")]
    CoverOrder,
    /// Bracket order.
    #[serde(rename = "B")]
    BracketOrder,
}

wire_codes!(ProductType {
    Delivery => "C",
    Intraday => "I",
    Normal => "M",
    CoverOrder => "H",
    BracketOrder => "B",
});

// ---------------------------------------------------------------------------
// Price Type
// ---------------------------------------------------------------------------

/// Order price type (`prctyp`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PriceType {
    #[serde(rename = "MKT")]
    Market,
    #[serde(rename = "LMT")]
    Limit,
    #[serde(rename = "SL-LMT")]
    StopLossLimit,
    #[serde(rename = "SL-MKT")]
    StopLossMarket,
}

wire_codes!(PriceType {
    Market => "MKT",
    Limit => "LMT",
    StopLossLimit => "SL-LMT",
    StopLossMarket => "SL-MKT",
});

impl PriceType {
    /// Stop-loss price types require a trigger price.
    pub fn requires_trigger(self) -> bool {
        matches!(self, Self::StopLossLimit | Self::StopLossMarket)
    }
}

// ---------------------------------------------------------------------------
// Retention
// ---------------------------------------------------------------------------

/// Order validity (`ret`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Retention {
    #[default]
    #[serde(rename = "DAY")]
    Day,
    #[serde(rename = "IOC")]
    Ioc,
    #[serde(rename = "EOS")]
    Eos,
}

wire_codes!(Retention { Day => "DAY", Ioc => "IOC", Eos => "EOS" });

// ---------------------------------------------------------------------------
// Position Type
// ---------------------------------------------------------------------------

/// Whether a position is a day position or carried forward (`postype`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PositionType {
    #[serde(rename = "DAY")]
    Day,
    #[serde(rename = "CF")]
    CarryForward,
}

wire_codes!(PositionType { Day => "DAY", CarryForward => "CF" });

// ---------------------------------------------------------------------------
// Option Type
// ---------------------------------------------------------------------------

/// Call or put (`optt`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OptionType {
    #[serde(rename = "CE")]
    Call,
    #[serde(rename = "PE")]
    Put,
}

wire_codes!(OptionType { Call => "CE", Put => "PE" });
