#![allow(missing_docs)]
//! Span margin and option Greek request types.

use serde::{Serialize, Serializer};

use crate::constants::SOURCE_API;
use crate::types::enums::*;
use crate::types::payload::Payload;

/// Serialize any `Display` value as a JSON string.
fn as_string<T: ToString, S: Serializer>(
    value: &T,
    s: S,
) -> std::result::Result<S::Ok, S::Error> {
    s.serialize_str(&value.to_string())
}

/// One hypothetical position for the span calculator.
///
/// Every field goes over the wire as a string, like the rest of the API.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpanPosition {
    #[serde(rename = "prd", serialize_with = "as_string")]
    pub product: ProductType,
    #[serde(rename = "exch")]
    pub exchange: String,
    /// Instrument name, e.g. `FUTIDX`, `OPTSTK`.
    #[serde(rename = "instname")]
    pub instrument_name: String,
    #[serde(rename = "symname")]
    pub symbol_name: String,
    /// Expiry date as the exchange formats it (`DD-MMM-YYYY`).
    #[serde(rename = "exd")]
    pub expiry: String,
    /// Option type; `XX` for futures.
    #[serde(rename = "optt")]
    pub option_type: String,
    #[serde(rename = "strprc", serialize_with = "as_string")]
    pub strike_price: f64,
    #[serde(rename = "buyqty", serialize_with = "as_string")]
    pub buy_qty: i64,
    #[serde(rename = "sellqty", serialize_with = "as_string")]
    pub sell_qty: i64,
    #[serde(rename = "netqty", serialize_with = "as_string")]
    pub net_qty: i64,
}

/// Inputs for the option Greek calculator.
#[derive(Debug, Clone, PartialEq)]
pub struct OptionGreekRequest {
    /// Expiry date (`DD-MMM-YYYY`).
    pub expiry: String,
    pub strike_price: f64,
    pub spot_price: f64,
    /// Annual interest rate in percent.
    pub interest_rate: f64,
    /// Annualised volatility in percent.
    pub volatility: f64,
    pub option_type: OptionType,
}

impl OptionGreekRequest {
    /// Build the `/GetOptionGreek` payload.
    pub fn to_payload(&self, account_id: &str) -> Payload {
        Payload::new()
            .with("source", SOURCE_API)
            .with("actid", account_id)
            .with("exd", &self.expiry)
            .with("strprc", self.strike_price)
            .with("sptprc", self.spot_price)
            .with("int_rate", self.interest_rate)
            .with("volatility", self.volatility)
            .with("optt", self.option_type)
    }
}
