//! Portfolio types: position product conversion.

use crate::constants::SOURCE_API;
use crate::types::enums::*;
use crate::types::payload::Payload;

/// Convert a day or carry-forward position from one product to another.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductConversionRequest {
    pub exchange: String,
    pub trading_symbol: String,
    pub quantity: u64,
    pub new_product: ProductType,
    pub previous_product: ProductType,
    pub side: TransactionType,
    pub position_type: PositionType,
}

impl ProductConversionRequest {
    /// Build the `/ProductConversion` payload.
    pub fn to_payload(&self, user_id: &str, account_id: &str) -> Payload {
        let mut p = Payload::new()
            .with("ordersource", SOURCE_API)
            .with("uid", user_id)
            .with("actid", account_id)
            .with("exch", &self.exchange);
        p.insert_encoded("tsym", &self.trading_symbol);
        p.insert("qty", self.quantity);
        p.insert("prd", self.new_product);
        p.insert("prevprd", self.previous_product);
        p.insert("trantype", self.side);
        p.insert("postype", self.position_type);
        p
    }
}
