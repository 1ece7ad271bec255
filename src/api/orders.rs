//! Order management endpoints.

use serde_json::Value;

use crate::client::NorenClient;
use crate::config::Route;
use crate::constants::SOURCE_API;
use crate::error::Result;
use crate::types::enums::ProductType;
use crate::types::orders::{ModifyOrderRequest, OrderAck, PlaceOrderRequest};
use crate::types::payload::Payload;
use crate::types::portfolio::ProductConversionRequest;

impl NorenClient {
    /// Place a new order.
    ///
    /// **Endpoint:** `POST /PlaceOrder`
    pub async fn place_order(&self, req: &PlaceOrderRequest) -> Result<OrderAck> {
        let (uid, actid) = self.identity()?;
        let payload = req.to_payload(uid, actid);
        let ack: OrderAck = self.send_as(Route::PlaceOrder, &payload, true).await?;
        tracing::info!(order_no = ?ack.order_no(), "order placed");
        Ok(ack)
    }

    /// Modify a pending order.
    ///
    /// **Endpoint:** `POST /ModifyOrder`
    pub async fn modify_order(&self, req: &ModifyOrderRequest) -> Result<OrderAck> {
        let (uid, actid) = self.identity()?;
        let payload = req.to_payload(uid, actid)?;
        self.send_as(Route::ModifyOrder, &payload, true).await
    }

    /// Cancel a pending order.
    ///
    /// **Endpoint:** `POST /CancelOrder`
    pub async fn cancel_order(&self, order_no: &str) -> Result<OrderAck> {
        let (uid, _) = self.identity()?;
        let payload = Payload::new()
            .with("ordersource", SOURCE_API)
            .with("uid", uid)
            .with("norenordno", order_no);
        self.send_as(Route::CancelOrder, &payload, true).await
    }

    /// Exit a cover or bracket order.
    ///
    /// **Endpoint:** `POST /ExitSNOOrder`
    pub async fn exit_order(&self, order_no: &str, product: ProductType) -> Result<OrderAck> {
        let (uid, _) = self.identity()?;
        let payload = Payload::new()
            .with("ordersource", SOURCE_API)
            .with("uid", uid)
            .with("norenordno", order_no)
            .with("prd", product);
        self.send_as(Route::ExitOrder, &payload, true).await
    }

    /// Convert a day or carry-forward position to another product.
    ///
    /// **Endpoint:** `POST /ProductConversion`
    pub async fn position_product_conversion(
        &self,
        req: &ProductConversionRequest,
    ) -> Result<Value> {
        let (uid, actid) = self.identity()?;
        let payload = req.to_payload(uid, actid);
        self.send(Route::ProductConversion, &payload, true).await
    }

    /// All orders for the day.
    ///
    /// **Endpoint:** `POST /OrderBook`
    pub async fn get_order_book(&self) -> Result<Vec<Value>> {
        let (uid, _) = self.identity()?;
        let payload = Payload::new()
            .with("ordersource", SOURCE_API)
            .with("uid", uid);
        self.send_as(Route::OrderBook, &payload, true).await
    }

    /// All trades for the day.
    ///
    /// **Endpoint:** `POST /TradeBook`
    pub async fn get_trade_book(&self) -> Result<Vec<Value>> {
        let (uid, actid) = self.identity()?;
        let payload = Payload::new()
            .with("ordersource", SOURCE_API)
            .with("uid", uid)
            .with("actid", actid);
        self.send_as(Route::TradeBook, &payload, true).await
    }

    /// State transitions of a single order, newest first.
    ///
    /// **Endpoint:** `POST /SingleOrdHist`
    pub async fn single_order_history(&self, order_no: &str) -> Result<Vec<Value>> {
        let (uid, _) = self.identity()?;
        let payload = Payload::new()
            .with("ordersource", SOURCE_API)
            .with("uid", uid)
            .with("norenordno", order_no);
        self.send_as(Route::SingleOrderHistory, &payload, true).await
    }
}
