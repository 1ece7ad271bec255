//! Portfolio endpoints: holdings, limits, positions.

use serde_json::Value;

use crate::client::NorenClient;
use crate::config::Route;
use crate::error::Result;
use crate::types::enums::ProductType;
use crate::types::payload::Payload;

impl NorenClient {
    /// Demat holdings. `product` defaults to [`ProductType::Delivery`].
    ///
    /// **Endpoint:** `POST /Holdings`
    pub async fn get_holdings(&self, product: Option<ProductType>) -> Result<Vec<Value>> {
        let (uid, actid) = self.identity()?;
        let payload = Payload::new()
            .with("uid", uid)
            .with("actid", actid)
            .with("prd", product.unwrap_or(ProductType::Delivery));
        self.send_as(Route::Holdings, &payload, true).await
    }

    /// Cash and margin limits, optionally narrowed by product, segment or
    /// exchange.
    ///
    /// **Endpoint:** `POST /Limits`
    pub async fn get_limits(
        &self,
        product: Option<ProductType>,
        segment: Option<&str>,
        exchange: Option<&str>,
    ) -> Result<Value> {
        let (uid, actid) = self.identity()?;
        let mut payload = Payload::new().with("uid", uid).with("actid", actid);
        payload.insert_opt("prd", product);
        payload.insert_opt("seg", segment);
        payload.insert_opt("exch", exchange);
        self.send(Route::Limits, &payload, true).await
    }

    /// Open and closed positions for the day.
    ///
    /// **Endpoint:** `POST /PositionBook`
    pub async fn get_positions(&self) -> Result<Vec<Value>> {
        let (uid, actid) = self.identity()?;
        let payload = Payload::new().with("uid", uid).with("actid", actid);
        self.send_as(Route::Positions, &payload, true).await
    }
}
