//! Span margin and option Greek calculators.

use serde_json::Value;

use crate::client::NorenClient;
use crate::config::Route;
use crate::error::Result;
use crate::types::payload::Payload;
use crate::types::risk::{OptionGreekRequest, SpanPosition};

impl NorenClient {
    /// Span and exposure margin for a hypothetical set of positions.
    ///
    /// **Endpoint:** `POST /SpanCalc`
    pub async fn span_calculator(&self, positions: &[SpanPosition]) -> Result<Value> {
        let (_, actid) = self.identity()?;
        let mut payload = Payload::new().with("actid", actid);
        payload.insert_value("pos", serde_json::to_value(positions)?);
        self.send(Route::SpanCalculator, &payload, true).await
    }

    /// Option price and Greeks for the given inputs.
    ///
    /// **Endpoint:** `POST /GetOptionGreek`
    pub async fn option_greek(&self, req: &OptionGreekRequest) -> Result<Value> {
        let (_, actid) = self.identity()?;
        let payload = req.to_payload(actid);
        self.send(Route::OptionGreek, &payload, true).await
    }
}
