//! Market watch endpoints.

use serde_json::Value;

use crate::client::NorenClient;
use crate::config::Route;
use crate::constants::{KEY_DELIMITER, SOURCE_API};
use crate::error::Result;
use crate::types::payload::Payload;

impl NorenClient {
    /// Names of the user's watch lists.
    ///
    /// **Endpoint:** `POST /MWList`
    pub async fn get_watch_list_names(&self) -> Result<Value> {
        let (uid, _) = self.identity()?;
        let payload = Payload::new()
            .with("ordersource", SOURCE_API)
            .with("uid", uid);
        self.send(Route::WatchlistNames, &payload, true).await
    }

    /// Scrips in the watch list `name`.
    ///
    /// **Endpoint:** `POST /MarketWatch`
    pub async fn get_watch_list(&self, name: &str) -> Result<Value> {
        let (uid, _) = self.identity()?;
        let payload = Payload::new()
            .with("ordersource", SOURCE_API)
            .with("uid", uid)
            .with("wlname", name);
        self.send(Route::Watchlist, &payload, true).await
    }

    /// Add `EXCH|TOKEN` scrips to a watch list.
    ///
    /// **Endpoint:** `POST /AddMultiScripsToMW`
    pub async fn add_watch_list_scrips(&self, name: &str, scrips: &[&str]) -> Result<Value> {
        let payload = self.watch_list_edit(name, scrips)?;
        self.send(Route::WatchlistAdd, &payload, true).await
    }

    /// Remove `EXCH|TOKEN` scrips from a watch list.
    ///
    /// **Endpoint:** `POST /DeleteMultiMWScrips`
    pub async fn delete_watch_list_scrips(&self, name: &str, scrips: &[&str]) -> Result<Value> {
        let payload = self.watch_list_edit(name, scrips)?;
        self.send(Route::WatchlistDelete, &payload, true).await
    }

    fn watch_list_edit(&self, name: &str, scrips: &[&str]) -> Result<Payload> {
        let (uid, _) = self.identity()?;
        Ok(Payload::new()
            .with("ordersource", SOURCE_API)
            .with("uid", uid)
            .with("wlname", name)
            .with("scrips", scrips.join(KEY_DELIMITER)))
    }
}
