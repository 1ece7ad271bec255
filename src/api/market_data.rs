//! Market data endpoints: scrip search, quotes, option chain, price series.

use chrono::{Local, NaiveDate, NaiveTime, TimeDelta};
use serde_json::Value;

use crate::client::NorenClient;
use crate::config::Route;
use crate::constants::SOURCE_API;
use crate::error::{NorenError, Result};
use crate::types::payload::Payload;

/// Epoch seconds of local midnight on `date`.
fn local_midnight(date: NaiveDate) -> i64 {
    let midnight = date.and_time(NaiveTime::MIN);
    midnight
        .and_local_timezone(Local)
        .earliest()
        .map(|dt| dt.timestamp())
        .unwrap_or_else(|| midnight.and_utc().timestamp())
}

impl NorenClient {
    /// Search scrips on `exchange` by free text.
    ///
    /// **Endpoint:** `POST /SearchScrip`
    pub async fn search_scrip(&self, exchange: &str, text: &str) -> Result<Value> {
        if text.trim().is_empty() {
            return Err(NorenError::InvalidArgument(
                "search text cannot be empty".into(),
            ));
        }
        let (uid, _) = self.identity()?;
        let mut payload = Payload::new().with("uid", uid).with("exch", exchange);
        payload.insert_encoded("stext", text);
        self.send(Route::SearchScrip, &payload, true).await
    }

    /// `count` strikes either side of `strike_price` for the option chain of
    /// `trading_symbol`. The service default is 2.
    ///
    /// **Endpoint:** `POST /GetOptionChain`
    pub async fn get_option_chain(
        &self,
        exchange: &str,
        trading_symbol: &str,
        strike_price: f64,
        count: Option<u32>,
    ) -> Result<Value> {
        let (uid, _) = self.identity()?;
        let mut payload = Payload::new().with("uid", uid).with("exch", exchange);
        payload.insert_encoded("tsym", trading_symbol);
        payload.insert("strprc", strike_price);
        payload.insert("cnt", count.unwrap_or(2));
        self.send(Route::OptionChain, &payload, true).await
    }

    /// Contract details for an instrument token.
    ///
    /// **Endpoint:** `POST /GetSecurityInfo`
    pub async fn get_security_info(&self, exchange: &str, token: &str) -> Result<Value> {
        let (uid, _) = self.identity()?;
        let payload = Payload::new()
            .with("uid", uid)
            .with("exch", exchange)
            .with("token", token);
        self.send(Route::SecurityInfo, &payload, true).await
    }

    /// Snapshot quote for an instrument token.
    ///
    /// **Endpoint:** `POST /GetQuotes`
    pub async fn get_quotes(&self, exchange: &str, token: &str) -> Result<Value> {
        let (uid, _) = self.identity()?;
        let payload = Payload::new()
            .with("uid", uid)
            .with("exch", exchange)
            .with("token", token);
        self.send(Route::Quotes, &payload, true).await
    }

    /// Intraday candles. Times are epoch seconds; `start` defaults to local
    /// midnight today. `interval` is in minutes (1, 3, 5, 10, 15, 30, 60,
    /// 120 or 240).
    ///
    /// **Endpoint:** `POST /TPSeries`
    pub async fn get_time_price_series(
        &self,
        exchange: &str,
        token: &str,
        start: Option<i64>,
        end: Option<i64>,
        interval: Option<u32>,
    ) -> Result<Vec<Value>> {
        let (uid, _) = self.identity()?;
        let start = start.unwrap_or_else(|| local_midnight(Local::now().date_naive()));
        let mut payload = Payload::new()
            .with("ordersource", SOURCE_API)
            .with("uid", uid)
            .with("exch", exchange)
            .with("token", token)
            .with("st", start);
        payload.insert_opt("et", end);
        payload.insert_opt("intrv", interval);
        self.send_as(Route::TimePriceSeries, &payload, true).await
    }

    /// Daily candles for `EXCH:TSYM`. Defaults cover the last seven days up
    /// to now. Sent with a JSON content type.
    ///
    /// **Endpoint:** `POST /EODChartData`
    pub async fn get_daily_price_series(
        &self,
        exchange: &str,
        trading_symbol: &str,
        start: Option<i64>,
        end: Option<i64>,
    ) -> Result<Vec<Value>> {
        let (uid, _) = self.identity()?;
        let now = Local::now();
        let start = start.unwrap_or_else(|| local_midnight(now.date_naive() - TimeDelta::days(7)));
        let end = end.unwrap_or_else(|| now.timestamp());
        let payload = Payload::new()
            .with("uid", uid)
            .with("sym", format!("{exchange}:{trading_symbol}"))
            .with("from", start)
            .with("to", end);
        self.send_as(Route::DailyPriceSeries, &payload, true).await
    }
}
