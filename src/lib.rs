//! # noren-rs
//!
//! A Rust client library for Noren-based brokerage trading APIs.
//!
//! - [`NorenClient`]: session authentication and every REST operation
//!   (orders, watchlists, portfolio, market data, risk tools).
//! - [`ws::feed::StreamingFeed`]: the live WebSocket feed for quotes and
//!   order updates.
//!
//! ## Quick Start
//!
//! ```no_run
//! use noren_rs::NorenClient;
//! use noren_rs::types::auth::LoginRequest;
//!
//! #[tokio::main]
//! async fn main() -> noren_rs::Result<()> {
//!     let mut client = NorenClient::new(
//!         "https://broker.example/NorenWClientTP",
//!         "wss://broker.example/NorenWSTP/",
//!     );
//!     client
//!         .login(&LoginRequest {
//!             user_id: "FA12345".into(),
//!             password: "secret".into(),
//!             two_fa: "123456".into(),
//!             vendor_code: "FA12345_U".into(),
//!             api_secret: "api-secret".into(),
//!             imei: "abc1234".into(),
//!         })
//!         .await?;
//!     let orders = client.get_order_book().await?;
//!     println!("{} orders today", orders.len());
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod client;
pub mod config;
pub mod constants;
pub mod error;
pub mod types;
pub mod ws;

/// Re-export the main client type at crate root for convenience.
pub use client::NorenClient;
/// Re-export the error type and Result alias.
pub use error::{NorenError, Result};
