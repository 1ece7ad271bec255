//! REST API endpoint implementations.
//!
//! Each sub-module adds high-level `async` methods to
//! [`NorenClient`](crate::client::NorenClient) via `impl` blocks. Every method
//! maps its typed parameters to a [`Payload`](crate::types::payload::Payload)
//! and routes it through [`NorenClient::send`](crate::client::NorenClient::send).
//!
//! ## Usage
//!
//! ```no_run
//! use noren_rs::NorenClient;
//!
//! # #[tokio::main]
//! # async fn main() -> noren_rs::Result<()> {
//! let mut client = NorenClient::new("https://broker.example/NorenWClientTP", "wss://broker.example/NorenWSTP/");
//! client.set_session("FA12345", "session-token");
//! let orders = client.get_order_book().await?;
//! let holdings = client.get_holdings(None).await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! | Module | Endpoints | Description |
//! |---|---|---|
//! | [`auth`] | 4 | Login, logout, password flows |
//! | [`orders`] | 8 | Place/modify/cancel/exit, conversion, books, history |
//! | [`watchlist`] | 4 | Market watch lists |
//! | [`market_data`] | 6 | Scrip search, quotes, option chain, price series |
//! | [`portfolio`] | 3 | Holdings, limits, positions |
//! | [`risk`] | 2 | Span calculator, option Greeks |

pub mod auth;
pub mod market_data;
pub mod orders;
pub mod portfolio;
pub mod risk;
pub mod watchlist;
