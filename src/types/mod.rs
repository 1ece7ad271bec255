//! Request and response types for the Noren API.
//!
//! Request types own the mapping from typed parameters to the flat,
//! string-keyed [`Payload`](payload::Payload) the service expects; field names
//! are fixed by the remote protocol.
//!
//! ## Organization
//!
//! - [`enums`]: Shared enumerations with their wire codes
//! - [`payload`]: The `jData` payload builder and percent encoding
//! - [`auth`]: Login request/response and credential digests
//! - [`orders`]: Order placement, modification, acknowledgement
//! - [`portfolio`]: Position product conversion
//! - [`risk`]: Span calculator and option Greek inputs
//!
//! All enums are re-exported at the module root via `pub use enums::*`.

pub mod auth;
pub mod enums;
pub mod orders;
pub mod payload;
pub mod portfolio;
pub mod risk;

pub use enums::*;
