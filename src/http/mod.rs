//! HTTP surface of the three services
//!
//! Each submodule builds the axum `Router` for one service. Paths follow the
//! legacy storefront so existing clients keep working.
//!
//! - `account` - `/api/users/...`
//! - `inventory` - `/api/goods/...`
//! - `sales` - `/api/prices`, `/api/sale/...`, `/api/history/...`
//! - `envelope` - response envelope and body parsing

pub mod account;
pub mod envelope;
pub mod inventory;
pub mod sales;

pub use envelope::{Envelope, MaybeRecord};

/// Response behaviour shared by every router
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HttpOptions {
    /// Answer every request with HTTP 200 and report failures only in the body
    pub legacy_status: bool,
}
