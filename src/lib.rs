//! Rust Storefront Library
//! # Overview
//!
//! A small retail backend made of three services over one keyed store:
//! an account service (customers and wallets), an inventory service (goods and
//! stock) and a sales coordinator that turns a purchase into a debit, a stock
//! reservation and a history entry.
//!
//! # Architecture
//!
//! - [`types`] - Records, receipts and the `ShopError` taxonomy
//! - [`core`] - Business logic:
//!   - [`core::store`] - Users, goods and purchase history with per-row locking
//!   - [`core::account_service`] - Registration, profile updates, credit and debit
//!   - [`core::inventory_service`] - Goods, validation and stock reservation
//!   - [`core::sales`] - Purchase saga with compensation and history aggregation
//! - [`io`] - CSV snapshot format
//! - [`http`] - axum routers and the response envelope
//! - [`client`] - reqwest clients for running services in separate processes
//! - [`config`], [`cli`] - Process configuration and argument parsing
//! - [`server`] - Wiring per role and the serve loop
//!
//! # Purchase
//!
//! A purchase checks funds first and stock second, then debits the wallet and
//! only after that reserves the stock. A failed reservation credits the wallet
//! back and is reported as `ShopError::PartialFailure`.
//!
//! # Invariants
//!
//! - A wallet is never negative.
//! - A stock count is never negative.
//! - Usernames and good names are unique.

// Module declarations
pub mod cli;
pub mod client;
pub mod config;
pub mod core;
pub mod http;
pub mod io;
pub mod server;
pub mod types;

pub use config::{Role, ServiceConfig};
pub use core::{AccountApi, AccountService, InventoryApi, InventoryService, SalesCoordinator, Store};
pub use types::{
    Category, Good, GoodInput, PriceEntry, PurchaseHistory, PurchaseReceipt, PurchaseRecord,
    Quantity, ShopError, User, UserProfile,
};
