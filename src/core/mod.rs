//! Core business logic module
//!
//! This module contains the storefront's services and the store they share:
//! - `table` - Keyed record sets with per-row write locking
//! - `history` - Append-only purchase log
//! - `store` - The three record sets and their on-disk snapshots
//! - `traits` - Collaborator contracts used by the sales coordinator
//! - `account_service` - Customer records and wallets
//! - `inventory_service` - Goods and stock counts
//! - `good_locks` - Per-good purchase serialization
//! - `sales` - Purchase saga and history aggregation

pub mod account_service;
pub mod good_locks;
pub mod history;
pub mod inventory_service;
pub mod sales;
pub mod store;
pub mod table;
pub mod traits;

pub use account_service::AccountService;
pub use good_locks::GoodLocks;
pub use history::HistoryLog;
pub use inventory_service::InventoryService;
pub use sales::SalesCoordinator;
pub use store::{RecordSets, Store};
pub use table::{Record, Table};
pub use traits::{AccountApi, InventoryApi};
