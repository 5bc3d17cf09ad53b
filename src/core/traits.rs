//! Collaborator contracts for the account and inventory services
//!
//! The sales coordinator only ever talks to these traits. Local implementations
//! (`AccountService`, `InventoryService`) wrap a shared `Store`; remote ones
//! (`client::RemoteAccounts`, `client::RemoteInventory`) speak HTTP to another
//! process and decode its error envelope back into the same `ShopError`.

use crate::types::{Good, GoodInput, Quantity, ShopError, User, UserProfile};
use async_trait::async_trait;
use rust_decimal::Decimal;

/// Customer records and wallets
///
/// Mutators return the record as stored after the change.
#[async_trait]
pub trait AccountApi: Send + Sync {
    /// Create a user with an empty wallet
    ///
    /// Fails with `UsernameTaken` if the username exists.
    async fn register(&self, profile: UserProfile) -> Result<User, ShopError>;

    /// Exact-match lookup; `Ok(None)` when absent
    async fn lookup(&self, username: &str) -> Result<Option<User>, ShopError>;

    /// Overwrite every profile field, never the wallet
    async fn update(&self, profile: UserProfile) -> Result<User, ShopError>;

    async fn delete(&self, username: &str) -> Result<(), ShopError>;

    /// Add `amount` to the wallet
    async fn credit(&self, username: &str, amount: Decimal) -> Result<User, ShopError>;

    /// Subtract `amount` from the wallet
    ///
    /// Fails with `InsufficientFunds` instead of going negative.
    async fn debit(&self, username: &str, amount: Decimal) -> Result<User, ShopError>;

    async fn list(&self) -> Result<Vec<User>, ShopError>;
}

/// Goods and stock counts
#[async_trait]
pub trait InventoryApi: Send + Sync {
    /// Register a new good after validating category and price
    async fn add(&self, good: GoodInput) -> Result<Good, ShopError>;

    /// Exact-match lookup; `Ok(None)` when absent
    async fn lookup(&self, name: &str) -> Result<Option<Good>, ShopError>;

    /// Overwrite every field of an existing good, count included
    async fn update(&self, good: GoodInput) -> Result<Good, ShopError>;

    /// Take `quantity` units out of stock
    ///
    /// Fails with `OutOfStock` or `InsufficientStock` instead of going negative.
    async fn reserve(&self, name: &str, quantity: Quantity) -> Result<Good, ShopError>;

    async fn list(&self) -> Result<Vec<Good>, ShopError>;
}
