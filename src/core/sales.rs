//! Purchase orchestration across the account and inventory services
//!
//! This module provides `SalesCoordinator`, which runs the purchase saga:
//! read the good and the buyer, check funds then stock, debit the wallet, reserve
//! the stock and record the sale.
//!
//! # Design
//!
//! The coordinator holds its collaborators as `Arc<dyn AccountApi>` and
//! `Arc<dyn InventoryApi>`, so the same code drives in-process services and
//! services reached over HTTP.
//!
//! ```text
//! SalesCoordinator
//!     ├── Arc<dyn AccountApi>    (debit, credit-back)
//!     ├── Arc<dyn InventoryApi>  (lookup, reserve)
//!     ├── Arc<Store>             (purchase history)
//!     └── GoodLocks              (one purchase per good at a time)
//! ```
//!
//! # Failure handling
//!
//! Debit and reserve are separate calls with no shared transaction. Every call
//! is bounded by `call_timeout`. If the reserve fails for any reason after the
//! debit went through, the cost is credited back and the purchase is reported
//! as `ShopError::PartialFailure`. No history row is written for a failed
//! purchase.

use super::good_locks::GoodLocks;
use super::store::Store;
use super::traits::{AccountApi, InventoryApi};
use crate::types::{
    Good, PriceEntry, PurchaseHistory, PurchaseReceipt, PurchaseRecord, Quantity, SagaStep,
    ShopError,
};
use rust_decimal::Decimal;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

const ACCOUNT: &str = "account";
const INVENTORY: &str = "inventory";

/// Coordinates purchases and serves purchase history
#[derive(Clone)]
pub struct SalesCoordinator {
    accounts: Arc<dyn AccountApi>,
    inventory: Arc<dyn InventoryApi>,
    store: Arc<Store>,
    locks: Arc<GoodLocks>,
    call_timeout: Duration,
}

impl SalesCoordinator {
    /// Create a coordinator
    ///
    /// # Arguments
    ///
    /// * `accounts` - account service, local or remote
    /// * `inventory` - inventory service, local or remote
    /// * `store` - store holding the purchase history
    /// * `call_timeout` - bound applied to every collaborator call
    pub fn new(
        accounts: Arc<dyn AccountApi>,
        inventory: Arc<dyn InventoryApi>,
        store: Arc<Store>,
        call_timeout: Duration,
    ) -> Self {
        Self {
            accounts,
            inventory,
            store,
            locks: Arc::new(GoodLocks::new()),
            call_timeout,
        }
    }

    /// Buy `quantity` units of `name` for `username`
    ///
    /// Checks run in this order and the first failing one wins: quantity, good
    /// exists, user exists, cost fits a decimal, funds, stock. Nothing is mutated
    /// until every check has passed. Purchases of the same good are serialized.
    ///
    /// # Errors
    ///
    /// * `ShopError::InvalidQuantity` - `quantity` is zero
    /// * `ShopError::NotFound` - unknown good or user
    /// * `ShopError::InsufficientFunds` - wallet below `price * quantity`
    /// * `ShopError::OutOfStock` / `ShopError::InsufficientStock` - not enough units
    /// * `ShopError::PartialFailure` - reserve failed after the debit; the
    ///   `compensated` flag says whether the cost was credited back
    /// * `ShopError::Timeout` / `ShopError::Unavailable` - a collaborator did not
    ///   answer before anything was mutated
    pub async fn purchase(
        &self,
        username: &str,
        name: &str,
        quantity: Quantity,
    ) -> Result<PurchaseReceipt, ShopError> {
        if quantity == 0 {
            return Err(ShopError::invalid_quantity(quantity));
        }

        let _guard = self.locks.acquire(name).await;

        let good = self
            .call(INVENTORY, "lookup", self.inventory.lookup(name))
            .await?
            .ok_or_else(|| ShopError::good_not_found(name))?;
        let user = self
            .call(ACCOUNT, "lookup", self.accounts.lookup(username))
            .await?
            .ok_or_else(|| ShopError::user_not_found(username))?;

        let cost = good
            .price
            .checked_mul(Decimal::from(quantity))
            .ok_or_else(|| ShopError::arithmetic_overflow("purchase", name))?;

        if user.wallet < cost {
            tracing::warn!(%username, %name, %cost, wallet = %user.wallet, "purchase rejected: funds");
            return Err(ShopError::insufficient_funds(username, user.wallet, cost));
        }
        if good.count == 0 {
            tracing::warn!(%username, %name, "purchase rejected: out of stock");
            return Err(ShopError::out_of_stock(name));
        }
        if good.count < quantity {
            tracing::warn!(%username, %name, quantity, available = good.count, "purchase rejected: stock");
            return Err(ShopError::insufficient_stock(name, good.count, quantity));
        }

        let debited = match self
            .call(ACCOUNT, "debit", self.accounts.debit(username, cost))
            .await
        {
            Ok(user) => user,
            Err(timeout @ ShopError::Timeout { .. }) => {
                // The debit may still land after we gave up on it.
                let wallet = self
                    .call(ACCOUNT, "lookup", self.accounts.lookup(username))
                    .await
                    .ok()
                    .flatten()
                    .map(|u| u.wallet);
                tracing::warn!(
                    %username,
                    %name,
                    %cost,
                    wallet_before = %user.wallet,
                    wallet_after = ?wallet,
                    "debit timed out, outcome unknown"
                );
                return Err(timeout);
            }
            Err(e) => return Err(e),
        };

        let reserved = match self
            .call(INVENTORY, "reserve", self.inventory.reserve(name, quantity))
            .await
        {
            Ok(good) => good,
            Err(reason) => return Err(self.compensate(username, cost, reason).await),
        };

        self.store.history().append(PurchaseRecord {
            buyer: username.to_string(),
            good: name.to_string(),
            quantity,
        });

        tracing::info!(%username, %name, quantity, %cost, "purchase completed");

        Ok(PurchaseReceipt {
            buyer: username.to_string(),
            good: name.to_string(),
            quantity,
            cost,
            wallet: debited.wallet,
            remaining: reserved.count,
        })
    }

    /// Total quantity bought per good by `username`
    ///
    /// Unknown buyers have an empty history.
    pub fn get_history(&self, username: &str) -> PurchaseHistory {
        let mut history = PurchaseHistory::new();
        for record in self.store.history().select_by_buyer(username) {
            *history.entry(record.good).or_insert(0) += u64::from(record.quantity);
        }
        history
    }

    /// Name and price of every good, in insertion order
    pub async fn prices(&self) -> Result<Vec<PriceEntry>, ShopError> {
        let goods = self.call(INVENTORY, "list", self.inventory.list()).await?;
        Ok(goods.iter().map(PriceEntry::from).collect())
    }

    /// Look up one good through the inventory service
    pub async fn good(&self, name: &str) -> Result<Option<Good>, ShopError> {
        self.call(INVENTORY, "lookup", self.inventory.lookup(name))
            .await
    }

    async fn call<T, F>(
        &self,
        service: &str,
        operation: &str,
        call: F,
    ) -> Result<T, ShopError>
    where
        F: Future<Output = Result<T, ShopError>>,
    {
        match tokio::time::timeout(self.call_timeout, call).await {
            Ok(result) => result,
            Err(_) => {
                let after_ms = u64::try_from(self.call_timeout.as_millis()).unwrap_or(u64::MAX);
                tracing::warn!(service, operation, after_ms, "collaborator call timed out");
                Err(ShopError::timeout(service, operation, after_ms))
            }
        }
    }

    /// Credit the cost back after a failed reservation
    async fn compensate(&self, username: &str, cost: Decimal, reason: ShopError) -> ShopError {
        let compensated = match self
            .call(ACCOUNT, "credit", self.accounts.credit(username, cost))
            .await
        {
            Ok(_) => true,
            Err(e) => {
                tracing::error!(
                    %username,
                    %cost,
                    reason = %reason,
                    error = %e,
                    "compensating credit failed, wallet left debited"
                );
                false
            }
        };

        tracing::warn!(%username, %cost, reason = %reason, compensated, "purchase rolled back");

        ShopError::PartialFailure {
            step: SagaStep::Reserve,
            reason: reason.to_string(),
            compensated,
        }
    }
}

impl std::fmt::Debug for SalesCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SalesCoordinator")
            .field("call_timeout", &self.call_timeout)
            .field("locked_goods", &self.locks.len())
            .finish_non_exhaustive()
    }
}
