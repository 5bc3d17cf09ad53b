//! Inventory service: goods and stock counts
//!
//! `InventoryService` owns every good row. Stock only goes down through
//! `reserve`, whose check and decrement are one row update.

use super::store::Store;
use super::traits::InventoryApi;
use crate::types::{Good, GoodInput, Quantity, ShopError};
use async_trait::async_trait;
use std::sync::Arc;

/// Local inventory service over the shared store
#[derive(Debug, Clone)]
pub struct InventoryService {
    store: Arc<Store>,
}

impl InventoryService {
    pub fn new(store: Arc<Store>) -> Self {
        Self { store }
    }

    /// Register a new good
    ///
    /// # Errors
    ///
    /// * `ShopError::InvalidCategory` - category outside the fixed set
    /// * `ShopError::InvalidPrice` - negative price
    /// * `ShopError::DuplicateGood` - a good with this name exists
    pub fn add(&self, input: GoodInput) -> Result<Good, ShopError> {
        let result = Good::try_from(input).and_then(|good| self.store.goods().insert(good));
        match result {
            Ok(good) => {
                tracing::info!(name = %good.name, count = good.count, "good added");
                Ok(good)
            }
            Err(e) => {
                tracing::warn!(error = %e, "good rejected");
                Err(e)
            }
        }
    }

    pub fn lookup(&self, name: &str) -> Option<Good> {
        tracing::debug!(%name, "good lookup");
        self.store.goods().select(name)
    }

    /// Overwrite an existing good, count included
    pub fn update(&self, input: GoodInput) -> Result<Good, ShopError> {
        let good = Good::try_from(input)?;
        let name = good.name.clone();
        let stored = self.store.goods().update(&name, |row| {
            *row = good;
            Ok(row.clone())
        })?;
        tracing::info!(%name, count = stored.count, "good updated");
        Ok(stored)
    }

    /// Take `quantity` units out of stock
    ///
    /// # Errors
    ///
    /// * `ShopError::NotFound` - no such good
    /// * `ShopError::InvalidQuantity` - `quantity` is zero
    /// * `ShopError::OutOfStock` - nothing left
    /// * `ShopError::InsufficientStock` - fewer units left than requested
    pub fn reserve(&self, name: &str, quantity: Quantity) -> Result<Good, ShopError> {
        let result = self.store.goods().update(name, |good| {
            if quantity == 0 {
                return Err(ShopError::invalid_quantity(quantity));
            }
            if good.count == 0 {
                return Err(ShopError::out_of_stock(name));
            }
            if good.count < quantity {
                return Err(ShopError::insufficient_stock(name, good.count, quantity));
            }
            good.count -= quantity;
            Ok(good.clone())
        });

        match result {
            Ok(good) => {
                tracing::info!(%name, quantity, remaining = good.count, "stock reserved");
                Ok(good)
            }
            Err(e) => {
                tracing::warn!(%name, quantity, error = %e, "reservation rejected");
                Err(e)
            }
        }
    }

    /// Every good in insertion order
    pub fn list(&self) -> Vec<Good> {
        self.store.goods().select_all()
    }
}

#[async_trait]
impl InventoryApi for InventoryService {
    async fn add(&self, good: GoodInput) -> Result<Good, ShopError> {
        InventoryService::add(self, good)
    }

    async fn lookup(&self, name: &str) -> Result<Option<Good>, ShopError> {
        Ok(InventoryService::lookup(self, name))
    }

    async fn update(&self, good: GoodInput) -> Result<Good, ShopError> {
        InventoryService::update(self, good)
    }

    async fn reserve(&self, name: &str, quantity: Quantity) -> Result<Good, ShopError> {
        InventoryService::reserve(self, name, quantity)
    }

    async fn list(&self) -> Result<Vec<Good>, ShopError> {
        Ok(InventoryService::list(self))
    }
}
