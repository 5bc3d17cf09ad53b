//! Inventory service over HTTP

use super::ServiceClient;
use crate::core::InventoryApi;
use crate::http::MaybeRecord;
use crate::types::{Good, GoodInput, Quantity, ShopError};
use async_trait::async_trait;
use std::time::Duration;

/// Inventory service running in another process
#[derive(Debug, Clone)]
pub struct RemoteInventory {
    client: ServiceClient,
}

impl RemoteInventory {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ShopError> {
        Ok(Self {
            client: ServiceClient::new("inventory", base_url, timeout)?,
        })
    }
}

#[async_trait]
impl InventoryApi for RemoteInventory {
    async fn add(&self, good: GoodInput) -> Result<Good, ShopError> {
        let request = self
            .client
            .http()
            .post(self.client.url(&["api", "goods", "add"]))
            .json(&good);
        self.client.record(request).await
    }

    async fn lookup(&self, name: &str) -> Result<Option<Good>, ShopError> {
        let request = self
            .client
            .http()
            .get(self.client.url(&["api", "goods", name]));
        let MaybeRecord(good) = self.client.value(request).await?;
        Ok(good)
    }

    async fn update(&self, good: GoodInput) -> Result<Good, ShopError> {
        let request = self
            .client
            .http()
            .put(self.client.url(&["api", "goods", "update"]))
            .json(&good);
        self.client.record(request).await
    }

    async fn reserve(&self, name: &str, quantity: Quantity) -> Result<Good, ShopError> {
        let request = self
            .client
            .http()
            .put(self.client.url(&["api", "goods", "deduce", name]))
            .json(&quantity);
        self.client.record(request).await
    }

    async fn list(&self) -> Result<Vec<Good>, ShopError> {
        let request = self.client.http().get(self.client.url(&["api", "goods"]));
        self.client.value(request).await
    }
}
