//! Account service over HTTP

use super::ServiceClient;
use crate::core::AccountApi;
use crate::http::MaybeRecord;
use crate::types::{ShopError, User, UserProfile};
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use rust_decimal::Decimal;
use serde_json::Value;
use std::time::Duration;

/// Account service running in another process
#[derive(Debug, Clone)]
pub struct RemoteAccounts {
    client: ServiceClient,
}

impl RemoteAccounts {
    /// Client for the account service at `base_url`
    ///
    /// `timeout` bounds each HTTP request end to end.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ShopError> {
        Ok(Self {
            client: ServiceClient::new("account", base_url, timeout)?,
        })
    }

    async fn put_amount(&self, path: &str, username: &str, amount: Decimal) -> Result<User, ShopError> {
        // Amounts travel as bare JSON numbers; Decimal's Display is valid JSON for that.
        let request = self
            .client
            .http()
            .put(self.client.url(&["api", "users", path, username]))
            .header(CONTENT_TYPE, "application/json")
            .body(amount.to_string());
        self.client.record(request).await
    }
}

#[async_trait]
impl AccountApi for RemoteAccounts {
    async fn register(&self, profile: UserProfile) -> Result<User, ShopError> {
        let request = self
            .client
            .http()
            .post(self.client.url(&["api", "users", "add"]))
            .json(&profile);
        self.client.record(request).await
    }

    async fn lookup(&self, username: &str) -> Result<Option<User>, ShopError> {
        let request = self
            .client
            .http()
            .get(self.client.url(&["api", "users", username]));
        let MaybeRecord(user) = self.client.value(request).await?;
        Ok(user)
    }

    async fn update(&self, profile: UserProfile) -> Result<User, ShopError> {
        let request = self
            .client
            .http()
            .put(self.client.url(&["api", "users", "update"]))
            .json(&profile);
        self.client.record(request).await
    }

    async fn delete(&self, username: &str) -> Result<(), ShopError> {
        let request = self
            .client
            .http()
            .delete(self.client.url(&["api", "users", "delete", username]));
        self.client.envelope::<Value>(request).await?;
        Ok(())
    }

    async fn credit(&self, username: &str, amount: Decimal) -> Result<User, ShopError> {
        self.put_amount("charge", username, amount).await
    }

    async fn debit(&self, username: &str, amount: Decimal) -> Result<User, ShopError> {
        self.put_amount("deduce", username, amount).await
    }

    async fn list(&self) -> Result<Vec<User>, ShopError> {
        let request = self.client.http().get(self.client.url(&["api", "users"]));
        self.client.value(request).await
    }
}
