//! HTTP clients for the account and inventory services
//!
//! `RemoteAccounts` and `RemoteInventory` implement the same collaborator traits
//! as the local services, so a sales process can run against services in other
//! processes. Failures reported by the remote service come back as the same
//! `ShopError` variant; transport and decoding failures become
//! `ShopError::Unavailable`.

pub mod account;
pub mod inventory;

pub use account::RemoteAccounts;
pub use inventory::RemoteInventory;

use crate::http::Envelope;
use crate::types::ShopError;
use reqwest::{Client, RequestBuilder, Url};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;

/// Base URL plus a pooled HTTP client for one remote service
#[derive(Debug, Clone)]
pub(crate) struct ServiceClient {
    service: &'static str,
    http: Client,
    base: Url,
}

impl ServiceClient {
    pub(crate) fn new(
        service: &'static str,
        base_url: &str,
        timeout: Duration,
    ) -> Result<Self, ShopError> {
        let base = Url::parse(base_url)
            .map_err(|e| ShopError::unavailable(service, format!("invalid url '{base_url}': {e}")))?;
        if base.cannot_be_a_base() {
            return Err(ShopError::unavailable(
                service,
                format!("invalid url '{base_url}'"),
            ));
        }
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ShopError::unavailable(service, e))?;

        Ok(Self {
            service,
            http,
            base,
        })
    }

    pub(crate) fn http(&self) -> &Client {
        &self.http
    }

    /// Base URL with `segments` appended, each one percent-encoded
    pub(crate) fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    /// Send a mutating request and unwrap its envelope
    pub(crate) async fn envelope<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> Result<Option<T>, ShopError> {
        let body = self.send(request).await?;
        let envelope: Envelope<T> = serde_json::from_slice(&body)
            .map_err(|e| ShopError::unavailable(self.service, format!("bad response: {e}")))?;
        envelope.into_result()
    }

    /// Same as `envelope`, for calls that always return a record on success
    pub(crate) async fn record<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> Result<T, ShopError> {
        self.envelope(request)
            .await?
            .ok_or_else(|| ShopError::unavailable(self.service, "success without a record"))
    }

    /// Send a read and decode the bare value, or the error envelope on failure
    pub(crate) async fn value<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> Result<T, ShopError> {
        let body = self.send(request).await?;
        match serde_json::from_slice::<T>(&body) {
            Ok(value) => Ok(value),
            Err(decode_error) => match serde_json::from_slice::<Envelope<Value>>(&body) {
                Ok(Envelope {
                    error: Some(error), ..
                }) => Err(error),
                _ => Err(ShopError::unavailable(
                    self.service,
                    format!("bad response: {decode_error}"),
                )),
            },
        }
    }

    async fn send(&self, request: RequestBuilder) -> Result<Vec<u8>, ShopError> {
        let response = request
            .send()
            .await
            .map_err(|e| ShopError::unavailable(self.service, e))?;
        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| ShopError::unavailable(self.service, e))?;
        tracing::debug!(service = self.service, %status, bytes = body.len(), "remote call answered");
        Ok(body.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_encodes_segments() {
        let client =
            ServiceClient::new("account", "http://127.0.0.1:3000", Duration::from_secs(1)).unwrap();
        let url = client.url(&["api", "users", "john doe"]);
        assert_eq!(url.as_str(), "http://127.0.0.1:3000/api/users/john%20doe");
    }

    #[test]
    fn test_url_keeps_base_path() {
        let client =
            ServiceClient::new("inventory", "http://shop.local/inventory/", Duration::from_secs(1))
                .unwrap();
        let url = client.url(&["api", "goods", "a/b"]);
        assert_eq!(url.as_str(), "http://shop.local/inventory/api/goods/a%2Fb");
    }

    #[test]
    fn test_invalid_base_url() {
        let result = ServiceClient::new("account", "not a url", Duration::from_secs(1));
        assert!(matches!(result, Err(ShopError::Unavailable { .. })));
    }
}
