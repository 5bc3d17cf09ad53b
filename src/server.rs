//! Process wiring: build the router for a role and serve it
//!
//! ```text
//! account    AccountService   ─┐
//! inventory  InventoryService ─┼─ Store (users, goods, history)
//! sales      SalesCoordinator ─┘   └─ RemoteAccounts / RemoteInventory over HTTP
//! all        the three above, local, merged on one listener
//! ```

use crate::client::{RemoteAccounts, RemoteInventory};
use crate::config::{Role, ServiceConfig};
use crate::core::{AccountApi, AccountService, InventoryApi, InventoryService, SalesCoordinator, Store};
use crate::http::account::{self, AccountState};
use crate::http::inventory::{self, InventoryState};
use crate::http::sales::{self, SalesState};
use crate::types::ShopError;
use axum::http::{header, Method};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use thiserror::Error;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Errors that stop a service process
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        source: std::io::Error,
    },

    #[error("Server error: {0}")]
    Serve(std::io::Error),

    #[error(transparent)]
    Shop(#[from] ShopError),
}

/// Open the store the configuration asks for
///
/// With a data directory, only the record sets the role owns are persisted.
pub fn open_store(config: &ServiceConfig) -> Result<Store, ShopError> {
    match &config.data_dir {
        Some(dir) => Store::open_sets(dir, config.role.record_sets()),
        None => Ok(Store::in_memory()),
    }
}

/// Build the complete router for `config.role` over `store`
///
/// A stand-alone sales process reaches the account and inventory services
/// over HTTP and keeps only the purchase history in `store`.
pub fn build_router(config: &ServiceConfig, store: Arc<Store>) -> Result<Router, ShopError> {
    let options = config.http;

    let app = match config.role {
        Role::Account => account::router(AccountState {
            accounts: Arc::new(AccountService::new(store)),
            options,
        }),
        Role::Inventory => inventory::router(InventoryState {
            inventory: Arc::new(InventoryService::new(store)),
            options,
        }),
        Role::Sales => {
            // The coordinator's own bound fires before the HTTP client gives up.
            let transport_timeout = config.call_timeout.saturating_mul(2);
            let accounts: Arc<dyn AccountApi> =
                Arc::new(RemoteAccounts::new(&config.account_url, transport_timeout)?);
            let inventory: Arc<dyn InventoryApi> =
                Arc::new(RemoteInventory::new(&config.inventory_url, transport_timeout)?);
            let sales = SalesCoordinator::new(accounts, inventory, store, config.call_timeout);
            sales::router(SalesState { sales, options }, true)
        }
        Role::All => {
            let accounts = Arc::new(AccountService::new(Arc::clone(&store)));
            let inventory = Arc::new(InventoryService::new(Arc::clone(&store)));
            let sales = SalesCoordinator::new(
                accounts.clone(),
                inventory.clone(),
                store,
                config.call_timeout,
            );
            account::router(AccountState { accounts, options })
                .merge(inventory::router(InventoryState { inventory, options }))
                .merge(sales::router(SalesState { sales, options }, false))
        }
    };

    let role = config.role;
    Ok(app
        .route("/health", get(move || health(role)))
        .layer(TraceLayer::new_for_http())
        .layer(cors()))
}

async fn health(role: Role) -> Json<Value> {
    Json(json!({ "ok": true, "role": role.as_str() }))
}

fn cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
}

/// Run the process described by `config` until ctrl-c
///
/// Snapshots are flushed once more after the listener stops.
pub async fn run(config: ServiceConfig) -> Result<(), ServerError> {
    let store = Arc::new(open_store(&config)?);
    let app = build_router(&config, Arc::clone(&store))?;

    let listener = TcpListener::bind(config.bind)
        .await
        .map_err(|source| ServerError::Bind {
            addr: config.bind,
            source,
        })?;

    tracing::info!(
        role = %config.role,
        addr = %config.bind,
        data_dir = ?config.data_dir,
        legacy_status = config.http.legacy_status,
        "service listening"
    );

    serve(listener, app, shutdown_signal()).await?;

    store.flush_all()?;
    tracing::info!(role = %config.role, "service stopped");
    Ok(())
}

/// Serve `app` on an already bound listener until `shutdown` completes
pub async fn serve<F>(listener: TcpListener, app: Router, shutdown: F) -> Result<(), ServerError>
where
    F: Future<Output = ()> + Send + 'static,
{
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(ServerError::Serve)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown requested");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Role;
    use tempfile::TempDir;

    #[test]
    fn test_open_store_in_memory_by_default() {
        let config = ServiceConfig::for_role(Role::All);
        let store = open_store(&config).unwrap();
        assert!(store.data_dir().is_none());
    }

    #[test]
    fn test_open_store_from_data_dir() {
        let dir = TempDir::new().unwrap();
        let mut config = ServiceConfig::for_role(Role::Account);
        config.data_dir = Some(dir.path().to_path_buf());

        let store = open_store(&config).unwrap();

        assert_eq!(store.data_dir(), Some(dir.path()));
    }

    #[test]
    fn test_roles_sharing_a_data_dir_survive_restart() {
        let dir = TempDir::new().unwrap();
        let store_for = |role| {
            let mut config = ServiceConfig::for_role(role);
            config.data_dir = Some(dir.path().to_path_buf());
            open_store(&config).unwrap()
        };

        let accounts = store_for(Role::Account);
        let inventory = store_for(Role::Inventory);
        let sales = store_for(Role::Sales);

        InventoryService::new(Arc::new(inventory))
            .add(crate::types::GoodInput {
                name: "tuna".to_string(),
                category: "food".to_string(),
                price: rust_decimal::Decimal::new(30, 1),
                description: String::new(),
                count: 54,
            })
            .unwrap();
        AccountService::new(Arc::new(accounts))
            .register(crate::types::UserProfile {
                fullname: "John Doe".to_string(),
                username: "john".to_string(),
                password: "1234".to_string(),
                age: "54".to_string(),
                address: "Beirut".to_string(),
                gender: "male".to_string(),
                marital_status: "married".to_string(),
            })
            .unwrap();
        sales.history().append(crate::types::PurchaseRecord {
            buyer: "john".to_string(),
            good: "tuna".to_string(),
            quantity: 1,
        });

        // Sales stops last and must not rewrite the other services' files.
        sales.flush_all().unwrap();

        let restarted = store_for(Role::All);
        assert_eq!(restarted.goods().len(), 1);
        assert_eq!(restarted.users().len(), 1);
        assert_eq!(restarted.history().len(), 1);
    }

    #[rstest::rstest]
    #[case::account(Role::Account)]
    #[case::inventory(Role::Inventory)]
    #[case::sales(Role::Sales)]
    #[case::all(Role::All)]
    fn test_every_role_builds(#[case] role: Role) {
        let config = ServiceConfig::for_role(role);
        assert!(build_router(&config, Arc::new(Store::in_memory())).is_ok());
    }

    #[test]
    fn test_sales_rejects_bad_collaborator_url() {
        let mut config = ServiceConfig::for_role(Role::Sales);
        config.account_url = "nowhere".to_string();

        let result = build_router(&config, Arc::new(Store::in_memory()));

        assert!(matches!(result, Err(ShopError::Unavailable { .. })));
    }
}
