use crate::config::{Role, ServiceConfig, DEFAULT_ACCOUNT_URL, DEFAULT_INVENTORY_URL};
use crate::http::HttpOptions;
use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;

/// Run one or all of the storefront services
#[derive(Parser, Debug)]
#[command(name = "storefront")]
#[command(about = "Storefront account, inventory and sales services", long_about = None)]
pub struct CliArgs {
    /// Which service this process runs
    #[arg(
        value_name = "ROLE",
        env = "STOREFRONT_ROLE",
        help = "Service to run: 'account', 'inventory', 'sales' or 'all'"
    )]
    pub role: Role,

    /// Address to listen on
    #[arg(
        long = "bind",
        value_name = "ADDR",
        env = "STOREFRONT_BIND",
        help = "Listen address (default: 0.0.0.0 on 3000/7000/8000/8080 by role)"
    )]
    pub bind: Option<SocketAddr>,

    /// Directory for the CSV snapshots
    #[arg(
        long = "data-dir",
        value_name = "DIR",
        env = "STOREFRONT_DATA_DIR",
        help = "Directory for users.csv, goods.csv and history.csv (default: in memory)"
    )]
    pub data_dir: Option<PathBuf>,

    /// Account service base URL (sales role only)
    #[arg(
        long = "account-url",
        value_name = "URL",
        env = "STOREFRONT_ACCOUNT_URL",
        default_value = DEFAULT_ACCOUNT_URL
    )]
    pub account_url: String,

    /// Inventory service base URL (sales role only)
    #[arg(
        long = "inventory-url",
        value_name = "URL",
        env = "STOREFRONT_INVENTORY_URL",
        default_value = DEFAULT_INVENTORY_URL
    )]
    pub inventory_url: String,

    /// Bound on every call the sales coordinator makes
    #[arg(
        long = "call-timeout-ms",
        value_name = "MS",
        env = "STOREFRONT_CALL_TIMEOUT_MS",
        help = "Timeout for each account/inventory call in milliseconds (default: 2000)"
    )]
    pub call_timeout_ms: Option<u64>,

    /// Tokio worker threads
    #[arg(
        long = "workers",
        value_name = "COUNT",
        env = "STOREFRONT_WORKERS",
        help = "Number of runtime worker threads (default: CPU cores)"
    )]
    pub workers: Option<usize>,

    /// Always answer HTTP 200 and report failures in the body only
    #[arg(long = "legacy-status", env = "STOREFRONT_LEGACY_STATUS")]
    pub legacy_status: bool,

    /// Log filter directives
    #[arg(
        long = "log-filter",
        value_name = "FILTER",
        env = "STOREFRONT_LOG",
        help = "tracing filter, e.g. 'debug' or 'info,tower_http=debug' (default: RUST_LOG or info)"
    )]
    pub log_filter: Option<String>,
}

impl CliArgs {
    /// Create a ServiceConfig from CLI arguments
    ///
    /// Unset values fall back to the role's defaults. Zero timeouts and worker
    /// counts are replaced by the defaults with a warning.
    pub fn to_service_config(&self) -> ServiceConfig {
        let mut config = ServiceConfig::for_role(self.role);

        if let Some(bind) = self.bind {
            config.bind = bind;
        }
        config.data_dir = self.data_dir.clone();
        config.account_url = self.account_url.clone();
        config.inventory_url = self.inventory_url.clone();
        config.http = HttpOptions {
            legacy_status: self.legacy_status,
        };

        if let Some(ms) = self.call_timeout_ms {
            config = config.with_call_timeout_ms(ms);
        }
        if let Some(workers) = self.workers {
            config = config.with_workers(workers);
        }

        config
    }
}
