//! Storefront service binary
//!
//! Runs one of the storefront services, or all of them in one process.
//!
//! # Usage
//!
//! ```bash
//! # three processes, legacy ports
//! cargo run -- account --data-dir data
//! cargo run -- inventory --data-dir data
//! cargo run -- sales --data-dir data --account-url http://127.0.0.1:3000 --inventory-url http://127.0.0.1:7000
//!
//! # one process on 8080
//! cargo run -- all --data-dir data
//! ```
//!
//! # Exit Codes
//!
//! - 0: Clean shutdown on ctrl-c
//! - 1: Error (port in use, unreadable snapshot, invalid collaborator URL, etc.)

use rust_storefront::cli;
use rust_storefront::server;
use std::process;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str = "info,tower_http=info";

fn main() {
    let args = cli::parse_args();

    let filter = match &args.log_filter {
        Some(directives) => EnvFilter::new(directives),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
    };
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = args.to_service_config();

    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .worker_threads(config.workers)
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("Error: Failed to create tokio runtime: {}", e);
            process::exit(1);
        }
    };

    if let Err(e) = runtime.block_on(server::run(config)) {
        tracing::error!(error = %e, "service failed");
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}
