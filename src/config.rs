//! Process configuration
//!
//! `ServiceConfig` is the validated form of the command line: which services
//! this process runs, where it listens, where the store lives and how the sales
//! coordinator reaches its collaborators.

use crate::core::RecordSets;
use crate::http::HttpOptions;
use clap::ValueEnum;
use std::fmt;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_CALL_TIMEOUT_MS: u64 = 2000;
pub const DEFAULT_ACCOUNT_URL: &str = "http://127.0.0.1:3000";
pub const DEFAULT_INVENTORY_URL: &str = "http://127.0.0.1:7000";

/// Which services a process runs
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Role {
    Account,
    Inventory,
    Sales,
    /// All three services on one listener over one shared store
    All,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Account => "account",
            Role::Inventory => "inventory",
            Role::Sales => "sales",
            Role::All => "all",
        }
    }

    /// Port the legacy deployment used for this service
    pub fn default_port(&self) -> u16 {
        match self {
            Role::Account => 3000,
            Role::Inventory => 7000,
            Role::Sales => 8000,
            Role::All => 8080,
        }
    }

    /// Record sets this role writes to a shared data directory
    pub fn record_sets(&self) -> RecordSets {
        match self {
            Role::Account => RecordSets::USERS,
            Role::Inventory => RecordSets::GOODS,
            Role::Sales => RecordSets::HISTORY,
            Role::All => RecordSets::ALL,
        }
    }

    pub fn default_bind(&self) -> SocketAddr {
        SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), self.default_port())
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validated process configuration
#[derive(Clone, Debug)]
pub struct ServiceConfig {
    pub role: Role,
    pub bind: SocketAddr,

    /// Directory holding the CSV snapshots; `None` keeps everything in memory
    pub data_dir: Option<PathBuf>,

    /// Account service base URL, used by a stand-alone sales process
    pub account_url: String,

    /// Inventory service base URL, used by a stand-alone sales process
    pub inventory_url: String,

    /// Bound on every call the sales coordinator makes
    pub call_timeout: Duration,

    /// Tokio worker threads
    pub workers: usize,

    pub http: HttpOptions,
}

impl ServiceConfig {
    /// Configuration with every default for `role`
    pub fn for_role(role: Role) -> Self {
        Self {
            role,
            bind: role.default_bind(),
            data_dir: None,
            account_url: DEFAULT_ACCOUNT_URL.to_string(),
            inventory_url: DEFAULT_INVENTORY_URL.to_string(),
            call_timeout: Duration::from_millis(DEFAULT_CALL_TIMEOUT_MS),
            workers: num_cpus::get(),
            http: HttpOptions::default(),
        }
    }

    /// Set the call timeout; zero falls back to the default with a warning
    pub fn with_call_timeout_ms(mut self, call_timeout_ms: u64) -> Self {
        self.call_timeout = if call_timeout_ms == 0 {
            tracing::warn!(
                "Invalid call_timeout_ms ({}), using default ({})",
                call_timeout_ms,
                DEFAULT_CALL_TIMEOUT_MS
            );
            Duration::from_millis(DEFAULT_CALL_TIMEOUT_MS)
        } else {
            Duration::from_millis(call_timeout_ms)
        };
        self
    }

    /// Set the worker count; zero falls back to the default with a warning
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = if workers == 0 {
            let default = num_cpus::get();
            tracing::warn!("Invalid workers ({}), using default ({})", workers, default);
            default
        } else {
            workers
        };
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::account(Role::Account, 3000)]
    #[case::inventory(Role::Inventory, 7000)]
    #[case::sales(Role::Sales, 8000)]
    #[case::all(Role::All, 8080)]
    fn test_default_bind(#[case] role: Role, #[case] port: u16) {
        let config = ServiceConfig::for_role(role);
        assert_eq!(config.bind, format!("0.0.0.0:{port}").parse().unwrap());
        assert!(config.data_dir.is_none());
        assert!(!config.http.legacy_status);
    }

    #[rstest]
    #[case::custom(500, 500)]
    #[case::zero_falls_back(0, DEFAULT_CALL_TIMEOUT_MS)]
    fn test_call_timeout(#[case] given: u64, #[case] expected: u64) {
        let config = ServiceConfig::for_role(Role::Sales).with_call_timeout_ms(given);
        assert_eq!(config.call_timeout, Duration::from_millis(expected));
    }

    #[rstest]
    #[case::custom(3, 3)]
    #[case::zero_falls_back(0, num_cpus::get())]
    fn test_workers(#[case] given: usize, #[case] expected: usize) {
        let config = ServiceConfig::for_role(Role::All).with_workers(given);
        assert_eq!(config.workers, expected);
    }
}
