//! Per-good purchase serialization
//!
//! One async mutex per good name, created lazily on first use. Purchases of the
//! same good take turns; purchases of different goods never contend.

use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// Lazily populated map of good name to mutex
#[derive(Debug, Default)]
pub struct GoodLocks {
    locks: Arc<DashMap<String, Arc<Mutex<()>>>>,
}

/// Held for the duration of one purchase
///
/// Dropping the guard releases the good. The map entry is removed when nobody
/// else holds or waits for it, so names that were only ever touched do not pile up.
#[derive(Debug)]
pub struct GoodGuard {
    name: String,
    locks: Arc<DashMap<String, Arc<Mutex<()>>>>,
    _held: OwnedMutexGuard<()>,
}

impl GoodLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait until `name` is free and take it
    pub async fn acquire(&self, name: &str) -> GoodGuard {
        let lock = self.get_lock(name);
        let held = lock.lock_owned().await;
        GoodGuard {
            name: name.to_string(),
            locks: Arc::clone(&self.locks),
            _held: held,
        }
    }

    fn get_lock(&self, name: &str) -> Arc<Mutex<()>> {
        // The shard guard is dropped before the caller awaits the mutex.
        Arc::clone(&self.locks.entry(name.to_string()).or_default())
    }

    /// Number of goods with a live mutex
    pub fn len(&self) -> usize {
        self.locks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}

impl Drop for GoodGuard {
    fn drop(&mut self) {
        // One reference in the map, one in `_held`: nobody else is waiting.
        self.locks
            .remove_if(&self.name, |_, lock| Arc::strong_count(lock) <= 2);
    }
}
