//! Keyed record sets for the store
//!
//! This module provides `Table`, a concurrent map from natural key to record that
//! implements the store primitives every service builds on: select-by-key,
//! select-all, insert, update-by-key and delete-by-key.
//!
//! # Design
//!
//! Rows live in a `DashMap`, so writes to the same key are serialized by the
//! shard lock while writes to different keys proceed in parallel. There is no
//! lock spanning more than one row.
//!
//! `update` hands the caller a draft copy of the row while holding the row's
//! write lock and commits it only if the closure succeeds. A mutator can check an
//! invariant and apply the change in one step, and a rejected change leaves the
//! row untouched.
//!
//! Every row carries an insertion sequence number so listings and snapshots come
//! out in insertion order.
//!
//! # Durability
//!
//! A table opened from a snapshot file rewrites that file after every successful
//! write. The in-memory rows are authoritative: a failed rewrite is logged and
//! picked up by the next write or by `flush`.

use crate::io::{read_records, write_records};
use crate::types::ShopError;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

/// A record that can live in a [`Table`]
pub trait Record: Clone + Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Name of the record set, also the snapshot file stem
    const SET: &'static str;

    /// Natural key of this record
    fn key(&self) -> &str;

    /// Error reported when a key is absent
    fn missing(key: &str) -> ShopError;

    /// Error reported when inserting a key that already exists
    fn duplicate(key: &str) -> ShopError;
}

#[derive(Debug)]
struct Row<R> {
    seq: u64,
    record: R,
}

#[derive(Debug)]
struct SnapshotFile {
    path: PathBuf,
    write_lock: Mutex<()>,
}

/// Concurrent keyed record set
#[derive(Debug)]
pub struct Table<R: Record> {
    rows: DashMap<String, Row<R>>,
    next_seq: AtomicU64,
    snapshot: Option<SnapshotFile>,
}

impl<R: Record> Table<R> {
    /// Create an empty, memory-only table
    pub fn new() -> Self {
        Self {
            rows: DashMap::new(),
            next_seq: AtomicU64::new(0),
            snapshot: None,
        }
    }

    /// Open a table backed by a snapshot file
    ///
    /// Loads every row from `path` (a missing file is an empty table). Later
    /// writes keep the file up to date.
    ///
    /// # Errors
    ///
    /// Returns `ShopError::Storage` if the snapshot exists but cannot be decoded.
    pub fn open(path: &Path) -> Result<Self, ShopError> {
        let records: Vec<R> = read_records(path)?;
        let mut table = Self::new();
        table.snapshot = Some(SnapshotFile {
            path: path.to_path_buf(),
            write_lock: Mutex::new(()),
        });

        for record in records {
            let key = record.key().to_string();
            let seq = table.next_seq.fetch_add(1, Ordering::Relaxed);
            if table.rows.insert(key.clone(), Row { seq, record }).is_some() {
                tracing::warn!(set = R::SET, %key, "duplicate key in snapshot, keeping the last row");
            }
        }

        Ok(table)
    }

    /// Exact-match read
    ///
    /// Returns a snapshot of the row; `None` when the key is absent.
    pub fn select(&self, key: &str) -> Option<R> {
        self.rows.get(key).map(|row| row.record.clone())
    }

    /// Every row in insertion order
    pub fn select_all(&self) -> Vec<R> {
        let mut rows: Vec<(u64, R)> = self
            .rows
            .iter()
            .map(|entry| (entry.seq, entry.record.clone()))
            .collect();
        rows.sort_by_key(|(seq, _)| *seq);
        rows.into_iter().map(|(_, record)| record).collect()
    }

    /// Insert a new row
    ///
    /// The existence check and the insert happen under the same shard lock.
    ///
    /// # Errors
    ///
    /// Returns `R::duplicate` if the key is already present.
    pub fn insert(&self, record: R) -> Result<R, ShopError> {
        match self.rows.entry(record.key().to_string()) {
            Entry::Occupied(_) => return Err(R::duplicate(record.key())),
            Entry::Vacant(slot) => {
                let seq = self.next_seq.fetch_add(1, Ordering::Relaxed);
                slot.insert(Row {
                    seq,
                    record: record.clone(),
                });
            }
        }

        self.persist();
        Ok(record)
    }

    /// Update a row in place
    ///
    /// The closure receives a draft copy of the row while the row is locked. The
    /// draft replaces the row only if the closure returns `Ok`, so a rejected
    /// update has no effect. The closure must not change the record's key.
    ///
    /// # Errors
    ///
    /// Returns `R::missing` if the key is absent, or whatever the closure returns.
    pub fn update<T, F>(&self, key: &str, f: F) -> Result<T, ShopError>
    where
        F: FnOnce(&mut R) -> Result<T, ShopError>,
    {
        let outcome = {
            let mut row = self.rows.get_mut(key).ok_or_else(|| R::missing(key))?;
            let mut draft = row.record.clone();
            let outcome = f(&mut draft)?;
            if draft.key() != key {
                return Err(ShopError::bad_request(format!(
                    "{} key cannot change from '{}' to '{}'",
                    R::SET,
                    key,
                    draft.key()
                )));
            }
            row.record = draft;
            outcome
        };

        self.persist();
        Ok(outcome)
    }

    /// Remove a row
    ///
    /// # Errors
    ///
    /// Returns `R::missing` if the key is absent.
    pub fn delete(&self, key: &str) -> Result<R, ShopError> {
        let (_, row) = self.rows.remove(key).ok_or_else(|| R::missing(key))?;
        self.persist();
        Ok(row.record)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Write the snapshot file now
    ///
    /// No-op for memory-only tables.
    pub fn flush(&self) -> Result<(), ShopError> {
        match &self.snapshot {
            Some(snapshot) => self.write_snapshot(snapshot),
            None => Ok(()),
        }
    }

    fn persist(&self) {
        if let Some(snapshot) = &self.snapshot {
            if let Err(error) = self.write_snapshot(snapshot) {
                tracing::error!(
                    set = R::SET,
                    path = %snapshot.path.display(),
                    %error,
                    "failed to persist snapshot, will retry on next write"
                );
            }
        }
    }

    fn write_snapshot(&self, snapshot: &SnapshotFile) -> Result<(), ShopError> {
        // Concurrent writers take turns; whoever writes last sees every committed row.
        let _guard = snapshot
            .write_lock
            .lock()
            .map_err(|_| ShopError::Storage {
                message: format!("{} snapshot lock poisoned", R::SET),
            })?;
        write_records(&snapshot.path, &self.select_all())
    }
}

impl<R: Record> Default for Table<R> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use std::sync::Arc;
    use std::thread;
    use tempfile::TempDir;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Counter {
        name: String,
        value: i64,
    }

    impl Record for Counter {
        const SET: &'static str = "counters";

        fn key(&self) -> &str {
            &self.name
        }

        fn missing(key: &str) -> ShopError {
            ShopError::good_not_found(key)
        }

        fn duplicate(key: &str) -> ShopError {
            ShopError::duplicate_good(key)
        }
    }

    fn counter(name: &str, value: i64) -> Counter {
        Counter {
            name: name.to_string(),
            value,
        }
    }

    #[test]
    fn test_select_missing_is_none() {
        let table: Table<Counter> = Table::new();
        assert_eq!(table.select("nope"), None);
        assert_eq!(table.select("nope"), None);
    }

    #[test]
    fn test_insert_then_select() {
        let table = Table::new();
        table.insert(counter("a", 1)).unwrap();
        assert_eq!(table.select("a"), Some(counter("a", 1)));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_insert_duplicate_keeps_first_row() {
        let table = Table::new();
        table.insert(counter("a", 1)).unwrap();

        let result = table.insert(counter("a", 2));

        assert_eq!(result.unwrap_err(), ShopError::duplicate_good("a"));
        assert_eq!(table.select("a"), Some(counter("a", 1)));
    }

    #[test]
    fn test_select_all_keeps_insertion_order() {
        let table = Table::new();
        for name in ["tuna", "kinder", "apple"] {
            table.insert(counter(name, 0)).unwrap();
        }

        let names: Vec<String> = table.select_all().into_iter().map(|c| c.name).collect();
        assert_eq!(names, vec!["tuna", "kinder", "apple"]);
    }

    #[test]
    fn test_update_commits_on_success() {
        let table = Table::new();
        table.insert(counter("a", 1)).unwrap();

        let value = table
            .update("a", |c| {
                c.value += 10;
                Ok(c.value)
            })
            .unwrap();

        assert_eq!(value, 11);
        assert_eq!(table.select("a"), Some(counter("a", 11)));
    }

    #[test]
    fn test_update_discards_draft_on_error() {
        let table = Table::new();
        table.insert(counter("a", 1)).unwrap();

        let result: Result<(), _> = table.update("a", |c| {
            c.value = -100;
            Err(ShopError::out_of_stock("a"))
        });

        assert_eq!(result.unwrap_err(), ShopError::out_of_stock("a"));
        assert_eq!(table.select("a"), Some(counter("a", 1)));
    }

    #[test]
    fn test_update_missing_key() {
        let table: Table<Counter> = Table::new();
        let result = table.update("a", |_| Ok(()));
        assert_eq!(result.unwrap_err(), ShopError::good_not_found("a"));
    }

    #[test]
    fn test_update_cannot_change_key() {
        let table = Table::new();
        table.insert(counter("a", 1)).unwrap();

        let result = table.update("a", |c| {
            c.name = "b".to_string();
            Ok(())
        });

        assert!(matches!(result, Err(ShopError::BadRequest { .. })));
        assert_eq!(table.select("a"), Some(counter("a", 1)));
        assert_eq!(table.select("b"), None);
    }

    #[test]
    fn test_delete() {
        let table = Table::new();
        table.insert(counter("a", 1)).unwrap();

        assert_eq!(table.delete("a").unwrap(), counter("a", 1));
        assert!(table.is_empty());
        assert_eq!(table.delete("a").unwrap_err(), ShopError::good_not_found("a"));
    }

    #[test]
    fn test_concurrent_checked_decrements_never_go_negative() {
        let table = Arc::new(Table::new());
        table.insert(counter("stock", 50)).unwrap();
        let mut handles = vec![];

        for _ in 0..8 {
            let table = Arc::clone(&table);
            handles.push(thread::spawn(move || {
                let mut successes = 0;
                for _ in 0..20 {
                    let result = table.update("stock", |c| {
                        if c.value < 1 {
                            return Err(ShopError::out_of_stock("stock"));
                        }
                        c.value -= 1;
                        Ok(())
                    });
                    if result.is_ok() {
                        successes += 1;
                    }
                }
                successes
            }));
        }

        let total: i32 = handles.into_iter().map(|h| h.join().unwrap()).sum();
        assert_eq!(total, 50);
        assert_eq!(table.select("stock").unwrap().value, 0);
    }

    #[test]
    fn test_snapshot_survives_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("counters.csv");

        {
            let table = Table::open(&path).unwrap();
            table.insert(counter("b", 2)).unwrap();
            table.insert(counter("a", 1)).unwrap();
            table
                .update("b", |c| {
                    c.value = 20;
                    Ok(())
                })
                .unwrap();
        }

        let reopened: Table<Counter> = Table::open(&path).unwrap();
        assert_eq!(reopened.select_all(), vec![counter("b", 20), counter("a", 1)]);
    }

    #[test]
    fn test_snapshot_reflects_delete() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("counters.csv");

        let table = Table::open(&path).unwrap();
        table.insert(counter("a", 1)).unwrap();
        table.delete("a").unwrap();

        let reopened: Table<Counter> = Table::open(&path).unwrap();
        assert!(reopened.is_empty());
    }
}
