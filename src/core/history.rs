//! Append-only purchase log
//!
//! Records are never mutated or deleted. Each append gets the next sequence
//! number, which is the only identity a record has.

use crate::io::{append_record, read_records, write_records};
use crate::types::{PurchaseRecord, ShopError};
use dashmap::DashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Mutex;

#[derive(Debug)]
struct LogFile {
    path: PathBuf,
    write_lock: Mutex<()>,
    /// Set when an append failed; the next write rewrites the whole file
    stale: AtomicBool,
}

/// Purchase history store
#[derive(Debug, Default)]
pub struct HistoryLog {
    entries: DashMap<u64, PurchaseRecord>,
    next_seq: AtomicU64,
    file: Option<LogFile>,
}

impl HistoryLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a log backed by an append-only CSV file
    pub fn open(path: &Path) -> Result<Self, ShopError> {
        let log = Self {
            file: Some(LogFile {
                path: path.to_path_buf(),
                write_lock: Mutex::new(()),
                stale: AtomicBool::new(false),
            }),
            ..Self::default()
        };

        for record in read_records::<PurchaseRecord>(path)? {
            let seq = log.next_seq.fetch_add(1, Ordering::Relaxed);
            log.entries.insert(seq, record);
        }

        Ok(log)
    }

    /// Append a record, returning its sequence number
    ///
    /// Never fails: the in-memory log is authoritative and a failed file write
    /// is retried on the next append or flush.
    pub fn append(&self, record: PurchaseRecord) -> u64 {
        let seq = self.next_seq.fetch_add(1, Ordering::Relaxed);
        self.entries.insert(seq, record.clone());

        if let Some(file) = &self.file {
            if let Err(error) = self.write_through(file, &record) {
                file.stale.store(true, Ordering::Release);
                tracing::error!(
                    path = %file.path.display(),
                    %error,
                    "failed to append purchase record, will rewrite on next write"
                );
            }
        }

        seq
    }

    /// Every record of one buyer, oldest first
    pub fn select_by_buyer(&self, buyer: &str) -> Vec<PurchaseRecord> {
        let mut records: Vec<(u64, PurchaseRecord)> = self
            .entries
            .iter()
            .filter(|entry| entry.buyer == buyer)
            .map(|entry| (*entry.key(), entry.value().clone()))
            .collect();
        records.sort_by_key(|(seq, _)| *seq);
        records.into_iter().map(|(_, record)| record).collect()
    }

    /// Every record, oldest first
    pub fn select_all(&self) -> Vec<PurchaseRecord> {
        let mut records: Vec<(u64, PurchaseRecord)> = self
            .entries
            .iter()
            .map(|entry| (*entry.key(), entry.value().clone()))
            .collect();
        records.sort_by_key(|(seq, _)| *seq);
        records.into_iter().map(|(_, record)| record).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Rewrite the log file from memory
    pub fn flush(&self) -> Result<(), ShopError> {
        let Some(file) = &self.file else {
            return Ok(());
        };
        let _guard = lock(file)?;
        write_records(&file.path, &self.select_all())?;
        file.stale.store(false, Ordering::Release);
        Ok(())
    }

    fn write_through(&self, file: &LogFile, record: &PurchaseRecord) -> Result<(), ShopError> {
        let _guard = lock(file)?;
        if file.stale.load(Ordering::Acquire) {
            write_records(&file.path, &self.select_all())?;
            file.stale.store(false, Ordering::Release);
            Ok(())
        } else {
            append_record(&file.path, record)
        }
    }
}

fn lock(file: &LogFile) -> Result<std::sync::MutexGuard<'_, ()>, ShopError> {
    file.write_lock.lock().map_err(|_| ShopError::Storage {
        message: "history log lock poisoned".to_string(),
    })
}
