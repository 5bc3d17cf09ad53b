//! The shared store: users, goods and purchase history
//!
//! A `Store` is either memory-only or backed by a data directory holding one CSV
//! file per record set (`users.csv`, `goods.csv`, `history.csv`).
//!
//! Several processes may share one data directory as long as each file has a
//! single owner. A store only loads and writes the sets it owns
//! ([`RecordSets`]); the others stay empty and in memory.

use super::history::HistoryLog;
use super::table::{Record, Table};
use crate::types::{Good, ShopError, User};
use std::fs;
use std::path::{Path, PathBuf};

impl Record for User {
    const SET: &'static str = "users";

    fn key(&self) -> &str {
        &self.username
    }

    fn missing(key: &str) -> ShopError {
        ShopError::user_not_found(key)
    }

    fn duplicate(key: &str) -> ShopError {
        ShopError::username_taken(key)
    }
}

impl Record for Good {
    const SET: &'static str = "goods";

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

/// Which record sets a store loads from and writes to its data directory
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordSets {
    pub users: bool,
    pub goods: bool,
    pub history: bool,
}

impl RecordSets {
    pub const ALL: Self = Self {
        users: true,
        goods: true,
        history: true,
    };

    pub const USERS: Self = Self {
        users: true,
        goods: false,
        history: false,
    };

    pub const GOODS: Self = Self {
        users: false,
        goods: true,
        history: false,
    };

    pub const HISTORY: Self = Self {
        users: false,
        goods: false,
        history: true,
    };
}

/// Persistent keyed record sets shared by the services of one process
#[derive(Debug, Default)]
pub struct Store {
    users: Table<User>,
    goods: Table<Good>,
    history: HistoryLog,
    data_dir: Option<PathBuf>,
}

impl Store {
    /// Store that lives only as long as the process
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Open (or create) a store under `dir` owning every record set
    pub fn open(dir: &Path) -> Result<Self, ShopError> {
        Self::open_sets(dir, RecordSets::ALL)
    }

    /// Open a store under `dir` that persists only the `owned` record sets
    ///
    /// Sets not in `owned` are neither read from nor written to `dir`, so a
    /// shutdown flush cannot overwrite files another process is writing.
    ///
    /// # Errors
    ///
    /// Returns `ShopError::Storage` if the directory cannot be created or an
    /// owned snapshot cannot be decoded.
    pub fn open_sets(dir: &Path, owned: RecordSets) -> Result<Self, ShopError> {
        fs::create_dir_all(dir)?;

        let store = Self {
            users: if owned.users {
                Table::open(&snapshot_path::<User>(dir))?
            } else {
                Table::new()
            },
            goods: if owned.goods {
                Table::open(&snapshot_path::<Good>(dir))?
            } else {
                Table::new()
            },
            history: if owned.history {
                HistoryLog::open(&dir.join("history.csv"))?
            } else {
                HistoryLog::new()
            },
            data_dir: Some(dir.to_path_buf()),
        };

        tracing::info!(
            dir = %dir.display(),
            owned = ?owned,
            users = store.users.len(),
            goods = store.goods.len(),
            purchases = store.history.len(),
            "store opened"
        );

        Ok(store)
    }

    pub fn users(&self) -> &Table<User> {
        &self.users
    }

    pub fn goods(&self) -> &Table<Good> {
        &self.goods
    }

    pub fn history(&self) -> &HistoryLog {
        &self.history
    }

    pub fn data_dir(&self) -> Option<&Path> {
        self.data_dir.as_deref()
    }

    /// Write every owned record set to disk
    pub fn flush_all(&self) -> Result<(), ShopError> {
        self.users.flush()?;
        self.goods.flush()?;
        self.history.flush()
    }
}

fn snapshot_path<R: Record>(dir: &Path) -> PathBuf {
    dir.join(format!("{}.csv", R::SET))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Category, PurchaseRecord, UserProfile};
    use rust_decimal::Decimal;
    use tempfile::TempDir;

    fn john() -> User {
        User::register(UserProfile {
            fullname: "John Doe".to_string(),
            username: "john".to_string(),
            password: "1234".to_string(),
            age: "54".to_string(),
            address: "Beirut".to_string(),
            gender: "male".to_string(),
            marital_status: "married".to_string(),
        })
    }

    fn kinder() -> Good {
        Good {
            name: "kinder".to_string(),
            category: Category::Food,
            price: Decimal::new(15, 1),
            description: "Chocolate".to_string(),
            count: 10,
        }
    }

    #[test]
    fn test_in_memory_has_no_data_dir() {
        let store = Store::in_memory();
        assert!(store.data_dir().is_none());
        assert!(store.flush_all().is_ok());
    }

    #[test]
    fn test_duplicate_errors_per_record_set() {
        let store = Store::in_memory();
        store.users().insert(john()).unwrap();
        store.goods().insert(kinder()).unwrap();

        assert_eq!(
            store.users().insert(john()).unwrap_err(),
            ShopError::username_taken("john")
        );
        assert_eq!(
            store.goods().insert(kinder()).unwrap_err(),
            ShopError::duplicate_good("kinder")
        );
    }

    #[test]
    fn test_reopen_restores_every_record_set() {
        let dir = TempDir::new().unwrap();

        {
            let store = Store::open(dir.path()).unwrap();
            store.users().insert(john()).unwrap();
            store
                .users()
                .update("john", |u| {
                    u.wallet = Decimal::new(40, 0);
                    Ok(())
                })
                .unwrap();
            store.goods().insert(kinder()).unwrap();
            store.history().append(PurchaseRecord {
                buyer: "john".to_string(),
                good: "kinder".to_string(),
                quantity: 2,
            });
        }

        let store = Store::open(dir.path()).unwrap();
        assert_eq!(store.users().select("john").unwrap().wallet, Decimal::new(40, 0));
        assert_eq!(store.goods().select("kinder"), Some(kinder()));
        assert_eq!(store.history().select_by_buyer("john").len(), 1);
        assert!(dir.path().join("users.csv").exists());
        assert!(dir.path().join("goods.csv").exists());
        assert!(dir.path().join("history.csv").exists());
    }

    #[test]
    fn test_shared_directory_keeps_every_owner_write() {
        let dir = TempDir::new().unwrap();

        let accounts = Store::open_sets(dir.path(), RecordSets::USERS).unwrap();
        let inventory = Store::open_sets(dir.path(), RecordSets::GOODS).unwrap();
        let sales = Store::open_sets(dir.path(), RecordSets::HISTORY).unwrap();

        inventory.goods().insert(kinder()).unwrap();
        accounts.users().insert(john()).unwrap();
        sales.history().append(PurchaseRecord {
            buyer: "john".to_string(),
            good: "kinder".to_string(),
            quantity: 1,
        });

        inventory.flush_all().unwrap();
        sales.flush_all().unwrap();
        accounts.flush_all().unwrap();

        let store = Store::open(dir.path()).unwrap();
        assert_eq!(store.goods().select("kinder"), Some(kinder()));
        assert_eq!(store.users().select("john"), Some(john()));
        assert_eq!(store.history().select_by_buyer("john").len(), 1);
    }

    #[test]
    fn test_unowned_sets_are_not_loaded() {
        let dir = TempDir::new().unwrap();
        {
            let store = Store::open(dir.path()).unwrap();
            store.users().insert(john()).unwrap();
            store.goods().insert(kinder()).unwrap();
        }

        let inventory = Store::open_sets(dir.path(), RecordSets::GOODS).unwrap();

        assert!(inventory.users().is_empty());
        assert_eq!(inventory.goods().len(), 1);
    }

    #[test]
    fn test_open_creates_missing_directory() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("data").join("store");

        let store = Store::open(&nested).unwrap();

        assert!(nested.is_dir());
        assert_eq!(store.data_dir(), Some(nested.as_path()));
    }
}
