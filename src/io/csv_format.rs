//! CSV snapshot format for store record sets
//!
//! This module centralizes every on-disk format concern of the store:
//! - reading a record set back from its snapshot file
//! - atomically replacing a snapshot (write to a temporary sibling, then rename)
//! - appending a single row to an append-only file
//!
//! Each record set is one CSV file with a header row whose columns are the
//! record's serde field names.

use crate::types::ShopError;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Read every record from a snapshot file
///
/// A missing file is an empty record set, not an error.
///
/// # Errors
///
/// Returns `ShopError::Storage` if the file exists but cannot be read or a row
/// does not decode into `R`.
pub fn read_records<R: DeserializeOwned>(path: &Path) -> Result<Vec<R>, ShopError> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let mut reader = csv::Reader::from_path(path)?;

    reader
        .deserialize()
        .map(|row| row.map_err(ShopError::from))
        .collect()
}

/// Serialize records as CSV (header row included when there is at least one record)
pub fn encode_records<R: Serialize, W: Write>(records: &[R], output: W) -> Result<(), ShopError> {
    let mut writer = csv::Writer::from_writer(output);
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;
    Ok(())
}

/// Replace a snapshot file with the given records
///
/// The new content is written to a temporary sibling first and then renamed
/// over the target, so readers never observe a half-written snapshot.
pub fn write_records<R: Serialize>(path: &Path, records: &[R]) -> Result<(), ShopError> {
    let tmp = temp_path(path);
    {
        let file = fs::File::create(&tmp)?;
        encode_records(records, file)?;
    }
    fs::rename(&tmp, path)?;
    Ok(())
}

/// Append one record to an append-only CSV file
///
/// The header row is written only when the file is new or empty.
pub fn append_record<R: Serialize>(path: &Path, record: &R) -> Result<(), ShopError> {
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    let is_empty = file.metadata()?.len() == 0;

    let mut writer = csv::WriterBuilder::new()
        .has_headers(is_empty)
        .from_writer(file);
    writer.serialize(record)?;
    writer.flush()?;
    Ok(())
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Category, Good, PurchaseRecord, User, UserProfile};
    use rust_decimal::Decimal;
    use tempfile::TempDir;

    fn tuna() -> Good {
        Good {
            name: "tuna".to_string(),
            category: Category::Food,
            price: Decimal::new(30, 1),
            description: "Tuna Fish, canned".to_string(),
            count: 54,
        }
    }

    #[test]
    fn test_missing_file_reads_as_empty() {
        let dir = TempDir::new().unwrap();
        let records: Vec<Good> = read_records(&dir.path().join("goods.csv")).unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn test_encode_writes_header_and_rows() {
        let mut output = Vec::new();
        encode_records(&[tuna()], &mut output).unwrap();

        let text = String::from_utf8(output).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("name,category,price,description,count"));
        assert_eq!(lines.next(), Some("tuna,food,3.0,\"Tuna Fish, canned\",54"));
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn test_write_then_read_goods() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("goods.csv");

        write_records(&path, &[tuna()]).unwrap();
        let records: Vec<Good> = read_records(&path).unwrap();

        assert_eq!(records, vec![tuna()]);
        assert!(!temp_path(&path).exists());
    }

    #[test]
    fn test_write_replaces_previous_snapshot() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("users.csv");
        let profile = UserProfile {
            fullname: "John Doe".to_string(),
            username: "john".to_string(),
            password: "1234".to_string(),
            age: "54".to_string(),
            address: "Beirut".to_string(),
            gender: "male".to_string(),
            marital_status: "married".to_string(),
        };
        let mut user = User::register(profile);

        write_records(&path, &[user.clone()]).unwrap();
        user.wallet = Decimal::new(75, 1);
        write_records(&path, &[user.clone()]).unwrap();

        let records: Vec<User> = read_records(&path).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].wallet, Decimal::new(75, 1));
    }

    #[test]
    fn test_append_writes_single_header() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("history.csv");

        for good in ["kinder", "tuna"] {
            let record = PurchaseRecord {
                buyer: "john".to_string(),
                good: good.to_string(),
                quantity: 1,
            };
            append_record(&path, &record).unwrap();
        }

        let text = fs::read_to_string(&path).unwrap();
        assert_eq!(text, "buyer,good,quantity\njohn,kinder,1\njohn,tuna,1\n");

        let records: Vec<PurchaseRecord> = read_records(&path).unwrap();
        assert_eq!(records.len(), 2);
    }

    #[test]
    fn test_corrupt_row_is_storage_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("goods.csv");
        fs::write(
            &path,
            "name,category,price,description,count\ntuna,detergent,3.0,Tuna,5\n",
        )
        .unwrap();

        let result: Result<Vec<Good>, _> = read_records(&path);
        assert!(matches!(result, Err(ShopError::Storage { .. })));
    }
}
