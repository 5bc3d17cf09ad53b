//! I/O module
//!
//! Handles the on-disk snapshot format of the store.
//!
//! # Components
//!
//! - `csv_format` - CSV snapshot reading, atomic replacement and row appends

pub mod csv_format;

pub use csv_format::{append_record, encode_records, read_records, write_records};
