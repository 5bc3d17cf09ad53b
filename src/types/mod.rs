//! Types module
//!
//! Contains core data structures used throughout the application.
//! This module organizes types into logical submodules:
//! - `user`: customer records and profile payloads
//! - `good`: inventory records, categories and price listings
//! - `purchase`: purchase records, receipts and aggregated history
//! - `error`: error taxonomy shared by every service

pub mod error;
pub mod good;
pub mod purchase;
pub mod user;

pub use error::{Entity, SagaStep, ShopError};
pub use good::{Category, Good, GoodInput, PriceEntry};
pub use purchase::{PurchaseHistory, PurchaseReceipt, PurchaseRecord, Quantity};
pub use user::{User, UserProfile};
