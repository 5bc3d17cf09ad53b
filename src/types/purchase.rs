//! Purchase-related types for the storefront
//!
//! This module defines the append-only purchase record written by the sales
//! coordinator, the receipt returned for a successful sale and the aggregated
//! history view.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Units of a good bought in one purchase
pub type Quantity = u32;

/// One successful sale
///
/// Append-only: created exactly once per successful purchase, never mutated or
/// deleted. Identity is insertion order only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchaseRecord {
    /// Buyer username
    pub buyer: String,

    /// Name of the purchased good
    pub good: String,

    /// Units bought
    pub quantity: Quantity,
}

/// Outcome of a successful purchase
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PurchaseReceipt {
    pub buyer: String,
    pub good: String,
    pub quantity: Quantity,

    /// Amount debited from the buyer's wallet
    #[serde(with = "rust_decimal::serde::float")]
    pub cost: Decimal,

    /// Buyer wallet after the debit
    #[serde(with = "rust_decimal::serde::float")]
    pub wallet: Decimal,

    /// Stock left after the reservation
    pub remaining: u32,
}

/// Purchased quantity per good name for one buyer
pub type PurchaseHistory = BTreeMap<String, u64>;
