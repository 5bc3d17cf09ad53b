//! Error types for the storefront services
//!
//! This module defines every failure an account, inventory or sales operation can
//! report. Errors are recovered at the component boundary and turned into a status
//! value for the caller; the `Display` text of each variant is the human-readable
//! status string returned in HTTP envelopes.
//!
//! # Error Categories
//!
//! - **Lookup Errors**: user or good absent
//! - **Validation Errors**: taken usernames, invalid categories, amounts, prices and quantities
//! - **Business Rule Errors**: insufficient funds, out of stock, insufficient stock
//! - **Saga Errors**: a purchase step failed after an earlier step had already been applied
//! - **Infrastructure Errors**: timeouts, unreachable services, snapshot I/O
//!
//! The enum is serializable so a remote client can reconstruct the exact variant a
//! service reported.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Kind of record an error refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Entity {
    User,
    Good,
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Entity::User => f.write_str("User"),
            Entity::Good => f.write_str("Good"),
        }
    }
}

/// Step of the purchase saga that failed after the debit went through
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SagaStep {
    /// Decrementing the good's stock
    Reserve,
}

impl fmt::Display for SagaStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SagaStep::Reserve => f.write_str("reserve"),
        }
    }
}

fn refund_note(compensated: &bool) -> &'static str {
    if *compensated {
        "payment refunded"
    } else {
        "refund failed"
    }
}

/// Main error type for the storefront
///
/// Each variant carries enough context to produce the status string a legacy
/// client expects and to let a caller decide how to react.
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ShopError {
    /// User or good absent
    #[error("{entity} not found")]
    NotFound {
        /// Which record set was searched
        entity: Entity,
        /// The username or good name that was not found
        key: String,
    },

    /// Registration with a username that already exists
    #[error("Username already taken")]
    UsernameTaken {
        /// The taken username
        username: String,
    },

    /// A good with this name is already registered
    #[error("Good {name} already registered")]
    DuplicateGood {
        /// The duplicated good name
        name: String,
    },

    /// Category outside the fixed set
    #[error("Category is invalid")]
    InvalidCategory {
        /// The rejected category string
        category: String,
    },

    /// Negative price on add or update
    #[error("Price should be a non-negative number, got {price}")]
    InvalidPrice {
        /// The rejected price
        #[serde(with = "rust_decimal::serde::float")]
        price: Decimal,
    },

    /// Charge or debit amount that is not a non-negative number
    #[error("Amount should be a number, got {amount}")]
    InvalidAmount {
        /// The rejected amount, as received
        amount: String,
    },

    /// Reservation or purchase quantity that is not a positive integer
    #[error("Quantity should be a positive integer, got {quantity}")]
    InvalidQuantity {
        /// The rejected quantity, as received
        quantity: String,
    },

    /// Wallet lower than the requested debit
    ///
    /// Rejected without touching the wallet.
    #[error("Not enough available to spend {requested}")]
    InsufficientFunds {
        /// Buyer username
        username: String,
        /// Wallet balance at the time of the check
        #[serde(with = "rust_decimal::serde::float")]
        wallet: Decimal,
        /// Requested amount
        #[serde(with = "rust_decimal::serde::float")]
        requested: Decimal,
    },

    /// Stock count already zero
    #[error("{name} is out of stock")]
    OutOfStock {
        /// Good name
        name: String,
    },

    /// Requested quantity exceeds the remaining stock
    #[error("Not enough {name} in stock")]
    InsufficientStock {
        /// Good name
        name: String,
        /// Stock count at the time of the check
        available: u32,
        /// Requested quantity
        requested: u32,
    },

    /// A purchase step failed after the wallet had been debited
    ///
    /// The coordinator attempts to credit the cost back before reporting this.
    #[error("Purchase failed at {step}: {reason}; {}", refund_note(compensated))]
    PartialFailure {
        /// The step that failed
        step: SagaStep,
        /// Status of the underlying failure
        reason: String,
        /// Whether the compensating credit succeeded
        compensated: bool,
    },

    /// Decimal arithmetic would overflow
    #[error("Arithmetic overflow in {operation} for {key}")]
    ArithmeticOverflow {
        /// Operation that would overflow
        operation: String,
        /// Username or good name involved
        key: String,
    },

    /// A collaborator call did not answer within the configured bound
    #[error("{service} {operation} timed out after {after_ms}ms")]
    Timeout {
        /// Service that was called
        service: String,
        /// Operation that was called
        operation: String,
        /// The bound that was exceeded
        after_ms: u64,
    },

    /// A collaborator could not be reached or answered garbage
    #[error("{service} unavailable: {message}")]
    Unavailable {
        /// Service that was called
        service: String,
        /// Transport-level description
        message: String,
    },

    /// Snapshot files could not be read or written
    #[error("Storage error: {message}")]
    Storage {
        /// Description of the I/O or CSV failure
        message: String,
    },

    /// Request that could not be interpreted
    #[error("Bad request: {message}")]
    BadRequest {
        /// What was wrong with the request
        message: String,
    },
}

impl From<std::io::Error> for ShopError {
    fn from(error: std::io::Error) -> Self {
        ShopError::Storage {
            message: error.to_string(),
        }
    }
}

impl From<csv::Error> for ShopError {
    fn from(error: csv::Error) -> Self {
        let message = match error.position() {
            Some(pos) => format!("line {}: {}", pos.line(), error),
            None => error.to_string(),
        };
        ShopError::Storage { message }
    }
}

// Helper functions for creating common errors

impl ShopError {
    /// Create a NotFound error for a user
    pub fn user_not_found(username: &str) -> Self {
        ShopError::NotFound {
            entity: Entity::User,
            key: username.to_string(),
        }
    }

    /// Create a NotFound error for a good
    pub fn good_not_found(name: &str) -> Self {
        ShopError::NotFound {
            entity: Entity::Good,
            key: name.to_string(),
        }
    }

    /// Create a UsernameTaken error
    pub fn username_taken(username: &str) -> Self {
        ShopError::UsernameTaken {
            username: username.to_string(),
        }
    }

    /// Create a DuplicateGood error
    pub fn duplicate_good(name: &str) -> Self {
        ShopError::DuplicateGood {
            name: name.to_string(),
        }
    }

    /// Create an InvalidCategory error
    pub fn invalid_category(category: &str) -> Self {
        ShopError::InvalidCategory {
            category: category.to_string(),
        }
    }

    /// Create an InvalidAmount error
    pub fn invalid_amount(amount: impl fmt::Display) -> Self {
        ShopError::InvalidAmount {
            amount: amount.to_string(),
        }
    }

    /// Create an InvalidQuantity error
    pub fn invalid_quantity(quantity: impl fmt::Display) -> Self {
        ShopError::InvalidQuantity {
            quantity: quantity.to_string(),
        }
    }

    /// Create an InsufficientFunds error
    pub fn insufficient_funds(username: &str, wallet: Decimal, requested: Decimal) -> Self {
        ShopError::InsufficientFunds {
            username: username.to_string(),
            wallet,
            requested,
        }
    }

    /// Create an OutOfStock error
    pub fn out_of_stock(name: &str) -> Self {
        ShopError::OutOfStock {
            name: name.to_string(),
        }
    }

    /// Create an InsufficientStock error
    pub fn insufficient_stock(name: &str, available: u32, requested: u32) -> Self {
        ShopError::InsufficientStock {
            name: name.to_string(),
            available,
            requested,
        }
    }

    /// Create an ArithmeticOverflow error
    pub fn arithmetic_overflow(operation: &str, key: &str) -> Self {
        ShopError::ArithmeticOverflow {
            operation: operation.to_string(),
            key: key.to_string(),
        }
    }

    /// Create a Timeout error
    pub fn timeout(service: &str, operation: &str, after_ms: u64) -> Self {
        ShopError::Timeout {
            service: service.to_string(),
            operation: operation.to_string(),
            after_ms,
        }
    }

    /// Create an Unavailable error
    pub fn unavailable(service: &str, message: impl fmt::Display) -> Self {
        ShopError::Unavailable {
            service: service.to_string(),
            message: message.to_string(),
        }
    }

    /// Create a BadRequest error
    pub fn bad_request(message: impl fmt::Display) -> Self {
        ShopError::BadRequest {
            message: message.to_string(),
        }
    }

    /// HTTP status code for this error
    ///
    /// Used when the service answers with real status codes; with legacy status
    /// handling every response is a 200 and only the envelope tells failure apart.
    pub fn status_code(&self) -> u16 {
        match self {
            ShopError::NotFound { .. } => 404,
            ShopError::UsernameTaken { .. } | ShopError::DuplicateGood { .. } => 409,
            ShopError::InvalidCategory { .. }
            | ShopError::InvalidPrice { .. }
            | ShopError::InvalidAmount { .. }
            | ShopError::InvalidQuantity { .. }
            | ShopError::InsufficientFunds { .. }
            | ShopError::OutOfStock { .. }
            | ShopError::InsufficientStock { .. }
            | ShopError::ArithmeticOverflow { .. } => 422,
            ShopError::PartialFailure { .. } | ShopError::Unavailable { .. } => 502,
            ShopError::Timeout { .. } => 504,
            ShopError::Storage { .. } => 500,
            ShopError::BadRequest { .. } => 400,
        }
    }
}
