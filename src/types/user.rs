//! User-related types for the storefront
//!
//! This module defines the stored `User` record and the `UserProfile` payload
//! accepted by registration and profile updates.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Profile fields supplied by a customer
///
/// Everything a user record holds except the wallet. Registration and profile
/// updates accept this shape, so a client can never set a balance through them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub fullname: String,
    /// Natural key, unique across users
    pub username: String,
    pub password: String,
    pub age: String,
    pub address: String,
    pub gender: String,
    pub marital_status: String,
}

/// Stored customer record
///
/// Represents a registered customer with their spendable balance. The wallet
/// starts at zero and only changes through credit and debit, which keep it
/// non-negative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub fullname: String,
    pub username: String,
    pub password: String,
    pub age: String,
    pub address: String,
    pub gender: String,
    pub marital_status: String,

    /// Spendable balance
    ///
    /// Encoded as a JSON/CSV number for legacy clients; arithmetic stays decimal.
    /// The encoding goes through `f64`, so balances beyond about 15 significant
    /// digits lose precision on the wire and in a snapshot round trip.
    #[serde(with = "rust_decimal::serde::float")]
    pub wallet: Decimal,
}

impl User {
    /// Create a freshly registered user with an empty wallet
    pub fn register(profile: UserProfile) -> Self {
        User {
            fullname: profile.fullname,
            username: profile.username,
            password: profile.password,
            age: profile.age,
            address: profile.address,
            gender: profile.gender,
            marital_status: profile.marital_status,
            wallet: Decimal::ZERO,
        }
    }

    /// Overwrite every profile field, leaving the wallet untouched
    pub fn apply_profile(&mut self, profile: UserProfile) {
        self.fullname = profile.fullname;
        self.username = profile.username;
        self.password = profile.password;
        self.age = profile.age;
        self.address = profile.address;
        self.gender = profile.gender;
        self.marital_status = profile.marital_status;
    }

    /// Profile view of this user
    pub fn profile(&self) -> UserProfile {
        UserProfile {
            fullname: self.fullname.clone(),
            username: self.username.clone(),
            password: self.password.clone(),
            age: self.age.clone(),
            address: self.address.clone(),
            gender: self.gender.clone(),
            marital_status: self.marital_status.clone(),
        }
    }
}
