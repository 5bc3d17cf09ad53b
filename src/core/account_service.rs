//! Account service: customer records and wallet balances
//!
//! This module provides `AccountService`, the owner of every user row. Wallet
//! changes go through `credit` and `debit` only, and each one is a single row
//! update so the balance check and the write cannot be interleaved with another
//! request for the same user.
//!
//! # Invariants
//!
//! - A wallet never goes below zero.
//! - Registration and profile updates never touch the wallet.

use super::store::Store;
use super::traits::AccountApi;
use crate::types::{ShopError, User, UserProfile};
use async_trait::async_trait;
use rust_decimal::Decimal;
use std::sync::Arc;

/// Local account service over the shared store
#[derive(Debug, Clone)]
pub struct AccountService {
    store: Arc<Store>,
}

impl AccountService {
    pub fn new(store: Arc<Store>) -> Self {
        Self { store }
    }

    /// Register a new user with an empty wallet
    ///
    /// The existence check and the insert are one store operation, so two
    /// concurrent registrations of the same username cannot both succeed.
    ///
    /// # Errors
    ///
    /// * `ShopError::UsernameTaken` - the username already exists; the existing
    ///   record is left unchanged
    pub fn register(&self, profile: UserProfile) -> Result<User, ShopError> {
        let user = self.store.users().insert(User::register(profile)).map_err(|e| {
            tracing::warn!(error = %e, "registration rejected");
            e
        })?;
        tracing::info!(username = %user.username, "user registered");
        Ok(user)
    }

    pub fn lookup(&self, username: &str) -> Option<User> {
        tracing::debug!(%username, "user lookup");
        self.store.users().select(username)
    }

    /// Overwrite every profile field of an existing user
    pub fn update(&self, profile: UserProfile) -> Result<User, ShopError> {
        let username = profile.username.clone();
        let user = self.store.users().update(&username, |user| {
            user.apply_profile(profile);
            Ok(user.clone())
        })?;
        tracing::info!(%username, "user profile updated");
        Ok(user)
    }

    pub fn delete(&self, username: &str) -> Result<(), ShopError> {
        self.store.users().delete(username)?;
        tracing::info!(%username, "user deleted");
        Ok(())
    }

    /// Add funds to a wallet
    ///
    /// # Errors
    ///
    /// * `ShopError::InvalidAmount` - `amount` is negative
    /// * `ShopError::NotFound` - no such user
    /// * `ShopError::ArithmeticOverflow` - the new balance does not fit a decimal
    pub fn credit(&self, username: &str, amount: Decimal) -> Result<User, ShopError> {
        if amount < Decimal::ZERO {
            return Err(ShopError::invalid_amount(amount));
        }

        let user = self.store.users().update(username, |user| {
            user.wallet = user
                .wallet
                .checked_add(amount)
                .ok_or_else(|| ShopError::arithmetic_overflow("credit", username))?;
            Ok(user.clone())
        })?;
        tracing::info!(%username, %amount, wallet = %user.wallet, "wallet credited");
        Ok(user)
    }

    /// Take funds out of a wallet
    ///
    /// The balance check and the subtraction run under the same row lock.
    ///
    /// # Errors
    ///
    /// * `ShopError::InvalidAmount` - `amount` is negative
    /// * `ShopError::NotFound` - no such user
    /// * `ShopError::InsufficientFunds` - the wallet holds less than `amount`;
    ///   the wallet is unchanged
    pub fn debit(&self, username: &str, amount: Decimal) -> Result<User, ShopError> {
        if amount < Decimal::ZERO {
            return Err(ShopError::invalid_amount(amount));
        }

        let result = self.store.users().update(username, |user| {
            if user.wallet < amount {
                return Err(ShopError::insufficient_funds(username, user.wallet, amount));
            }
            user.wallet = user
                .wallet
                .checked_sub(amount)
                .ok_or_else(|| ShopError::arithmetic_overflow("debit", username))?;
            Ok(user.clone())
        });

        match result {
            Ok(user) => {
                tracing::info!(%username, %amount, wallet = %user.wallet, "wallet debited");
                Ok(user)
            }
            Err(e) => {
                tracing::warn!(%username, %amount, error = %e, "debit rejected");
                Err(e)
            }
        }
    }

    /// Every user in registration order
    pub fn list(&self) -> Vec<User> {
        self.store.users().select_all()
    }
}

#[async_trait]
impl AccountApi for AccountService {
    async fn register(&self, profile: UserProfile) -> Result<User, ShopError> {
        AccountService::register(self, profile)
    }

    async fn lookup(&self, username: &str) -> Result<Option<User>, ShopError> {
        Ok(AccountService::lookup(self, username))
    }

    async fn update(&self, profile: UserProfile) -> Result<User, ShopError> {
        AccountService::update(self, profile)
    }

    async fn delete(&self, username: &str) -> Result<(), ShopError> {
        AccountService::delete(self, username)
    }

    async fn credit(&self, username: &str, amount: Decimal) -> Result<User, ShopError> {
        AccountService::credit(self, username, amount)
    }

    async fn debit(&self, username: &str, amount: Decimal) -> Result<User, ShopError> {
        AccountService::debit(self, username, amount)
    }

    async fn list(&self) -> Result<Vec<User>, ShopError> {
        Ok(AccountService::list(self))
    }
}
