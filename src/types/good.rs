//! Good-related types for the storefront
//!
//! This module defines the closed `Category` enumeration, the stored `Good`
//! record and the `GoodInput` payload accepted by add and update. Category and
//! price are validated once, when a `GoodInput` is turned into a `Good`.

use super::error::ShopError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Fixed set of categories a good can belong to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Food,
    Clothes,
    Accessories,
    Electronics,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Food,
        Category::Clothes,
        Category::Accessories,
        Category::Electronics,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Food => "food",
            Category::Clothes => "clothes",
            Category::Accessories => "accessories",
            Category::Electronics => "electronics",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = ShopError;

    /// Case-insensitive match against the fixed set
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Category::ALL
            .into_iter()
            .find(|category| category.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| ShopError::invalid_category(s))
    }
}

/// Stored inventory record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Good {
    /// Natural key, unique across goods
    pub name: String,

    pub category: Category,

    /// Unit price, never negative
    ///
    /// Encoded as an `f64` number, so prices beyond about 15 significant digits
    /// lose precision on the wire and in a snapshot round trip.
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,

    pub description: String,

    /// Units in stock
    pub count: u32,
}

/// Good payload as sent by clients
///
/// The category is free text here; converting into a [`Good`] validates it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoodInput {
    pub name: String,
    pub category: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub description: String,
    pub count: u32,
}

impl TryFrom<GoodInput> for Good {
    type Error = ShopError;

    fn try_from(input: GoodInput) -> Result<Self, Self::Error> {
        let category = input.category.parse::<Category>()?;
        if input.price < Decimal::ZERO {
            return Err(ShopError::InvalidPrice { price: input.price });
        }

        Ok(Good {
            name: input.name,
            category,
            price: input.price,
            description: input.description,
            count: input.count,
        })
    }
}

impl From<&Good> for GoodInput {
    fn from(good: &Good) -> Self {
        GoodInput {
            name: good.name.clone(),
            category: good.category.to_string(),
            price: good.price,
            description: good.description.clone(),
            count: good.count,
        }
    }
}

/// Name and unit price of a good, as listed by the sales service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceEntry {
    pub name: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
}

impl From<&Good> for PriceEntry {
    fn from(good: &Good) -> Self {
        PriceEntry {
            name: good.name.clone(),
            price: good.price,
        }
    }
}
