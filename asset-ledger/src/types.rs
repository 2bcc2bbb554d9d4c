//! Core types for the ledger
//!
//! Records are explicit schema structs whose serialized field names are the
//! wire names stored in the world state. Money is an exact `Decimal` encoded
//! as a JSON number carrying every digit of the decimal, never an `f64`.

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};

/// Damage recorded against an asset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Damage {
    /// What happened
    pub description: String,

    /// Repair cost
    #[serde(with = "rust_decimal::serde::arbitrary_precision")]
    pub cost: Decimal,
}

impl Damage {
    /// Create new damage entry
    pub fn new(description: impl Into<String>, cost: Decimal) -> Self {
        Self {
            description: description.into(),
            cost,
        }
    }
}

/// Vehicle tracked by the ledger
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Asset {
    /// Asset ID (begins with `asset`)
    #[serde(rename = "ID")]
    pub id: String,

    /// Manufacturer
    pub brand: String,

    /// Model name
    pub model: String,

    /// Model year
    pub year: i32,

    /// Paint color
    pub color: String,

    /// ID of the owning user
    #[serde(rename = "owner")]
    pub owner_id: String,

    /// Unrepaired damages, oldest first
    #[serde(default, deserialize_with = "null_as_empty")]
    pub damages: Vec<Damage>,

    /// Appraised value
    #[serde(rename = "appraisedValue", with = "rust_decimal::serde::arbitrary_precision")]
    pub appraised_value: Decimal,
}

/// Accept `"damages": null` as an empty list
fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<Damage>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<Damage>>::deserialize(deserializer)?.unwrap_or_default())
}

impl Asset {
    /// Create asset without damages
    pub fn new(
        id: impl Into<String>,
        brand: impl Into<String>,
        model: impl Into<String>,
        year: i32,
        color: impl Into<String>,
        owner_id: impl Into<String>,
        appraised_value: Decimal,
    ) -> Self {
        Self {
            id: id.into(),
            brand: brand.into(),
            model: model.into(),
            year,
            color: color.into(),
            owner_id: owner_id.into(),
            damages: Vec::new(),
            appraised_value,
        }
    }

    /// Sum of all damage costs
    pub fn total_damage(&self) -> Decimal {
        self.damages.iter().map(|d| d.cost).sum()
    }

    /// Check if accumulated damage exceeds the appraised value
    pub fn is_total_loss(&self) -> bool {
        self.total_damage() > self.appraised_value
    }

    /// Check if asset has unrepaired damages
    pub fn is_damaged(&self) -> bool {
        !self.damages.is_empty()
    }
}

/// Ledger participant (owner, buyer, mechanic)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// User ID (begins with `user`)
    #[serde(rename = "ID")]
    pub id: String,

    /// First name
    pub name: String,

    /// Last name
    pub lastname: String,

    /// Contact email
    pub email: String,

    /// Account balance
    #[serde(with = "rust_decimal::serde::arbitrary_precision")]
    pub money: Decimal,
}

impl User {
    /// Create new user
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        lastname: impl Into<String>,
        email: impl Into<String>,
        money: Decimal,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            lastname: lastname.into(),
            email: email.into(),
            money,
        }
    }

    /// Check if balance covers `amount`
    pub fn has_sufficient_funds(&self, amount: Decimal) -> bool {
        self.money >= amount
    }

    /// Increase balance
    pub fn credit(&mut self, amount: Decimal) {
        self.money += amount;
    }

    /// Decrease balance
    pub fn debit(&mut self, amount: Decimal) {
        self.money -= amount;
    }
}

/// Result of recording a damage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DamageOutcome {
    /// Damage stored, asset still on the ledger
    Recorded {
        /// Accumulated damage after this entry
        total_damage: Decimal,
    },
    /// Damage exceeded the appraised value; the asset was removed
    WrittenOff {
        /// Accumulated damage that triggered the write-off
        total_damage: Decimal,
    },
}

/// Receipt of a completed ownership transfer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settlement {
    /// Transferred asset
    pub asset_id: String,
    /// Previous owner (credited)
    pub seller: String,
    /// New owner (debited)
    pub buyer: String,
    /// Amount moved from buyer to seller
    pub price: Decimal,
}
