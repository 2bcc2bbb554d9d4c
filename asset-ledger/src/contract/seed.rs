//! Genesis seeding

use super::{ensure_non_negative, store_asset, store_user};
use crate::{
    keys::RecordKind,
    transaction::WorldState,
    types::{Asset, User},
    Error, Result,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{info, instrument};

/// Starting set of users and assets
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Genesis {
    /// Users, written first
    #[serde(default)]
    pub users: Vec<User>,

    /// Assets, written after the users
    #[serde(default)]
    pub assets: Vec<Asset>,
}

impl Default for Genesis {
    fn default() -> Self {
        let users = vec![
            User::new("user1", "Marko", "Markovic", "marko.markovic@email.com", Decimal::from(10_000)),
            User::new("user2", "Jovan", "Jovanovic", "jovan.jovanovic@email.com", Decimal::from(5_000)),
            User::new("user3", "Lazar", "Lazarevic", "lazar.lazarevic@email.com", Decimal::from(3_750)),
        ];

        let assets = vec![
            Asset::new("asset1", "fiat", "500L", 2018, "black", "user1", Decimal::from(7_000)),
            Asset::new("asset2", "audi", "A6", 2016, "blue", "user2", Decimal::from(5_000)),
            Asset::new("asset3", "bmw", "500L", 2017, "red", "user2", Decimal::from(12_000)),
            Asset::new("asset4", "ford", "500L", 2013, "gray", "user1", Decimal::from(7_350)),
            Asset::new("asset5", "toyota", "500L", 2017, "black", "user1", Decimal::from(4_600)),
            Asset::new("asset6", "opel", "astra", 2018, "black", "user3", Decimal::from(6_300)),
        ];

        Self { users, assets }
    }
}

impl Genesis {
    /// Load from a JSON file (`{"users": [...], "assets": [...]}`)
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| {
            Error::Config(format!("Failed to parse genesis file {:?}: {}", path, e))
        })
    }

    /// Check IDs and amounts the way the regular operations would
    pub fn validate(&self) -> Result<()> {
        for user in &self.users {
            RecordKind::User.validate_id(&user.id)?;
            ensure_non_negative("balance", user.money)?;
        }
        for asset in &self.assets {
            RecordKind::Asset.validate_id(&asset.id)?;
            ensure_non_negative("appraised value", asset.appraised_value)?;
            for damage in &asset.damages {
                ensure_non_negative("damage cost", damage.cost)?;
            }
            if asset.is_total_loss() {
                return Err(Error::InvalidAmount(format!(
                    "{} is seeded as a total loss: damage {} exceeds value {}",
                    asset.id,
                    asset.total_damage(),
                    asset.appraised_value
                )));
            }
        }
        Ok(())
    }
}

/// Write every genesis record, overwriting existing records with the same ID
#[instrument(skip(state, genesis), fields(users = genesis.users.len(), assets = genesis.assets.len()))]
pub fn init_ledger<S: WorldState + ?Sized>(state: &mut S, genesis: &Genesis) -> Result<()> {
    genesis.validate()?;

    for user in &genesis.users {
        store_user(state, user)?;
    }

    for asset in &genesis.assets {
        store_asset(state, asset)?;
    }

    info!("Ledger initialized");

    Ok(())
}
