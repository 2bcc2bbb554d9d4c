//! Damage accounting
//!
//! Damages accumulate on an asset until a mechanic repairs them. When the
//! accumulated cost strictly exceeds the appraised value, the asset is a total
//! loss and is removed from the world state instead of being updated.

use super::{ensure_non_negative, require_asset, require_user, store_asset, store_user};
use crate::{
    error::UserRole,
    keys::RecordKind,
    transaction::WorldState,
    types::{Damage, DamageOutcome},
    Error, Result,
};
use rust_decimal::Decimal;
use tracing::{info, instrument, warn};

/// Record a damage against an asset, writing the asset off on total loss
#[instrument(skip(state, description))]
pub fn add_damage<S: WorldState + ?Sized>(
    state: &mut S,
    asset_id: &str,
    description: &str,
    cost: Decimal,
) -> Result<DamageOutcome> {
    ensure_non_negative("damage cost", cost)?;

    let mut asset = require_asset(state, asset_id)?;
    asset.damages.push(Damage::new(description, cost));

    let total_damage = asset.total_damage();

    if asset.is_total_loss() {
        state.del_state(&RecordKind::Asset.key(asset_id))?;

        warn!(
            total_damage = %total_damage,
            appraised_value = %asset.appraised_value,
            "Asset written off as total loss"
        );

        return Ok(DamageOutcome::WrittenOff { total_damage });
    }

    store_asset(state, &asset)?;

    Ok(DamageOutcome::Recorded { total_damage })
}

/// Settle all damages of an asset: the owner pays the mechanic
///
/// Returns the amount paid. A mechanic repairing their own asset moves no
/// money but must still be able to cover the cost.
#[instrument(skip(state))]
pub fn repair_damages<S: WorldState + ?Sized>(
    state: &mut S,
    asset_id: &str,
    mechanic_id: &str,
) -> Result<Decimal> {
    let mut asset = require_asset(state, asset_id)?;
    let mut owner = require_user(state, &asset.owner_id, UserRole::Owner)?;
    let mut mechanic = require_user(state, mechanic_id, UserRole::Repairman)?;

    let total_cost = asset.total_damage();

    if !owner.has_sufficient_funds(total_cost) {
        return Err(Error::InsufficientFunds {
            user: owner.id,
            required: total_cost,
            available: owner.money,
        });
    }

    asset.damages.clear();

    if owner.id == mechanic.id {
        store_asset(state, &asset)?;
        info!(cost = %total_cost, "Owner repaired own asset");
        return Ok(total_cost);
    }

    owner.debit(total_cost);
    mechanic.credit(total_cost);

    store_user(state, &owner)?;
    store_user(state, &mechanic)?;
    store_asset(state, &asset)?;

    info!(owner = %owner.id, cost = %total_cost, "Damages repaired");

    Ok(total_cost)
}
