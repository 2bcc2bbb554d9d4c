//! Ledger state machine
//!
//! Every operation is a stateless function over a [`WorldState`]: it reads the
//! records it needs, validates and mutates the decoded copies, then writes
//! them back. Operations stop at the first error; pending writes are only
//! made durable when the enclosing transaction commits.
//!
//! # Operations
//!
//! - **Seeding**: [`init_ledger`]
//! - **Asset lifecycle**: [`create_asset`], [`read_asset`], [`update_asset`],
//!   [`delete_asset`], [`asset_exists`], [`change_asset_color`]
//! - **Users**: [`read_user`], [`user_exists`]
//! - **Damage accounting**: [`add_damage`], [`repair_damages`]
//! - **Ownership transfer**: [`transfer_asset`]
//! - **Enumeration**: [`list_assets`], [`list_users`], [`find_assets`]

pub mod asset;
pub mod damage;
pub mod query;
pub mod seed;
pub mod transfer;
pub mod user;

pub use asset::{
    asset_exists, change_asset_color, create_asset, delete_asset, read_asset, update_asset,
    NewAsset,
};
pub use damage::{add_damage, repair_damages};
pub use query::{find_assets, list_assets, list_users, AssetFilter};
pub use seed::{init_ledger, Genesis};
pub use transfer::transfer_asset;
pub use user::{read_user, user_exists};

use crate::{
    codec,
    error::{Error, UserRole},
    keys::RecordKind,
    transaction::WorldState,
    types::{Asset, User},
    Result,
};
use rust_decimal::Decimal;

/// Load an asset, `None` when absent
fn load_asset<S: WorldState + ?Sized>(state: &S, id: &str) -> Result<Option<Asset>> {
    let key = RecordKind::Asset.key(id);
    state
        .get_state(&key)?
        .map(|bytes| codec::decode(id, &bytes))
        .transpose()
}

/// Load an asset that must exist
fn require_asset<S: WorldState + ?Sized>(state: &S, id: &str) -> Result<Asset> {
    load_asset(state, id)?.ok_or_else(|| Error::AssetNotFound(id.to_string()))
}

/// Load a user, `None` when absent
fn load_user<S: WorldState + ?Sized>(state: &S, id: &str) -> Result<Option<User>> {
    let key = RecordKind::User.key(id);
    state
        .get_state(&key)?
        .map(|bytes| codec::decode(id, &bytes))
        .transpose()
}

/// Load a user that must exist, reporting its role when missing
fn require_user<S: WorldState + ?Sized>(state: &S, id: &str, role: UserRole) -> Result<User> {
    load_user(state, id)?.ok_or_else(|| Error::UserNotFound {
        role,
        id: id.to_string(),
    })
}

fn store_asset<S: WorldState + ?Sized>(state: &mut S, asset: &Asset) -> Result<()> {
    let bytes = codec::encode(&asset.id, asset)?;
    state.put_state(&RecordKind::Asset.key(&asset.id), bytes)
}

fn store_user<S: WorldState + ?Sized>(state: &mut S, user: &User) -> Result<()> {
    let bytes = codec::encode(&user.id, user)?;
    state.put_state(&RecordKind::User.key(&user.id), bytes)
}

/// Reject negative monetary inputs
fn ensure_non_negative(what: &str, amount: Decimal) -> Result<()> {
    if amount < Decimal::ZERO {
        return Err(Error::InvalidAmount(format!(
            "{} must not be negative, got {}",
            what, amount
        )));
    }
    Ok(())
}
