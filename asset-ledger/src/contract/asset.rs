//! Asset lifecycle operations

use super::{ensure_non_negative, require_asset, store_asset};
use crate::{keys::RecordKind, transaction::WorldState, types::Asset, Error, Result};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

/// Parameters of a newly issued asset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewAsset {
    /// Asset ID (must begin with `asset`)
    pub id: String,
    /// Manufacturer
    pub brand: String,
    /// Model name
    pub model: String,
    /// Model year
    pub year: i32,
    /// Paint color
    pub color: String,
    /// Owning user ID
    pub owner_id: String,
    /// Appraised value
    pub appraised_value: Decimal,
}

impl From<NewAsset> for Asset {
    fn from(new: NewAsset) -> Self {
        Asset::new(
            new.id,
            new.brand,
            new.model,
            new.year,
            new.color,
            new.owner_id,
            new.appraised_value,
        )
    }
}

/// Issue a new asset with no damages
#[instrument(skip(state, new), fields(asset_id = %new.id))]
pub fn create_asset<S: WorldState + ?Sized>(state: &mut S, new: NewAsset) -> Result<Asset> {
    RecordKind::Asset.validate_id(&new.id)?;
    ensure_non_negative("appraised value", new.appraised_value)?;

    if asset_exists(state, &new.id)? {
        return Err(Error::AlreadyExists(new.id));
    }

    let asset = Asset::from(new);
    store_asset(state, &asset)?;

    info!(owner = %asset.owner_id, value = %asset.appraised_value, "Asset created");

    Ok(asset)
}

/// Return the asset stored under `id`
pub fn read_asset<S: WorldState + ?Sized>(state: &S, id: &str) -> Result<Asset> {
    require_asset(state, id)
}

/// Update color, owner and appraised value of an existing asset
///
/// Brand, model, year and recorded damages are kept.
#[instrument(skip(state))]
pub fn update_asset<S: WorldState + ?Sized>(
    state: &mut S,
    id: &str,
    color: &str,
    owner_id: &str,
    appraised_value: Decimal,
) -> Result<Asset> {
    ensure_non_negative("appraised value", appraised_value)?;

    let mut asset = require_asset(state, id)?;
    asset.color = color.to_string();
    asset.owner_id = owner_id.to_string();
    asset.appraised_value = appraised_value;

    store_asset(state, &asset)?;

    debug!("Asset updated");

    Ok(asset)
}

/// Remove an existing asset
#[instrument(skip(state))]
pub fn delete_asset<S: WorldState + ?Sized>(state: &mut S, id: &str) -> Result<()> {
    if !asset_exists(state, id)? {
        return Err(Error::AssetNotFound(id.to_string()));
    }

    state.del_state(&RecordKind::Asset.key(id))?;

    info!("Asset deleted");

    Ok(())
}

/// Check if an asset is stored under `id`
pub fn asset_exists<S: WorldState + ?Sized>(state: &S, id: &str) -> Result<bool> {
    Ok(state.get_state(&RecordKind::Asset.key(id))?.is_some())
}

/// Repaint an existing asset
#[instrument(skip(state))]
pub fn change_asset_color<S: WorldState + ?Sized>(
    state: &mut S,
    id: &str,
    color: &str,
) -> Result<Asset> {
    let mut asset = require_asset(state, id)?;
    asset.color = color.to_string();

    store_asset(state, &asset)?;

    Ok(asset)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::test_support::seeded_backend;
    use crate::contract::{add_damage, list_assets};
    use crate::storage::MemoryBackend;
    use crate::transaction::Transaction;
    use rust_decimal_macros::dec;

    fn new_asset(id: &str) -> NewAsset {
        NewAsset {
            id: id.to_string(),
            brand: "skoda".to_string(),
            model: "octavia".to_string(),
            year: 2020,
            color: "white".to_string(),
            owner_id: "user1".to_string(),
            appraised_value: dec!(9000),
        }
    }

    #[test]
    fn test_create_then_read() {
        let backend = MemoryBackend::new();
        let mut tx = Transaction::begin(&backend);

        let created = create_asset(&mut tx, new_asset("asset10")).unwrap();
        assert!(asset_exists(&tx, "asset10").unwrap());

        let read = read_asset(&tx, "asset10").unwrap();
        assert_eq!(read, created);
        assert_eq!(read.brand, "skoda");
        assert_eq!(read.year, 2020);
        assert!(read.damages.is_empty());
    }

    #[test]
    fn test_double_create_rejected() {
        let backend = MemoryBackend::new();
        let mut tx = Transaction::begin(&backend);
        create_asset(&mut tx, new_asset("asset10")).unwrap();

        let mut second = new_asset("asset10");
        second.brand = "lada".to_string();
        let err = create_asset(&mut tx, second).unwrap_err();
        assert!(matches!(err, Error::AlreadyExists(ref id) if id == "asset10"));

        // First record untouched
        assert_eq!(read_asset(&tx, "asset10").unwrap().brand, "skoda");
    }

    #[test]
    fn test_create_validates_input() {
        let backend = MemoryBackend::new();
        let mut tx = Transaction::begin(&backend);

        assert!(matches!(
            create_asset(&mut tx, new_asset("car1")),
            Err(Error::InvalidId { .. })
        ));

        let mut negative = new_asset("asset11");
        negative.appraised_value = dec!(-1);
        assert!(matches!(
            create_asset(&mut tx, negative),
            Err(Error::InvalidAmount(_))
        ));
        assert_eq!(tx.pending_writes(), 0);
    }

    #[test]
    fn test_read_missing_asset() {
        let backend = MemoryBackend::new();
        let tx = Transaction::begin(&backend);
        let err = read_asset(&tx, "asset404").unwrap_err();
        assert!(err.is_not_found());
        assert!(!asset_exists(&tx, "asset404").unwrap());
    }

    #[test]
    fn test_update_merges_fields() {
        let backend = seeded_backend();
        let mut tx = Transaction::begin(&backend);
        add_damage(&mut tx, "asset1", "scratch", dec!(50)).unwrap();

        let updated = update_asset(&mut tx, "asset1", "white", "user2", dec!(6500)).unwrap();
        assert_eq!(updated.color, "white");
        assert_eq!(updated.owner_id, "user2");
        assert_eq!(updated.appraised_value, dec!(6500));

        let stored = read_asset(&tx, "asset1").unwrap();
        assert_eq!(stored.brand, "fiat");
        assert_eq!(stored.model, "500L");
        assert_eq!(stored.year, 2018);
        assert_eq!(stored.damages.len(), 1);
    }

    #[test]
    fn test_update_missing_asset() {
        let backend = MemoryBackend::new();
        let mut tx = Transaction::begin(&backend);
        let err = update_asset(&mut tx, "asset404", "red", "user1", dec!(1)).unwrap_err();
        assert!(matches!(err, Error::AssetNotFound(_)));
    }

    #[test]
    fn test_delete_asset() {
        let backend = seeded_backend();
        let mut tx = Transaction::begin(&backend);

        delete_asset(&mut tx, "asset2").unwrap();
        assert!(!asset_exists(&tx, "asset2").unwrap());
        assert_eq!(list_assets(&tx).unwrap().len(), 5);

        assert!(matches!(
            delete_asset(&mut tx, "asset2"),
            Err(Error::AssetNotFound(_))
        ));
    }

    #[test]
    fn test_change_color_touches_only_color() {
        let backend = seeded_backend();
        let mut tx = Transaction::begin(&backend);
        let before = read_asset(&tx, "asset4").unwrap();

        change_asset_color(&mut tx, "asset4", "green").unwrap();

        let after = read_asset(&tx, "asset4").unwrap();
        assert_eq!(after.color, "green");
        assert_eq!(after, Asset { color: "green".to_string(), ..before });

        let err = change_asset_color(&mut tx, "asset404", "green").unwrap_err();
        assert_eq!(err.to_string(), "Car not found: asset404");
    }

    #[test]
    fn test_user_id_is_not_an_asset() {
        let backend = seeded_backend();
        let tx = Transaction::begin(&backend);
        assert!(!asset_exists(&tx, "user1").unwrap());
    }
}
