//! Ownership transfer

use super::{require_asset, require_user, store_asset, store_user};
use crate::{error::UserRole, transaction::WorldState, types::Settlement, Error, Result};
use rust_decimal::Decimal;
use tracing::{info, instrument};

/// Sell an asset to `new_owner_id` at its settlement price
///
/// A damaged asset only changes hands when the buyer accepts the damages
/// (`with_damage`), in which case the price is discounted by the total damage
/// cost, never below zero. Damages stay on the asset.
#[instrument(skip(state))]
pub fn transfer_asset<S: WorldState + ?Sized>(
    state: &mut S,
    asset_id: &str,
    new_owner_id: &str,
    with_damage: bool,
) -> Result<Settlement> {
    let mut asset = require_asset(state, asset_id)?;

    if asset.owner_id == new_owner_id {
        return Err(Error::SelfTransfer(asset_id.to_string()));
    }

    let mut seller = require_user(state, &asset.owner_id, UserRole::Owner)?;
    let mut buyer = require_user(state, new_owner_id, UserRole::NewOwner)?;

    let price = if !asset.is_damaged() {
        asset.appraised_value
    } else if with_damage {
        (asset.appraised_value - asset.total_damage()).max(Decimal::ZERO)
    } else {
        return Err(Error::UnrepairedDamages(asset_id.to_string()));
    };

    if !buyer.has_sufficient_funds(price) {
        return Err(Error::InsufficientFunds {
            user: buyer.id,
            required: price,
            available: buyer.money,
        });
    }

    asset.owner_id = buyer.id.clone();
    seller.credit(price);
    buyer.debit(price);

    store_user(state, &seller)?;
    store_user(state, &buyer)?;
    store_asset(state, &asset)?;

    info!(seller = %seller.id, buyer = %buyer.id, price = %price, "Asset transferred");

    Ok(Settlement {
        asset_id: asset.id,
        seller: seller.id,
        buyer: buyer.id,
        price,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::test_support::{balance, seeded_backend};
    use crate::contract::{add_damage, read_asset, update_asset};
    use crate::transaction::Transaction;
    use rust_decimal_macros::dec;

    #[test]
    fn test_transfer_undamaged_at_full_value() {
        let backend = seeded_backend();
        let mut tx = Transaction::begin(&backend);

        // asset2: 5000, owned by user2; user1 has 10000
        let settlement = transfer_asset(&mut tx, "asset2", "user1", false).unwrap();
        assert_eq!(settlement.price, dec!(5000));
        assert_eq!(settlement.seller, "user2");
        assert_eq!(settlement.buyer, "user1");

        assert_eq!(read_asset(&tx, "asset2").unwrap().owner_id, "user1");
        assert_eq!(balance(&tx, "user1"), dec!(5000));
        assert_eq!(balance(&tx, "user2"), dec!(10000));
    }

    #[test]
    fn test_transfer_blocked_by_damage() {
        let backend = seeded_backend();
        let mut tx = Transaction::begin(&backend);
        add_damage(&mut tx, "asset2", "scratch", dec!(50)).unwrap();

        let err = transfer_asset(&mut tx, "asset2", "user1", false).unwrap_err();
        assert!(matches!(err, Error::UnrepairedDamages(ref id) if id == "asset2"));
        assert_eq!(read_asset(&tx, "asset2").unwrap().owner_id, "user2");

        let settlement = transfer_asset(&mut tx, "asset2", "user1", true).unwrap();
        assert_eq!(settlement.price, dec!(4950));

        // Damages travel with the asset
        let asset = read_asset(&tx, "asset2").unwrap();
        assert_eq!(asset.owner_id, "user1");
        assert_eq!(asset.damages.len(), 1);
        assert_eq!(balance(&tx, "user1"), dec!(5050));
        assert_eq!(balance(&tx, "user2"), dec!(9950));
    }

    #[test]
    fn test_transfer_conserves_money() {
        let backend = seeded_backend();
        let mut tx = Transaction::begin(&backend);
        add_damage(&mut tx, "asset1", "dent", dec!(123.45)).unwrap();

        let before = balance(&tx, "user1") + balance(&tx, "user3");
        transfer_asset(&mut tx, "asset1", "user3", true).unwrap();
        let after = balance(&tx, "user1") + balance(&tx, "user3");

        assert_eq!(before, after);
    }

    #[test]
    fn test_transfer_rejects_self_transfer() {
        let backend = seeded_backend();
        let mut tx = Transaction::begin(&backend);

        let err = transfer_asset(&mut tx, "asset1", "user1", false).unwrap_err();
        assert!(matches!(err, Error::SelfTransfer(_)));
        assert_eq!(tx.pending_writes(), 0);
    }

    #[test]
    fn test_transfer_insufficient_funds() {
        let backend = seeded_backend();
        let mut tx = Transaction::begin(&backend);

        // asset3: 12000, user3 has 3750
        let err = transfer_asset(&mut tx, "asset3", "user3", false).unwrap_err();
        assert!(matches!(
            err,
            Error::InsufficientFunds { ref user, required, .. }
                if user == "user3" && required == dec!(12000)
        ));
        assert_eq!(tx.pending_writes(), 0);
    }

    #[test]
    fn test_transfer_lookup_failures() {
        let backend = seeded_backend();
        let mut tx = Transaction::begin(&backend);

        let err = transfer_asset(&mut tx, "asset404", "user1", false).unwrap_err();
        assert_eq!(err.to_string(), "Car not found: asset404");

        let err = transfer_asset(&mut tx, "asset1", "user404", false).unwrap_err();
        assert!(matches!(err, Error::UserNotFound { role: UserRole::NewOwner, .. }));

        update_asset(&mut tx, "asset1", "black", "user404", dec!(7000)).unwrap();
        let err = transfer_asset(&mut tx, "asset1", "user2", false).unwrap_err();
        assert!(matches!(err, Error::UserNotFound { role: UserRole::Owner, .. }));
    }

    #[test]
    fn test_high_scale_price_conserves_money_exactly() {
        let backend = seeded_backend();
        let mut tx = Transaction::begin(&backend);
        let price = dec!(0.1234567890123456789);
        update_asset(&mut tx, "asset2", "blue", "user2", price).unwrap();
        transfer_asset(&mut tx, "asset2", "user1", false).unwrap();
        tx.commit().unwrap();

        let tx = Transaction::begin(&backend);
        assert_eq!(balance(&tx, "user1"), dec!(10000) - price);
        assert_eq!(balance(&tx, "user2"), dec!(5000) + price);
        assert_eq!(balance(&tx, "user1") + balance(&tx, "user2"), dec!(15000));
    }

    #[test]
    fn test_discounted_price_never_negative() {
        let backend = seeded_backend();
        let mut tx = Transaction::begin(&backend);
        add_damage(&mut tx, "asset5", "hail", dec!(3000)).unwrap();
        // Value lowered below the recorded damage
        update_asset(&mut tx, "asset5", "black", "user1", dec!(1000)).unwrap();

        let settlement = transfer_asset(&mut tx, "asset5", "user3", true).unwrap();
        assert_eq!(settlement.price, Decimal::ZERO);
        assert_eq!(balance(&tx, "user3"), dec!(3750));
        assert_eq!(balance(&tx, "user1"), dec!(10000));
    }
}
