//! Main ledger orchestration layer
//!
//! [`Ledger`] owns the world state backend and runs every contract operation
//! inside its own [`Transaction`]. Write transactions are serialized by a
//! single-writer lock and commit only when the operation succeeds; a failed
//! operation leaves the world state exactly as it was.
//!
//! # Example
//!
//! ```no_run
//! use asset_ledger::{contract::Genesis, Config, Ledger};
//!
//! fn main() -> asset_ledger::Result<()> {
//!     let ledger = Ledger::open(Config::default())?;
//!     ledger.init_ledger(&Genesis::default())?;
//!
//!     let settlement = ledger.transfer_asset("asset2", "user1", false)?;
//!     println!("{} paid {}", settlement.buyer, settlement.price);
//!
//!     Ok(())
//! }
//! ```

use crate::{
    contract::{self, AssetFilter, Genesis, NewAsset},
    metrics::Metrics,
    storage::{open_backend, StateBackend},
    transaction::Transaction,
    types::{Asset, DamageOutcome, Settlement, User},
    Config, Result,
};
use parking_lot::Mutex;
use rust_decimal::Decimal;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info_span, warn};

/// Main ledger interface
pub struct Ledger {
    /// World state backend
    backend: Arc<dyn StateBackend>,

    /// Single-writer lock
    writer: Mutex<()>,

    /// Transaction metrics
    metrics: Metrics,

    /// Configuration
    config: Config,
}

impl std::fmt::Debug for Ledger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ledger")
            .field("backend", &self.config.backend)
            .field("data_dir", &self.config.data_dir)
            .finish_non_exhaustive()
    }
}

impl Ledger {
    /// Open ledger with configuration
    pub fn open(config: Config) -> Result<Self> {
        let backend = open_backend(&config)?;
        Self::with_backend(config, backend)
    }

    /// Build a ledger over an already opened backend
    pub fn with_backend(config: Config, backend: Arc<dyn StateBackend>) -> Result<Self> {
        Ok(Self {
            backend,
            writer: Mutex::new(()),
            metrics: Metrics::new()?,
            config,
        })
    }

    /// Run `op` in a write transaction, committing only on success
    fn execute<T>(
        &self,
        operation: &'static str,
        op: impl FnOnce(&mut Transaction<'_>) -> Result<T>,
    ) -> Result<T> {
        let _writer = self.writer.lock();
        let start = Instant::now();

        let mut tx = Transaction::begin(self.backend.as_ref());
        let span = info_span!(
            "transaction",
            operation,
            tx_id = %tx.tx_id(),
            timestamp = %tx.timestamp()
        );
        let _enter = span.enter();

        let result = match op(&mut tx) {
            Ok(value) => tx.commit().map(|()| value),
            Err(err) => {
                tx.abort();
                Err(err)
            }
        };

        self.finish(operation, start, &result);
        result
    }

    /// Run a read-only `op` against committed state
    fn query<T>(
        &self,
        operation: &'static str,
        op: impl FnOnce(&Transaction<'_>) -> Result<T>,
    ) -> Result<T> {
        let start = Instant::now();
        let tx = Transaction::begin(self.backend.as_ref());
        let result = op(&tx);
        tx.abort();

        self.finish(operation, start, &result);
        result
    }

    fn finish<T>(&self, operation: &'static str, start: Instant, result: &Result<T>) {
        let elapsed = start.elapsed().as_secs_f64();
        self.metrics
            .record_transaction(operation, result.is_ok(), elapsed);

        match result {
            Ok(_) => debug!(operation, elapsed, "Operation succeeded"),
            Err(err) if err.is_not_found() => debug!(operation, error = %err, "Operation failed"),
            Err(err) => warn!(operation, error = %err, "Operation failed"),
        }
    }

    /// Seed the world state
    pub fn init_ledger(&self, genesis: &Genesis) -> Result<()> {
        self.execute("init_ledger", |tx| contract::init_ledger(tx, genesis))
    }

    /// Issue a new asset
    pub fn create_asset(&self, new: NewAsset) -> Result<Asset> {
        self.execute("create_asset", |tx| contract::create_asset(tx, new))
    }

    /// Read an asset
    pub fn read_asset(&self, id: &str) -> Result<Asset> {
        self.query("read_asset", |tx| contract::read_asset(tx, id))
    }

    /// Update color, owner and appraised value of an asset
    pub fn update_asset(
        &self,
        id: &str,
        color: &str,
        owner_id: &str,
        appraised_value: Decimal,
    ) -> Result<Asset> {
        self.execute("update_asset", |tx| {
            contract::update_asset(tx, id, color, owner_id, appraised_value)
        })
    }

    /// Delete an asset
    pub fn delete_asset(&self, id: &str) -> Result<()> {
        self.execute("delete_asset", |tx| contract::delete_asset(tx, id))
    }

    /// Check if an asset exists
    pub fn asset_exists(&self, id: &str) -> Result<bool> {
        self.query("asset_exists", |tx| contract::asset_exists(tx, id))
    }

    /// Repaint an asset
    pub fn change_asset_color(&self, id: &str, color: &str) -> Result<Asset> {
        self.execute("change_asset_color", |tx| {
            contract::change_asset_color(tx, id, color)
        })
    }

    /// Read a user
    pub fn read_user(&self, id: &str) -> Result<User> {
        self.query("read_user", |tx| contract::read_user(tx, id))
    }

    /// Check if a user exists
    pub fn user_exists(&self, id: &str) -> Result<bool> {
        self.query("user_exists", |tx| contract::user_exists(tx, id))
    }

    /// Record a damage; a total loss deletes the asset
    pub fn add_damage(&self, asset_id: &str, description: &str, cost: Decimal) -> Result<DamageOutcome> {
        let outcome = self.execute("add_damage", |tx| {
            contract::add_damage(tx, asset_id, description, cost)
        })?;

        if matches!(outcome, DamageOutcome::WrittenOff { .. }) {
            self.metrics.record_write_off();
        }

        Ok(outcome)
    }

    /// Settle all damages of an asset with a mechanic
    pub fn repair_damages(&self, asset_id: &str, mechanic_id: &str) -> Result<Decimal> {
        self.execute("repair_damages", |tx| {
            contract::repair_damages(tx, asset_id, mechanic_id)
        })
    }

    /// Sell an asset to a new owner
    pub fn transfer_asset(
        &self,
        asset_id: &str,
        new_owner_id: &str,
        with_damage: bool,
    ) -> Result<Settlement> {
        self.execute("transfer_asset", |tx| {
            contract::transfer_asset(tx, asset_id, new_owner_id, with_damage)
        })
    }

    /// All assets in key order
    pub fn list_assets(&self) -> Result<Vec<Asset>> {
        self.query("list_assets", |tx| contract::list_assets(tx))
    }

    /// All users in key order
    pub fn list_users(&self) -> Result<Vec<User>> {
        self.query("list_users", |tx| contract::list_users(tx))
    }

    /// Assets matching a color/owner filter
    pub fn find_assets(&self, filter: &AssetFilter) -> Result<Vec<Asset>> {
        self.query("find_assets", |tx| contract::find_assets(tx, filter))
    }

    /// Get metrics
    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    /// Get configuration
    pub fn config(&self) -> &Config {
        &self.config
    }
}
