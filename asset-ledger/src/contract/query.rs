//! Enumeration and filtering
//!
//! Listings scan the namespace of the requested record kind and decode every
//! entry in key order. A record that fails to decode aborts the whole listing.

use crate::{
    codec,
    keys::RecordKind,
    transaction::WorldState,
    types::{Asset, User},
    Result,
};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};

/// Asset filter; empty fields match everything
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssetFilter {
    /// Exact color, or empty for any
    pub color: String,
    /// Exact owner ID, or empty for any
    pub owner: String,
}

impl AssetFilter {
    /// Create filter
    pub fn new(color: impl Into<String>, owner: impl Into<String>) -> Self {
        Self {
            color: color.into(),
            owner: owner.into(),
        }
    }

    /// Check if an asset passes both criteria
    pub fn matches(&self, asset: &Asset) -> bool {
        (self.color.is_empty() || asset.color == self.color)
            && (self.owner.is_empty() || asset.owner_id == self.owner)
    }
}

/// Decode every record of `kind` that passes `keep`
fn scan_kind<S, T, F>(state: &S, kind: RecordKind, mut keep: F) -> Result<Vec<T>>
where
    S: WorldState + ?Sized,
    T: DeserializeOwned,
    F: FnMut(&T) -> bool,
{
    let (start, end) = kind.range();
    let mut iter = state.get_state_by_range(&start, &end)?;

    let mut records = Vec::new();
    while iter.has_next() {
        let Some(item) = iter.next() else { break };
        let (key, bytes) = item?;
        let id = kind.id_from_key(&key).unwrap_or(&key);
        let record: T = codec::decode(id, &bytes)?;
        if keep(&record) {
            records.push(record);
        }
    }
    iter.close();

    Ok(records)
}

/// All assets in key order
pub fn list_assets<S: WorldState + ?Sized>(state: &S) -> Result<Vec<Asset>> {
    scan_kind(state, RecordKind::Asset, |_: &Asset| true)
}

/// All users in key order
pub fn list_users<S: WorldState + ?Sized>(state: &S) -> Result<Vec<User>> {
    scan_kind(state, RecordKind::User, |_: &User| true)
}

/// Assets matching `filter`, in key order
#[instrument(skip(state))]
pub fn find_assets<S: WorldState + ?Sized>(state: &S, filter: &AssetFilter) -> Result<Vec<Asset>> {
    let assets = scan_kind(state, RecordKind::Asset, |asset: &Asset| filter.matches(asset))?;
    debug!(matched = assets.len(), "Assets found");
    Ok(assets)
}
