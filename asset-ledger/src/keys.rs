//! World state keyspace
//!
//! Every record lives under an explicit namespace for its kind:
//!
//! ```text
//! asset \0 asset1      -> Asset JSON
//! user  \0 user1       -> User JSON
//! ```
//!
//! Listing a kind scans `[ns \0, ns \1)`, which contains exactly the keys of
//! that namespace regardless of how the IDs themselves sort.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Separator between namespace and record ID
const SEPARATOR: char = '\u{0}';

/// Upper bound of a namespace scan (separator + 1)
const SEPARATOR_END: char = '\u{1}';

/// Kind of record stored in the world state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RecordKind {
    /// Vehicle
    Asset,
    /// Owner, buyer or mechanic
    User,
}

impl RecordKind {
    /// Namespace, also the reserved ID prefix of the kind
    pub fn namespace(&self) -> &'static str {
        match self {
            RecordKind::Asset => "asset",
            RecordKind::User => "user",
        }
    }

    /// Storage key of a record of this kind
    pub fn key(&self, id: &str) -> String {
        let mut key = String::with_capacity(self.namespace().len() + 1 + id.len());
        key.push_str(self.namespace());
        key.push(SEPARATOR);
        key.push_str(id);
        key
    }

    /// Half-open key range `[start, end)` covering the whole namespace
    pub fn range(&self) -> (String, String) {
        let ns = self.namespace();
        (format!("{ns}{SEPARATOR}"), format!("{ns}{SEPARATOR_END}"))
    }

    /// Recover the record ID from a storage key of this kind
    pub fn id_from_key<'k>(&self, key: &'k str) -> Option<&'k str> {
        key.strip_prefix(self.namespace())?.strip_prefix(SEPARATOR)
    }

    /// Check that `id` follows the naming convention of this kind
    pub fn validate_id(&self, id: &str) -> Result<()> {
        if !id.starts_with(self.namespace()) || id.contains(SEPARATOR) {
            return Err(Error::InvalidId {
                kind: *self,
                id: id.to_string(),
            });
        }
        Ok(())
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.namespace())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_round_trip() {
        let key = RecordKind::Asset.key("asset7");
        assert_eq!(RecordKind::Asset.id_from_key(&key), Some("asset7"));
        assert_eq!(RecordKind::User.id_from_key(&key), None);
    }

    #[test]
    fn test_range_contains_only_its_namespace() {
        let (start, end) = RecordKind::Asset.range();
        let inside = RecordKind::Asset.key("asset99");
        let user = RecordKind::User.key("user1");

        assert!(start <= inside && inside < end);
        assert!(!(start <= user && user < end));

        // IDs sorting anywhere stay inside their namespace
        let odd = RecordKind::User.key("user~zzz");
        let (ustart, uend) = RecordKind::User.range();
        assert!(ustart <= odd && odd < uend);
    }

    #[test]
    fn test_validate_id() {
        assert!(RecordKind::Asset.validate_id("asset1").is_ok());
        assert!(RecordKind::User.validate_id("user42").is_ok());

        assert!(matches!(
            RecordKind::Asset.validate_id("car1"),
            Err(Error::InvalidId { kind: RecordKind::Asset, .. })
        ));
        assert!(RecordKind::User.validate_id("asset1").is_err());
        assert!(RecordKind::Asset.validate_id("asset\u{0}x").is_err());
    }
}
