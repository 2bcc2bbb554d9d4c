//! Record encoding
//!
//! Records are stored as JSON with their schema field names, so stored bytes
//! stay self-describing and readable by any client of the world state.

use crate::{Error, Result};
use serde::{de::DeserializeOwned, Serialize};

/// Encode a record stored under `key`
pub fn encode<T: Serialize>(key: &str, record: &T) -> Result<Vec<u8>> {
    serde_json::to_vec(record).map_err(|source| Error::Encode {
        key: key.to_string(),
        source,
    })
}

/// Decode the bytes stored under `key`
pub fn decode<T: DeserializeOwned>(key: &str, bytes: &[u8]) -> Result<T> {
    serde_json::from_slice(bytes).map_err(|source| Error::Decode {
        key: key.to_string(),
        source,
    })
}
