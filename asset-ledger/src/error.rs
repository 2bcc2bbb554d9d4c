//! Error types for the asset ledger

use rust_decimal::Decimal;
use std::fmt;
use thiserror::Error;

use crate::keys::RecordKind;

/// Result type for ledger operations
pub type Result<T> = std::result::Result<T, Error>;

/// Role a user plays in the operation that failed to find it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserRole {
    /// Plain lookup
    User,
    /// Current owner of an asset
    Owner,
    /// Buyer in a transfer
    NewOwner,
    /// Mechanic settling a repair
    Repairman,
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            UserRole::User => "User",
            UserRole::Owner => "Owner",
            UserRole::NewOwner => "New owner",
            UserRole::Repairman => "Repairman",
        };
        f.write_str(label)
    }
}

/// Ledger errors
#[derive(Error, Debug)]
pub enum Error {
    /// Asset record absent where required
    #[error("Car not found: {0}")]
    AssetNotFound(String),

    /// User record absent where required
    #[error("{role} not found: {id}")]
    UserNotFound {
        /// What the missing user was needed for
        role: UserRole,
        /// Requested user ID
        id: String,
    },

    /// Create collided with an existing record
    #[error("The asset {0} already exists")]
    AlreadyExists(String),

    /// Balance below the settlement or repair cost
    #[error("Insufficient funds for {user}: required {required}, available {available}")]
    InsufficientFunds {
        /// User whose balance is short
        user: String,
        /// Amount the operation needs
        required: Decimal,
        /// Current balance
        available: Decimal,
    },

    /// Transfer blocked until damages are acknowledged or repaired
    #[error("Car has unrepaired damages: {0}")]
    UnrepairedDamages(String),

    /// Transfer to the current owner
    #[error("New owner is same as current owner of {0}")]
    SelfTransfer(String),

    /// ID does not follow the namespace convention of its record kind
    #[error("Invalid {kind} id: {id:?}")]
    InvalidId {
        /// Record kind the ID was meant for
        kind: RecordKind,
        /// Offending ID
        id: String,
    },

    /// Negative or otherwise unusable monetary amount
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    /// Storage error (RocksDB)
    #[error("Storage error: {0}")]
    Storage(String),

    /// Record could not be encoded
    #[error("Failed to encode record {key}: {source}")]
    Encode {
        /// Record ID
        key: String,
        /// Underlying serializer error
        #[source]
        source: serde_json::Error,
    },

    /// Stored bytes could not be decoded
    #[error("Failed to decode record {key}: {source}")]
    Decode {
        /// Record ID
        key: String,
        /// Underlying deserializer error
        #[source]
        source: serde_json::Error,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Metrics registry error
    #[error("Metrics error: {0}")]
    Metrics(#[from] prometheus::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// True for every "record absent" failure
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::AssetNotFound(_) | Error::UserNotFound { .. })
    }
}

impl From<rocksdb::Error> for Error {
    fn from(err: rocksdb::Error) -> Self {
        Error::Storage(err.to_string())
    }
}
