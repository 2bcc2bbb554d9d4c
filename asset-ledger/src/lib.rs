//! Asset Ledger
//!
//! Vehicle and user ledger kept as a state machine over an ordered key-value
//! world state.
//!
//! # Architecture
//!
//! - **Contract**: Stateless operations over a [`transaction::WorldState`]
//! - **Transactions**: Buffered write sets, applied atomically on commit
//! - **Single Writer**: One transaction commits before the next begins
//! - **Namespaces**: Assets and users live in disjoint key ranges
//!
//! # Invariants
//!
//! - Money conservation: transfers and repairs move money, never create it
//! - Existence: a successful create is visible to read, a delete is not
//! - Atomicity: a failed operation leaves the world state unchanged

#![forbid(unsafe_code)]
#![warn(
    missing_docs,
    rust_2018_idioms,
    missing_debug_implementations,
    clippy::all
)]

pub mod codec;
pub mod config;
pub mod contract;
pub mod error;
pub mod keys;
pub mod ledger;
pub mod metrics;
pub mod storage;
pub mod transaction;
pub mod types;

// Re-exports
pub use config::Config;
pub use error::{Error, Result};
pub use ledger::Ledger;
pub use types::{Asset, Damage, DamageOutcome, Settlement, User};
