//! Transaction context over the world state
//!
//! A [`Transaction`] reads through to the backend, buffers its own writes and
//! applies them atomically on [`Transaction::commit`]. Reads observe the
//! transaction's own pending writes. Dropping a transaction without
//! committing discards every pending write.

use crate::{
    storage::{KeyValue, StateBackend, StateIterator, WriteSet},
    Result,
};
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Key-value view the contract operates on
pub trait WorldState {
    /// Point lookup; absence is not an error
    fn get_state(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Upsert, full-value replace
    fn put_state(&mut self, key: &str, value: Vec<u8>) -> Result<()>;

    /// Remove a key; silent if absent
    fn del_state(&mut self, key: &str) -> Result<()>;

    /// Ordered scan of `[start, end)`; an empty `end` scans to the end of the keyspace
    fn get_state_by_range(&self, start: &str, end: &str) -> Result<StateIterator<'_>>;
}

/// Buffered transaction against a [`StateBackend`]
pub struct Transaction<'a> {
    backend: &'a dyn StateBackend,
    writes: WriteSet,
    tx_id: Uuid,
    timestamp: DateTime<Utc>,
}

impl<'a> Transaction<'a> {
    /// Begin a transaction
    pub fn begin(backend: &'a dyn StateBackend) -> Self {
        Self {
            backend,
            writes: WriteSet::new(),
            tx_id: Uuid::now_v7(),
            timestamp: Utc::now(),
        }
    }

    /// Transaction ID (UUIDv7, time-ordered)
    pub fn tx_id(&self) -> Uuid {
        self.tx_id
    }

    /// When the transaction began
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Number of pending writes
    pub fn pending_writes(&self) -> usize {
        self.writes.len()
    }

    /// Apply pending writes atomically
    pub fn commit(self) -> Result<()> {
        let count = self.writes.len();
        if count > 0 {
            self.backend.write(self.writes)?;
        }

        tracing::debug!(tx_id = %self.tx_id, writes = count, "Transaction committed");

        Ok(())
    }

    /// Discard pending writes
    pub fn abort(self) {
        tracing::debug!(
            tx_id = %self.tx_id,
            discarded = self.writes.len(),
            "Transaction aborted"
        );
    }
}

impl WorldState for Transaction<'_> {
    fn get_state(&self, key: &str) -> Result<Option<Vec<u8>>> {
        match self.writes.get(key) {
            Some(pending) => Ok(pending.clone()),
            None => self.backend.get(key),
        }
    }

    fn put_state(&mut self, key: &str, value: Vec<u8>) -> Result<()> {
        self.writes.insert(key.to_string(), Some(value));
        Ok(())
    }

    fn del_state(&mut self, key: &str) -> Result<()> {
        self.writes.insert(key.to_string(), None);
        Ok(())
    }

    fn get_state_by_range(&self, start: &str, end: &str) -> Result<StateIterator<'_>> {
        let mut pending = self
            .writes
            .range(start.to_string()..)
            .take_while(|(key, _)| end.is_empty() || key.as_str() < end)
            .peekable();

        // Nothing pending in range: stream straight from the backend
        if pending.peek().is_none() {
            return self.backend.scan(start, end);
        }

        // Overlay pending writes on the committed range
        let mut merged = std::collections::BTreeMap::new();
        for item in self.backend.scan(start, end)? {
            let (key, value) = item?;
            merged.insert(key, value);
        }
        for (key, value) in pending {
            match value {
                Some(bytes) => {
                    merged.insert(key.clone(), bytes.clone());
                }
                None => {
                    merged.remove(key);
                }
            }
        }

        let entries: Vec<KeyValue> = merged.into_iter().collect();
        Ok(StateIterator::from_entries(entries))
    }
}

impl std::fmt::Debug for Transaction<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Transaction")
            .field("tx_id", &self.tx_id)
            .field("timestamp", &self.timestamp)
            .field("pending_writes", &self.writes.len())
            .finish()
    }
}
