//! Storage layer for the world state
//!
//! # Backends
//!
//! - [`MemoryBackend`] - ordered in-memory map, for tests and embedded use
//! - [`RocksBackend`] - RocksDB column family `state` (key: namespaced record key)
//!
//! Both expose the same contract: point reads, ordered half-open range scans
//! and atomic application of a [`WriteSet`].

use crate::{config::BackendKind, error::{Error, Result}, Config};
use parking_lot::RwLock;
use rocksdb::{ColumnFamily, ColumnFamilyDescriptor, Direction, IteratorMode, Options, WriteBatch, DB};
use std::collections::BTreeMap;
use std::iter::Peekable;
use std::sync::Arc;

/// Column family holding the world state
const CF_STATE: &str = "state";

/// A key and the bytes stored under it
pub type KeyValue = (String, Vec<u8>);

/// Writes staged by a transaction; `None` marks a delete
pub type WriteSet = BTreeMap<String, Option<Vec<u8>>>;

/// Durable key-value store behind the world state
pub trait StateBackend: Send + Sync {
    /// Point lookup; absence is not an error
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Ordered scan of `[start, end)`; an empty `end` scans to the end of the keyspace
    fn scan(&self, start: &str, end: &str) -> Result<StateIterator<'_>>;

    /// Apply all writes atomically
    fn write(&self, writes: WriteSet) -> Result<()>;
}

/// Open the backend selected by the configuration
pub fn open_backend(config: &Config) -> Result<Arc<dyn StateBackend>> {
    match config.backend {
        BackendKind::Memory => Ok(Arc::new(MemoryBackend::new())),
        BackendKind::RocksDb => Ok(Arc::new(RocksBackend::open(config)?)),
    }
}

/// Cursor over a range scan
///
/// Supports the pull protocol (`has_next` / `next`) and explicit `close`.
/// Dropping the cursor on any path releases the underlying store iterator.
pub struct StateIterator<'a> {
    inner: Peekable<Box<dyn Iterator<Item = Result<KeyValue>> + 'a>>,
}

impl<'a> StateIterator<'a> {
    /// Wrap a backend iterator
    pub fn new(iter: impl Iterator<Item = Result<KeyValue>> + 'a) -> Self {
        let boxed: Box<dyn Iterator<Item = Result<KeyValue>> + 'a> = Box::new(iter);
        Self {
            inner: boxed.peekable(),
        }
    }

    /// Cursor over already materialized entries
    pub fn from_entries(entries: Vec<KeyValue>) -> Self {
        Self::new(entries.into_iter().map(Ok))
    }

    /// Check if another entry (or error) is pending
    pub fn has_next(&mut self) -> bool {
        self.inner.peek().is_some()
    }

    /// Release the cursor
    pub fn close(self) {
        drop(self);
    }
}

impl Iterator for StateIterator<'_> {
    type Item = Result<KeyValue>;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }
}

impl std::fmt::Debug for StateIterator<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StateIterator").finish_non_exhaustive()
    }
}

/// Check `key < end` for a half-open scan with optional upper bound
fn before_end(key: &str, end: &str) -> bool {
    end.is_empty() || key < end
}

// In-memory backend

/// Ordered in-memory world state
#[derive(Debug, Default)]
pub struct MemoryBackend {
    entries: RwLock<BTreeMap<String, Vec<u8>>>,
}

impl MemoryBackend {
    /// Create empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Check if the store is empty
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl StateBackend for MemoryBackend {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.entries.read().get(key).cloned())
    }

    fn scan(&self, start: &str, end: &str) -> Result<StateIterator<'_>> {
        // Snapshot the range so the read lock is not held by the cursor
        let entries: Vec<KeyValue> = self
            .entries
            .read()
            .range(start.to_string()..)
            .take_while(|(key, _)| before_end(key, end))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();

        Ok(StateIterator::from_entries(entries))
    }

    fn write(&self, writes: WriteSet) -> Result<()> {
        let mut entries = self.entries.write();
        for (key, value) in writes {
            match value {
                Some(bytes) => {
                    entries.insert(key, bytes);
                }
                None => {
                    entries.remove(&key);
                }
            }
        }
        Ok(())
    }
}

// RocksDB backend

/// World state persisted in RocksDB
pub struct RocksBackend {
    db: Arc<DB>,
}

impl std::fmt::Debug for RocksBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RocksBackend")
            .field("path", &self.db.path())
            .finish()
    }
}

impl RocksBackend {
    /// Open or create database
    pub fn open(config: &Config) -> Result<Self> {
        let path = &config.data_dir;

        // Create directory if not exists
        std::fs::create_dir_all(path)?;

        let mut db_opts = Options::default();
        db_opts.create_if_missing(true);
        db_opts.create_missing_column_families(true);

        // Tuning from config
        db_opts.set_write_buffer_size(config.rocksdb.write_buffer_size_mb * 1024 * 1024);
        db_opts.set_max_write_buffer_number(config.rocksdb.max_write_buffer_number);
        db_opts.set_max_background_jobs(config.rocksdb.max_background_jobs);

        if config.rocksdb.enable_statistics {
            db_opts.enable_statistics();
        }

        let cf_descriptors = vec![ColumnFamilyDescriptor::new(
            CF_STATE,
            Self::cf_options_state(),
        )];

        let db = DB::open_cf_descriptors(&db_opts, path, cf_descriptors)?;

        tracing::info!(path = ?path, "Opened RocksDB world state");

        Ok(Self { db: Arc::new(db) })
    }

    fn cf_options_state() -> Options {
        let mut opts = Options::default();
        // State is frequently read, use LZ4 for speed
        opts.set_compression_type(rocksdb::DBCompressionType::Lz4);
        opts
    }

    fn cf_handle(&self) -> Result<&ColumnFamily> {
        self.db
            .cf_handle(CF_STATE)
            .ok_or_else(|| Error::Storage(format!("Column family {} not found", CF_STATE)))
    }

    /// Close database (graceful shutdown)
    pub fn close(self) -> Result<()> {
        drop(self.db);
        tracing::info!("RocksDB closed gracefully");
        Ok(())
    }
}

impl StateBackend for RocksBackend {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let cf = self.cf_handle()?;
        Ok(self.db.get_cf(cf, key.as_bytes())?)
    }

    fn scan(&self, start: &str, end: &str) -> Result<StateIterator<'_>> {
        let cf = self.cf_handle()?;
        let end = end.to_string();

        let iter = self
            .db
            .iterator_cf(cf, IteratorMode::From(start.as_bytes(), Direction::Forward))
            .map(|item| -> Result<KeyValue> {
                let (key, value) = item?;
                let key = String::from_utf8(key.into_vec())
                    .map_err(|e| Error::Storage(format!("Non UTF-8 key in world state: {}", e)))?;
                Ok((key, value.into_vec()))
            })
            .take_while(move |item| match item {
                Ok((key, _)) => before_end(key, &end),
                Err(_) => true,
            });

        Ok(StateIterator::new(iter))
    }

    fn write(&self, writes: WriteSet) -> Result<()> {
        let cf = self.cf_handle()?;
        let mut batch = WriteBatch::default();

        for (key, value) in &writes {
            match value {
                Some(bytes) => batch.put_cf(cf, key.as_bytes(), bytes),
                None => batch.delete_cf(cf, key.as_bytes()),
            }
        }

        // Atomic commit
        self.db.write(batch)?;

        tracing::debug!(writes = writes.len(), "Write set committed");

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn test_config() -> (Config, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let mut config = Config::default();
        config.data_dir = temp_dir.path().to_path_buf();
        config.backend = BackendKind::RocksDb;
        (config, temp_dir)
    }

    fn put(key: &str, value: &str) -> WriteSet {
        let mut writes = WriteSet::new();
        writes.insert(key.to_string(), Some(value.as_bytes().to_vec()));
        writes
    }

    fn keys(iter: StateIterator<'_>) -> Vec<String> {
        iter.map(|item| item.unwrap().0).collect()
    }

    fn check_range_semantics(backend: &dyn StateBackend) {
        let mut writes = WriteSet::new();
        for key in ["asset1", "asset2", "assez", "user", "user1", "zeta"] {
            writes.insert(key.to_string(), Some(key.as_bytes().to_vec()));
        }
        backend.write(writes).unwrap();

        // Half-open: end key excluded
        assert_eq!(
            keys(backend.scan("asset", "user").unwrap()),
            vec!["asset1", "asset2", "assez"]
        );
        // Empty end scans to the end of the keyspace
        assert_eq!(
            keys(backend.scan("user", "").unwrap()),
            vec!["user", "user1", "zeta"]
        );
        assert!(keys(backend.scan("b", "c").unwrap()).is_empty());
    }

    #[test]
    fn test_memory_get_put_delete() {
        let backend = MemoryBackend::new();
        assert!(backend.get("asset1").unwrap().is_none());

        backend.write(put("asset1", "v1")).unwrap();
        assert_eq!(backend.get("asset1").unwrap(), Some(b"v1".to_vec()));

        let mut delete = WriteSet::new();
        delete.insert("asset1".to_string(), None);
        delete.insert("missing".to_string(), None);
        backend.write(delete).unwrap();

        assert!(backend.get("asset1").unwrap().is_none());
        assert!(backend.is_empty());
    }

    #[test]
    fn test_memory_range_semantics() {
        check_range_semantics(&MemoryBackend::new());
    }

    #[test]
    fn test_rocks_range_semantics() {
        let (config, _temp) = test_config();
        let backend = RocksBackend::open(&config).unwrap();
        check_range_semantics(&backend);
    }

    #[test]
    fn test_rocks_persists_across_reopen() {
        let (config, _temp) = test_config();
        {
            let backend = RocksBackend::open(&config).unwrap();
            backend.write(put("user1", "marko")).unwrap();
            backend.close().unwrap();
        }

        let backend = RocksBackend::open(&config).unwrap();
        assert_eq!(backend.get("user1").unwrap(), Some(b"marko".to_vec()));
    }

    #[test]
    fn test_iterator_pull_protocol() {
        let backend = MemoryBackend::new();
        backend.write(put("asset1", "a")).unwrap();

        let mut iter = backend.scan("asset", "user").unwrap();
        assert!(iter.has_next());
        let (key, value) = iter.next().unwrap().unwrap();
        assert_eq!(key, "asset1");
        assert_eq!(value, b"a".to_vec());
        assert!(!iter.has_next());
        iter.close();
    }
}
