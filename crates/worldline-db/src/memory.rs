//! In-process record store.

use std::collections::BTreeMap;

use crate::error::StoreError;
use crate::keys::RecordKey;
use crate::store::RecordStore;

/// Holds records in memory. Contents are lost when the store is dropped.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    /// Raw JSON per key.
    records: BTreeMap<RecordKey, String>,
    /// When set, every write fails with [`StoreError::ReadOnly`].
    read_only: bool,
}

impl MemoryStore {
    /// An empty, writable store.
    pub const fn new() -> Self {
        Self {
            records: BTreeMap::new(),
            read_only: false,
        }
    }

    /// Make the store reject (or accept again) all writes.
    pub const fn set_read_only(&mut self, read_only: bool) {
        self.read_only = read_only;
    }

    /// Whether writes are currently rejected.
    pub const fn is_read_only(&self) -> bool {
        self.read_only
    }

    /// Number of records present.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether no records are present.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl RecordStore for MemoryStore {
    fn load_raw(&self, key: RecordKey) -> Result<Option<String>, StoreError> {
        Ok(self.records.get(&key).cloned())
    }

    fn save_raw(&mut self, key: RecordKey, json: &str) -> Result<(), StoreError> {
        if self.read_only {
            return Err(StoreError::ReadOnly(key));
        }
        self.records.insert(key, json.to_owned());
        Ok(())
    }

    fn remove(&mut self, key: RecordKey) -> Result<(), StoreError> {
        if self.read_only {
            return Err(StoreError::ReadOnly(key));
        }
        self.records.remove(&key);
        Ok(())
    }
}
