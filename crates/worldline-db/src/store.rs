//! The [`RecordStore`] trait.
//!
//! Implementations move raw JSON strings; the provided methods add typed
//! serialization on top. A record that is absent is `Ok(None)`, never an
//! error.

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::StoreError;
use crate::keys::RecordKey;

/// A key-value store holding one JSON document per [`RecordKey`].
pub trait RecordStore {
    /// Read the raw JSON at `key`, or `None` if it was never written.
    fn load_raw(&self, key: RecordKey) -> Result<Option<String>, StoreError>;

    /// Replace the record at `key` with `json`.
    fn save_raw(&mut self, key: RecordKey, json: &str) -> Result<(), StoreError>;

    /// Delete the record at `key`. Deleting an absent record succeeds.
    fn remove(&mut self, key: RecordKey) -> Result<(), StoreError>;

    /// Serialize `value` as JSON and store it at `key`.
    fn save_json<T: Serialize>(&mut self, key: RecordKey, value: &T) -> Result<(), StoreError>
    where
        Self: Sized,
    {
        let json = serde_json::to_string(value)?;
        self.save_raw(key, &json)
    }

    /// Read the record at `key` and deserialize it.
    fn load_json<T: DeserializeOwned>(&self, key: RecordKey) -> Result<Option<T>, StoreError>
    where
        Self: Sized,
    {
        self.load_raw(key)?
            .map(|json| serde_json::from_str(&json).map_err(StoreError::from))
            .transpose()
    }

    /// Read the record at `key`, treating an absent, unreadable, or corrupt
    /// record as `T::default()`. Failures are logged at `warn`.
    fn load_or_default<T: DeserializeOwned + Default>(&self, key: RecordKey) -> T
    where
        Self: Sized,
    {
        match self.load_json(key) {
            Ok(Some(value)) => value,
            Ok(None) => T::default(),
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "discarding unreadable record");
                T::default()
            }
        }
    }
}
