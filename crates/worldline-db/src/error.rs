//! Error types for the record store.

use crate::keys::RecordKey;

/// Errors that can occur reading or writing records.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A filesystem operation failed.
    #[error("I/O error on record '{key}': {source}")]
    Io {
        /// The record being accessed.
        key: RecordKey,
        /// The underlying error.
        source: std::io::Error,
    },

    /// The data directory could not be prepared.
    #[error("cannot open data directory '{path}': {source}")]
    DataDir {
        /// The directory path.
        path: String,
        /// The underlying error.
        source: std::io::Error,
    },

    /// A serialization or deserialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The store rejects writes.
    #[error("store is read-only, cannot write '{0}'")]
    ReadOnly(RecordKey),
}
