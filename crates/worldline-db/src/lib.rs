//! Record store for the Worldline progression engine.
//!
//! The engine persists a handful of JSON records (the progression snapshot
//! and one list per collection) in a key-value store. Every record is read
//! once at startup and rewritten whole after each change.
//!
//! ```text
//! Lab action
//!     |
//!     +-- save_json(RecordKey::GameState, &state) --> RecordStore
//!                                                      |-- MemoryStore (tests)
//!                                                      +-- FileStore   (<data_dir>/<key>.json)
//! ```
//!
//! # Modules
//!
//! - [`error`] -- Shared error types ([`StoreError`])
//! - [`file`] -- One JSON file per record, written atomically ([`FileStore`])
//! - [`keys`] -- The fixed set of record keys ([`RecordKey`])
//! - [`memory`] -- In-process store ([`MemoryStore`])
//! - [`store`] -- The [`RecordStore`] trait and its typed JSON helpers

pub mod error;
pub mod file;
pub mod keys;
pub mod memory;
pub mod store;

// Re-export primary types for convenience.
pub use error::StoreError;
pub use file::FileStore;
pub use keys::RecordKey;
pub use memory::MemoryStore;
pub use store::RecordStore;
