//! One JSON file per record in a data directory.
//!
//! Writes go to `<key>.json.tmp` first and are renamed over `<key>.json`,
//! so a reader never sees a torn record.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::StoreError;
use crate::keys::RecordKey;
use crate::store::RecordStore;

/// A directory-backed record store.
#[derive(Debug, Clone)]
pub struct FileStore {
    /// Directory holding the record files.
    dir: PathBuf,
}

impl FileStore {
    /// Open (creating if needed) the data directory at `dir`.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir).map_err(|source| StoreError::DataDir {
            path: dir.display().to_string(),
            source,
        })?;
        tracing::info!(dir = %dir.display(), "record store opened");
        Ok(Self { dir })
    }

    /// The data directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the file holding `key`.
    pub fn path_for(&self, key: RecordKey) -> PathBuf {
        self.dir.join(format!("{}.json", key.as_str()))
    }

    fn temp_path_for(&self, key: RecordKey) -> PathBuf {
        self.dir.join(format!("{}.json.tmp", key.as_str()))
    }
}

impl RecordStore for FileStore {
    fn load_raw(&self, key: RecordKey) -> Result<Option<String>, StoreError> {
        match std::fs::read_to_string(self.path_for(key)) {
            Ok(json) => Ok(Some(json)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StoreError::Io { key, source }),
        }
    }

    fn save_raw(&mut self, key: RecordKey, json: &str) -> Result<(), StoreError> {
        let tmp = self.temp_path_for(key);
        std::fs::write(&tmp, json).map_err(|source| StoreError::Io { key, source })?;
        std::fs::rename(&tmp, self.path_for(key)).map_err(|source| StoreError::Io { key, source })?;
        tracing::debug!(key = %key, bytes = json.len(), "record saved");
        Ok(())
    }

    fn remove(&mut self, key: RecordKey) -> Result<(), StoreError> {
        match std::fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(source) => Err(StoreError::Io { key, source }),
        }
    }
}
