use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::error::StorageError;

/// Injected key-value persistence collaborator.
///
/// The core round-trips one opaque JSON record through this boundary and
/// never treats a failure as fatal; implementations can be a file, an
/// embedded database, or an in-memory fake.
pub trait ProfileStorage {
    fn read(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError>;
    fn write(&mut self, key: &str, bytes: &[u8]) -> Result<(), StorageError>;
}

/// In-memory store. Clones share the same underlying map, so a test can
/// keep a handle and inspect what the profile store persisted.
#[derive(Clone, Default)]
pub struct MemoryStorage {
    records: Arc<Mutex<HashMap<String, Vec<u8>>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn records(&self) -> MutexGuard<'_, HashMap<String, Vec<u8>>> {
        self.records.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl ProfileStorage for MemoryStorage {
    fn read(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        Ok(self.records().get(key).cloned())
    }

    fn write(&mut self, key: &str, bytes: &[u8]) -> Result<(), StorageError> {
        self.records().insert(key.to_string(), bytes.to_vec());
        Ok(())
    }
}

/// File-backed store: one `<key>.json` file per key inside a directory.
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Store under the platform user-data directory (`…/klangnah`).
    pub fn in_user_data_dir() -> Result<Self, StorageError> {
        let base = dirs::data_dir()
            .ok_or_else(|| StorageError::Backend("no user data directory available".to_string()))?;
        Ok(Self::new(base.join("klangnah")))
    }

    fn record_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl ProfileStorage for FileStorage {
    fn read(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        match fs::read(self.record_path(key)) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn write(&mut self, key: &str, bytes: &[u8]) -> Result<(), StorageError> {
        fs::create_dir_all(&self.dir)?;
        fs::write(self.record_path(key), bytes)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn unique_storage_dir() -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("time should move forward")
            .as_nanos();
        std::env::temp_dir().join(format!("klangnah-storage-test-{nanos}"))
    }

    #[test]
    fn memory_storage_round_trips_and_shares_between_clones() {
        let mut storage = MemoryStorage::new();
        let handle = storage.clone();
        storage.write("profiles", b"{}").expect("write should work");
        let read = handle.read("profiles").expect("read should work");
        assert_eq!(read.as_deref(), Some(b"{}".as_slice()));
    }

    #[test]
    fn memory_storage_returns_none_for_missing_key() {
        let storage = MemoryStorage::new();
        assert!(storage.read("missing").expect("read should work").is_none());
    }

    #[test]
    fn file_storage_round_trips() {
        let mut storage = FileStorage::new(unique_storage_dir());
        assert!(storage.read("profiles").expect("read should work").is_none());
        storage
            .write("profiles", br#"{"tv":{}}"#)
            .expect("write should work");
        let read = storage.read("profiles").expect("read should work");
        assert_eq!(read.as_deref(), Some(br#"{"tv":{}}"#.as_slice()));
    }
}
