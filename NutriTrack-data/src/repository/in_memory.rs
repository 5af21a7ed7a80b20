use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use super::errors::RepositoryError;
use super::key_value::KeyValueStore;
use crate::models::StorageKey;

/// In-memory key-value store
#[derive(Debug, Clone, Default)]
pub struct InMemoryStorage {
    entries: Arc<Mutex<HashMap<StorageKey, String>>>,
    fail_writes: Arc<AtomicBool>,
}

impl InMemoryStorage {
    /// Create a new in-memory storage
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent `put` fail, the way a full or read-only
    /// medium would
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Keys currently holding a value
    pub fn keys(&self) -> Result<Vec<StorageKey>, RepositoryError> {
        let store = self.entries.lock().map_err(|e| RepositoryError::Lock(e.to_string()))?;
        let mut keys: Vec<StorageKey> = store.keys().copied().collect();
        keys.sort();
        Ok(keys)
    }
}

impl KeyValueStore for InMemoryStorage {
    fn get(&self, key: StorageKey) -> Result<Option<String>, RepositoryError> {
        let store = self.entries.lock().map_err(|e| RepositoryError::Lock(e.to_string()))?;
        Ok(store.get(&key).cloned())
    }

    fn put(&self, key: StorageKey, value: &str) -> Result<(), RepositoryError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(RepositoryError::WriteRejected(format!("{} is read-only", key)));
        }
        let mut store = self.entries.lock().map_err(|e| RepositoryError::Lock(e.to_string()))?;
        store.insert(key, value.to_string());
        Ok(())
    }

    fn remove(&self, key: StorageKey) -> Result<(), RepositoryError> {
        let mut store = self.entries.lock().map_err(|e| RepositoryError::Lock(e.to_string()))?;
        store.remove(&key);
        Ok(())
    }
}
