use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{error, warn};

use super::errors::RepositoryError;
use crate::models::StorageKey;

/// Durable string blobs addressed by [`StorageKey`].
///
/// Implementations are synchronous: reading or writing local state never
/// yields to the async runtime.
pub trait KeyValueStore: Send + Sync + fmt::Debug {
    /// Raw value for a key, `None` when absent
    fn get(&self, key: StorageKey) -> Result<Option<String>, RepositoryError>;

    /// Insert or overwrite a value
    fn put(&self, key: StorageKey, value: &str) -> Result<(), RepositoryError>;

    /// Delete a key. Removing an absent key is not an error.
    fn remove(&self, key: StorageKey) -> Result<(), RepositoryError>;

    /// Existence check that does not look at the content
    fn contains(&self, key: StorageKey) -> Result<bool, RepositoryError> {
        Ok(self.get(key)?.is_some())
    }
}

/// Typed JSON view over one key of a [`KeyValueStore`].
///
/// Loading never fails: an absent key or an unreadable blob yields
/// `T::default()`. Saving is best effort and only logs failures.
pub struct DomainStore<T> {
    backend: Arc<dyn KeyValueStore>,
    key: StorageKey,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Clone for DomainStore<T> {
    fn clone(&self) -> Self {
        Self {
            backend: Arc::clone(&self.backend),
            key: self.key,
            _marker: PhantomData,
        }
    }
}

impl<T> fmt::Debug for DomainStore<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DomainStore").field("key", &self.key).finish()
    }
}

impl<T> DomainStore<T>
where
    T: Serialize + DeserializeOwned + Default,
{
    pub fn new(backend: Arc<dyn KeyValueStore>, key: StorageKey) -> Self {
        Self {
            backend,
            key,
            _marker: PhantomData,
        }
    }

    pub fn key(&self) -> StorageKey {
        self.key
    }

    /// Load the blob, or the default when it is missing or unreadable
    pub fn load(&self) -> T {
        self.load_as::<T>()
    }

    /// Load the blob under a different shape, e.g. a legacy layout that
    /// still needs migrating into `T`
    pub fn load_as<U>(&self) -> U
    where
        U: DeserializeOwned + Default,
    {
        match self.try_load_as::<U>() {
            Ok(Some(value)) => value,
            Ok(None) => U::default(),
            Err(e) => {
                error!("Failed to load {}: {}, using defaults", self.key, e);
                U::default()
            }
        }
    }

    /// Strict variant of [`DomainStore::load`]
    pub fn try_load(&self) -> Result<Option<T>, RepositoryError> {
        self.try_load_as::<T>()
    }

    fn try_load_as<U: DeserializeOwned>(&self) -> Result<Option<U>, RepositoryError> {
        match self.backend.get(self.key)? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    /// Persist the value, logging instead of failing
    pub fn save(&self, value: &T) {
        if let Err(e) = self.try_save(value) {
            warn!("Failed to save {}: {}", self.key, e);
        }
    }

    /// Strict variant of [`DomainStore::save`]
    pub fn try_save(&self, value: &T) -> Result<(), RepositoryError> {
        let raw = serde_json::to_string(value)?;
        self.backend.put(self.key, &raw)
    }

    /// Whether anything has ever been persisted under this key
    pub fn exists(&self) -> bool {
        match self.backend.contains(self.key) {
            Ok(found) => found,
            Err(e) => {
                warn!("Failed to check {}: {}", self.key, e);
                false
            }
        }
    }

    /// Remove the blob
    pub fn clear(&self) {
        if let Err(e) = self.backend.remove(self.key) {
            warn!("Failed to remove {}: {}", self.key, e);
        }
    }
}
