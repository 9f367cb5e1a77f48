//! In-memory storage for testing.
//!
//! Values live in a `BTreeMap` behind a `RwLock` and are lost when the
//! process exits. Clones share the same map, which lets a test keep a handle
//! on the medium while a session store owns another.

use std::collections::BTreeMap;
use std::sync::{Arc, PoisonError, RwLock};

use crate::{SessionStorage, StorageError};

/// An in-memory storage medium backed by a `BTreeMap`.
///
/// # Examples
///
/// ```
/// # use onlyconfig_storage::{MemoryStorage, SessionStorage};
/// let storage = MemoryStorage::new();
/// storage.set_item("onlyconfig.user", "{}").unwrap();
/// assert_eq!(storage.get_item("onlyconfig.user").unwrap().as_deref(), Some("{}"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    data: Arc<RwLock<BTreeMap<String, String>>>,
}

impl MemoryStorage {
    /// Create a new empty in-memory medium.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys currently stored.
    pub fn len(&self) -> usize {
        self.data
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Whether no key is stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl SessionStorage for MemoryStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        let data = self.data.read().unwrap_or_else(PoisonError::into_inner);
        Ok(data.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut data = self.data.write().unwrap_or_else(PoisonError::into_inner);
        data.insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        let mut data = self.data.write().unwrap_or_else(PoisonError::into_inner);
        data.remove(key);
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn get_missing_returns_none() {
        let storage = MemoryStorage::new();
        assert_eq!(storage.get_item("does.not.exist").unwrap(), None);
    }

    #[test]
    fn set_overwrites_existing() {
        let storage = MemoryStorage::new();
        storage.set_item("key", "v1").unwrap();
        storage.set_item("key", "v2").unwrap();
        assert_eq!(storage.get_item("key").unwrap().as_deref(), Some("v2"));
        assert_eq!(storage.len(), 1);
    }

    #[test]
    fn remove_missing_is_noop() {
        let storage = MemoryStorage::new();
        storage.remove_item("key").unwrap();
        storage.remove_item("key").unwrap();
        assert!(storage.is_empty());
    }

    #[test]
    fn clones_share_data() {
        let storage = MemoryStorage::new();
        let other = storage.clone();
        storage.set_item("key", "val").unwrap();
        assert_eq!(other.get_item("key").unwrap().as_deref(), Some("val"));
    }
}
