//! In-memory fakes for the storage trait (testing only)
//!
//! Provides `MemoryKeyValueStore` for the happy path and
//! `FailingKeyValueStore` for exercising degraded-persistence behavior
//! (quota exceeded, storage disabled) without a real backend.

use std::collections::HashMap;
use std::sync::Mutex;

use crate::error::{StorageError, StorageResult};
use crate::kv::KeyValueStore;

// ---------------------------------------------------------------------------
// MemoryKeyValueStore
// ---------------------------------------------------------------------------

/// In-memory store backed by a `Mutex<HashMap<String, String>>`.
#[derive(Debug, Default)]
pub struct MemoryKeyValueStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys currently stored.
    pub fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().unwrap().is_empty()
    }
}

impl KeyValueStore for MemoryKeyValueStore {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        let entries = self.entries.lock().unwrap();
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        let mut entries = self.entries.lock().unwrap();
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        let mut entries = self.entries.lock().unwrap();
        entries.remove(key);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// FailingKeyValueStore
// ---------------------------------------------------------------------------

/// Store whose every operation fails with a backend error.
///
/// Reads fail too, matching a browser profile with storage disabled
/// outright rather than merely full.
#[derive(Debug, Default)]
pub struct FailingKeyValueStore;

impl FailingKeyValueStore {
    pub fn new() -> Self {
        Self
    }
}

impl KeyValueStore for FailingKeyValueStore {
    fn get(&self, _key: &str) -> StorageResult<Option<String>> {
        Err(StorageError::Backend("storage disabled".into()))
    }

    fn set(&self, _key: &str, _value: &str) -> StorageResult<()> {
        Err(StorageError::Backend("storage disabled".into()))
    }

    fn remove(&self, _key: &str) -> StorageResult<()> {
        Err(StorageError::Backend("storage disabled".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_roundtrip() {
        let store = MemoryKeyValueStore::new();
        assert_eq!(store.get("k").unwrap(), None);

        store.set("k", "v1").unwrap();
        assert_eq!(store.get("k").unwrap(), Some("v1".to_string()));

        store.set("k", "v2").unwrap();
        assert_eq!(store.get("k").unwrap(), Some("v2".to_string()));

        store.remove("k").unwrap();
        assert_eq!(store.get("k").unwrap(), None);
    }

    #[test]
    fn test_memory_store_remove_absent_is_noop() {
        let store = MemoryKeyValueStore::new();
        store.remove("never-written").unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn test_failing_store_fails_everything() {
        let store = FailingKeyValueStore::new();
        assert!(store.get("k").is_err());
        assert!(store.set("k", "v").is_err());
        assert!(store.remove("k").is_err());
    }
}
