//! # Key-Value Store Port
//!
//! The minimal `get/set/remove` primitive the engine needs from the platform.
//! Browsers back it with local storage; the runtime backs it with a JSON file;
//! tests use [`InMemoryStore`].

use parking_lot::RwLock;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;
use thiserror::Error;

/// Errors raised by store implementations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    /// Backing medium failed.
    #[error("Storage I/O error: {0}")]
    Io(String),

    /// Stored value could not be encoded or decoded.
    #[error("Storage serialization error: {0}")]
    Serialization(String),

    /// Store not ready (e.g. quota exceeded, not yet opened).
    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

/// Synchronous string key-value store.
pub trait KeyValueStore: Send + Sync {
    /// Read a value.
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Write a value, replacing any previous one.
    fn set(&self, key: &str, value: String) -> Result<(), StoreError>;

    /// Delete a value. Removing a missing key is not an error.
    fn remove(&self, key: &str) -> Result<(), StoreError>;
}

/// JSON helpers over any [`KeyValueStore`].
pub trait KeyValueStoreExt: KeyValueStore {
    /// Read and decode a JSON value.
    fn get_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StoreError> {
        match self.get(key)? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    /// Encode and write a JSON value.
    fn set_json<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<(), StoreError> {
        self.set(key, serde_json::to_string(value)?)
    }
}

impl<S: KeyValueStore + ?Sized> KeyValueStoreExt for S {}

/// Process-local store.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    entries: RwLock<HashMap<String, String>>,
}

impl InMemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys held.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// True if no keys are held.
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// True if `key` is present.
    pub fn contains(&self, key: &str) -> bool {
        self.entries.read().contains_key(key)
    }
}

impl KeyValueStore for InMemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.read().get(key).cloned())
    }

    fn set(&self, key: &str, value: String) -> Result<(), StoreError> {
        self.entries.write().insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.entries.write().remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn test_in_memory_roundtrip() {
        let store = InMemoryStore::new();
        assert!(store.get("k").unwrap().is_none());

        store.set("k", "v".into()).unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some("v"));
        assert_eq!(store.len(), 1);

        store.remove("k").unwrap();
        assert!(store.is_empty());
        store.remove("k").unwrap();
    }

    #[test]
    fn test_json_helpers() {
        let store = InMemoryStore::new();
        let mut map = BTreeMap::new();
        map.insert("t1".to_string(), "d1".to_string());

        store.set_json("verified", &map).unwrap();
        let back: BTreeMap<String, String> = store.get_json("verified").unwrap().unwrap();
        assert_eq!(back, map);
    }

    #[test]
    fn test_corrupt_json_is_serialization_error() {
        let store = InMemoryStore::new();
        store.set("broken", "{not json".into()).unwrap();
        let result: Result<Option<BTreeMap<String, String>>, _> = store.get_json("broken");
        assert!(matches!(result, Err(StoreError::Serialization(_))));
    }
}
