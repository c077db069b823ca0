//! # Device Registry
//!
//! Lazily creates the device identity on first need and returns the same
//! identity forever after.

use shared_store::{KeyValueStore, KeyValueStoreExt, StoreError};
use shared_types::keys::DEVICE_IDENTITY_KEY;
use shared_types::{DeviceIdentity, DeviceProfile};
use std::sync::Arc;
use tracing::info;

/// Persistent device identity.
pub struct DeviceRegistry {
    store: Arc<dyn KeyValueStore>,
    profile: DeviceProfile,
}

impl DeviceRegistry {
    /// Registry describing this device with `profile`.
    pub fn new(store: Arc<dyn KeyValueStore>, profile: DeviceProfile) -> Self {
        Self { store, profile }
    }

    /// Replace the profile used when the identity is first created.
    pub fn with_profile(mut self, profile: DeviceProfile) -> Self {
        self.profile = profile;
        self
    }

    /// Stored identity, without creating one.
    pub fn get(&self) -> Result<Option<DeviceIdentity>, StoreError> {
        self.store.get_json(DEVICE_IDENTITY_KEY)
    }

    /// Stored identity, creating and persisting it on first call.
    pub fn get_or_create(&self) -> Result<DeviceIdentity, StoreError> {
        if let Some(identity) = self.get()? {
            return Ok(identity);
        }
        let identity = DeviceIdentity::generate(self.profile.clone());
        self.store.set_json(DEVICE_IDENTITY_KEY, &identity)?;
        info!(device_id = %identity.device_id, "[fc-02] Created device identity");
        Ok(identity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_store::InMemoryStore;

    #[test]
    fn test_identity_created_once() {
        let store = Arc::new(InMemoryStore::new());
        let registry = DeviceRegistry::new(store.clone(), DeviceProfile::default());
        assert!(registry.get().unwrap().is_none());

        let first = registry.get_or_create().unwrap();
        let second = registry.get_or_create().unwrap();
        assert_eq!(first, second);

        let reopened = DeviceRegistry::new(store, DeviceProfile::default());
        assert_eq!(reopened.get_or_create().unwrap(), first);
    }

    #[test]
    fn test_corrupt_identity_is_an_error() {
        let store = Arc::new(InMemoryStore::new());
        store.set(DEVICE_IDENTITY_KEY, "garbage".into()).unwrap();
        let registry = DeviceRegistry::new(store, DeviceProfile::default());
        assert!(registry.get_or_create().is_err());
    }
}
