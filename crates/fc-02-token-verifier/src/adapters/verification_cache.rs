//! # Verification Cache
//!
//! Persistent map `token_id → device_id`. Written only after a successful
//! handshake and never expired locally; the server's lock state stays
//! authoritative. Tabs sharing a store are not coordinated.

use shared_store::{KeyValueStore, KeyValueStoreExt, StoreError};
use shared_types::keys::VERIFIED_DEVICES_KEY;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, warn};

/// Devices that passed verification, per token.
pub struct VerificationCache {
    store: Arc<dyn KeyValueStore>,
}

impl VerificationCache {
    /// Cache over `store`.
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Full map.
    pub fn entries(&self) -> Result<BTreeMap<String, String>, StoreError> {
        Ok(self.store.get_json(VERIFIED_DEVICES_KEY)?.unwrap_or_default())
    }

    /// True if `device_id` already verified for `token_id`. Unreadable
    /// entries count as not verified.
    pub fn is_verified(&self, token_id: &str, device_id: &str) -> bool {
        match self.entries() {
            Ok(map) => map.get(token_id).is_some_and(|d| d == device_id),
            Err(e) => {
                warn!(error = %e, "[fc-02] Verification cache unreadable");
                false
            }
        }
    }

    /// Record a successful handshake.
    pub fn record(&self, token_id: &str, device_id: &str) -> Result<(), StoreError> {
        let mut map = self.entries()?;
        map.insert(token_id.to_string(), device_id.to_string());
        self.store.set_json(VERIFIED_DEVICES_KEY, &map)?;
        debug!(token_id, device_id, "[fc-02] Recorded verified device");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_store::InMemoryStore;

    #[test]
    fn test_record_and_lookup() {
        let cache = VerificationCache::new(Arc::new(InMemoryStore::new()));
        assert!(!cache.is_verified("t1", "d1"));

        cache.record("t1", "d1").unwrap();
        assert!(cache.is_verified("t1", "d1"));
        assert!(!cache.is_verified("t1", "d2"));
        assert!(!cache.is_verified("t2", "d1"));
    }

    #[test]
    fn test_multiple_tokens() {
        let cache = VerificationCache::new(Arc::new(InMemoryStore::new()));
        cache.record("t1", "d1").unwrap();
        cache.record("t2", "d1").unwrap();
        assert_eq!(cache.entries().unwrap().len(), 2);
    }

    #[test]
    fn test_corrupt_cache_reads_as_unverified() {
        let store = Arc::new(InMemoryStore::new());
        store.set(VERIFIED_DEVICES_KEY, "[".into()).unwrap();
        let cache = VerificationCache::new(store);
        assert!(!cache.is_verified("t1", "d1"));
    }
}
