//! # Local Cache Contract
//!
//! Durable local storage of forms (for offline use) and of submissions
//! awaiting delivery. Queued entries survive reloads and are removed only
//! after the Sync Agent confirms delivery.

use async_trait::async_trait;
use parking_lot::Mutex;
use shared_types::{FormDefinition, Submission};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;

use crate::kv::{KeyValueStore, KeyValueStoreExt, StoreError};

/// Key holding the cached form map.
pub const CACHED_FORMS_KEY: &str = "fieldforce_cached_forms";

/// Key holding the pending submission queue.
pub const PENDING_SUBMISSIONS_KEY: &str = "fieldforce_pending_submissions";

/// Local Cache collaborator.
#[async_trait]
pub trait LocalCache: Send + Sync {
    /// Store (or refresh) a form for offline use.
    async fn cache_form(&self, form: &FormDefinition) -> Result<(), StoreError>;

    /// Read one cached form.
    async fn get_cached_form(&self, form_id: &str) -> Result<Option<FormDefinition>, StoreError>;

    /// Read every cached form.
    async fn get_cached_forms(&self) -> Result<Vec<FormDefinition>, StoreError>;

    /// Durably queue a submission. Must not return `Ok` before the write is
    /// durable.
    async fn save_submission(&self, submission: &Submission) -> Result<(), StoreError>;

    /// Number of queued submissions (eventually consistent).
    async fn get_pending_count(&self) -> Result<usize, StoreError>;

    /// Queued submissions, oldest first.
    async fn pending_submissions(&self) -> Result<Vec<Submission>, StoreError>;

    /// Drop a delivered submission. Returns whether it was queued.
    async fn remove_submission(&self, submission_id: &str) -> Result<bool, StoreError>;
}

/// [`LocalCache`] built on any [`KeyValueStore`].
pub struct KvLocalCache {
    store: Arc<dyn KeyValueStore>,
    /// Serializes read-modify-write cycles within this process.
    write_lock: Mutex<()>,
}

impl KvLocalCache {
    /// Wrap a store.
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            write_lock: Mutex::new(()),
        }
    }

    fn forms(&self) -> Result<BTreeMap<String, FormDefinition>, StoreError> {
        Ok(self.store.get_json(CACHED_FORMS_KEY)?.unwrap_or_default())
    }

    fn queue(&self) -> Result<Vec<Submission>, StoreError> {
        Ok(self
            .store
            .get_json(PENDING_SUBMISSIONS_KEY)?
            .unwrap_or_default())
    }
}

#[async_trait]
impl LocalCache for KvLocalCache {
    async fn cache_form(&self, form: &FormDefinition) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock();
        let mut forms = self.forms()?;
        forms.insert(form.id.clone(), form.clone());
        self.store.set_json(CACHED_FORMS_KEY, &forms)?;
        debug!(form_id = %form.id, "Cached form for offline use");
        Ok(())
    }

    async fn get_cached_form(&self, form_id: &str) -> Result<Option<FormDefinition>, StoreError> {
        Ok(self.forms()?.remove(form_id))
    }

    async fn get_cached_forms(&self) -> Result<Vec<FormDefinition>, StoreError> {
        Ok(self.forms()?.into_values().collect())
    }

    async fn save_submission(&self, submission: &Submission) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock();
        let mut queue = self.queue()?;
        match queue.iter_mut().find(|s| s.id == submission.id) {
            Some(existing) => *existing = submission.clone(),
            None => queue.push(submission.clone()),
        }
        self.store.set_json(PENDING_SUBMISSIONS_KEY, &queue)?;
        debug!(
            submission_id = %submission.id,
            pending = queue.len(),
            "Queued submission"
        );
        Ok(())
    }

    async fn get_pending_count(&self) -> Result<usize, StoreError> {
        Ok(self.queue()?.len())
    }

    async fn pending_submissions(&self) -> Result<Vec<Submission>, StoreError> {
        self.queue()
    }

    async fn remove_submission(&self, submission_id: &str) -> Result<bool, StoreError> {
        let _guard = self.write_lock.lock();
        let mut queue = self.queue()?;
        let before = queue.len();
        queue.retain(|s| s.id != submission_id);
        if queue.len() == before {
            return Ok(false);
        }
        self.store.set_json(PENDING_SUBMISSIONS_KEY, &queue)?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kv::InMemoryStore;
    use shared_types::{DeviceIdentity, DeviceProfile, ResponseMap};

    fn cache() -> (Arc<InMemoryStore>, KvLocalCache) {
        let store = Arc::new(InMemoryStore::new());
        let cache = KvLocalCache::new(store.clone());
        (store, cache)
    }

    fn submission(form_id: &str) -> Submission {
        Submission::new(
            form_id,
            ResponseMap::new(),
            DeviceIdentity::generate(DeviceProfile::default()),
        )
    }

    #[tokio::test]
    async fn test_cache_and_read_forms() {
        let (_, cache) = cache();
        let form = FormDefinition::new("f1", "Household", vec![]);

        cache.cache_form(&form).await.unwrap();
        cache.cache_form(&form).await.unwrap();

        assert_eq!(cache.get_cached_forms().await.unwrap().len(), 1);
        assert_eq!(cache.get_cached_form("f1").await.unwrap(), Some(form));
        assert!(cache.get_cached_form("f2").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_queue_and_remove() {
        let (store, cache) = cache();
        let sub = submission("f1");

        cache.save_submission(&sub).await.unwrap();
        assert_eq!(cache.get_pending_count().await.unwrap(), 1);
        assert!(store.contains(PENDING_SUBMISSIONS_KEY));

        assert!(cache.remove_submission(&sub.id).await.unwrap());
        assert!(!cache.remove_submission(&sub.id).await.unwrap());
        assert_eq!(cache.get_pending_count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_requeue_same_id_does_not_duplicate() {
        let (_, cache) = cache();
        let sub = submission("f1");

        cache.save_submission(&sub).await.unwrap();
        cache.save_submission(&sub).await.unwrap();
        assert_eq!(cache.get_pending_count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_queue_survives_new_cache_instance() {
        let store = Arc::new(InMemoryStore::new());
        let sub = submission("f1");
        KvLocalCache::new(store.clone())
            .save_submission(&sub)
            .await
            .unwrap();

        let reopened = KvLocalCache::new(store);
        let pending = reopened.pending_submissions().await.unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].id, sub.id);
    }
}
