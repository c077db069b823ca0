//! # Shared Store
//!
//! Persistence contracts shared by every component.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────┐   get/set/remove   ┌──────────────────┐
//! │ TokenVerifier   │ ─────────────────► │  KeyValueStore   │  (device id,
//! │ AutosavePersist │                    │  (injected)      │   verification
//! └─────────────────┘                    └──────────────────┘   cache, snapshots)
//!
//! ┌─────────────────┐  cache/queue/count ┌──────────────────┐  sync_all  ┌───────────┐
//! │ SubmissionRouter│ ─────────────────► │   LocalCache     │ ◄───────── │ SyncAgent │
//! │ Connectivity    │                    └──────────────────┘            └───────────┘
//! └─────────────────┘
//! ```
//!
//! The store is process-wide and keyed. Within one process access is
//! serialized by the implementations; several processes (tabs) sharing one
//! backing file are not coordinated.

pub mod kv;
pub mod local_cache;
pub mod sync_agent;

pub use kv::{InMemoryStore, KeyValueStore, KeyValueStoreExt, StoreError};
pub use local_cache::{KvLocalCache, LocalCache, CACHED_FORMS_KEY, PENDING_SUBMISSIONS_KEY};
pub use sync_agent::{MockSyncAgent, SyncAgent, SyncError, SyncReport};
