//! # Adapters
//!
//! Concrete implementations of the component ports.

pub mod file_store;
pub mod http_backend;
pub mod queue_sync;

pub use file_store::JsonFileStore;
pub use http_backend::{HttpCollectBackend, HttpSetupError};
pub use queue_sync::QueueSyncAgent;
