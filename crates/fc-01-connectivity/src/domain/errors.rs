//! # Domain Errors
//!
//! Error types for the Connectivity Monitor.

use shared_store::{StoreError, SyncError};
use thiserror::Error;

/// Connectivity monitor errors.
#[derive(Debug, Error)]
pub enum ConnectivityError {
    /// Manual sync requested while offline.
    #[error("You are offline. Sync when connected.")]
    Offline,

    /// Another sync pass is already running.
    #[error("A sync pass is already in progress")]
    SyncInProgress,

    /// The Sync Agent reported a failure.
    #[error("Sync failed: {0}")]
    Sync(#[from] SyncError),

    /// Pending count could not be read.
    #[error("Pending queue unreadable: {0}")]
    Storage(#[from] StoreError),
}
