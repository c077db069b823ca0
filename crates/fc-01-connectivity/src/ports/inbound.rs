//! # Inbound Ports
//!
//! API trait defining what the Connectivity Monitor can do.

use async_trait::async_trait;
use shared_store::SyncReport;

use crate::domain::{ConnectivityError, ConnectivityHandle, TransitionOutcome};

/// Connectivity Monitor API - inbound port.
#[async_trait]
pub trait ConnectivityApi: Send + Sync {
    /// Feed a platform online/offline reading.
    ///
    /// A false→true transition with a non-empty queue triggers exactly one
    /// Sync Agent pass; repeated identical readings do nothing.
    async fn set_online(&self, online: bool) -> TransitionOutcome;

    /// Run one sync pass on user request. Fails while offline.
    async fn sync_now(&self) -> Result<SyncReport, ConnectivityError>;

    /// Re-read the pending queue length from the Local Cache.
    async fn refresh_pending_count(&self) -> Result<usize, ConnectivityError>;

    /// Current reading.
    fn is_online(&self) -> bool;

    /// Last known pending queue length.
    fn pending_count(&self) -> usize;

    /// Handle for consumers of the signal.
    fn handle(&self) -> ConnectivityHandle;
}
