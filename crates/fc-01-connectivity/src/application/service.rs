//! # Connectivity Monitor Service
//!
//! Owns the online signal and drives the Sync Agent on reconnection.
//!
//! ## Sync trigger
//!
//! ```text
//! set_online(true) ─► was offline? ─► pending > 0? ─► sync_all() (once)
//!                         │ no             │ no
//!                         ▼                ▼
//!                     Unchanged       ReconnectedIdle
//! ```

use async_trait::async_trait;
use shared_store::{LocalCache, SyncAgent, SyncError, SyncReport};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::config::ConnectivityConfig;
use crate::domain::{
    ConnectivityError, ConnectivityHandle, ConnectivitySignal, Transition, TransitionOutcome,
};
use crate::ports::ConnectivityApi;

/// Connectivity Monitor.
pub struct ConnectivityMonitor {
    config: ConnectivityConfig,
    signal: ConnectivitySignal,
    cache: Arc<dyn LocalCache>,
    sync_agent: Arc<dyn SyncAgent>,
    sync_running: AtomicBool,
    pending: AtomicUsize,
}

impl ConnectivityMonitor {
    /// Create a monitor with the platform's initial reading.
    pub fn new(
        config: ConnectivityConfig,
        initially_online: bool,
        cache: Arc<dyn LocalCache>,
        sync_agent: Arc<dyn SyncAgent>,
    ) -> Self {
        Self {
            config,
            signal: ConnectivitySignal::new(initially_online),
            cache,
            sync_agent,
            sync_running: AtomicBool::new(false),
            pending: AtomicUsize::new(0),
        }
    }

    /// Forward readings from a platform event source until it closes.
    pub fn spawn_listener(self: Arc<Self>, mut events: mpsc::Receiver<bool>) -> JoinHandle<()> {
        tokio::spawn(async move {
            while let Some(online) = events.recv().await {
                let outcome = self.set_online(online).await;
                debug!(online, ?outcome, "[fc-01] Connectivity event handled");
            }
            debug!("[fc-01] Connectivity event source closed");
        })
    }

    /// One timed Sync Agent pass. Callers hold the `sync_running` flag.
    async fn run_sync(&self) -> Result<SyncReport, SyncError> {
        let timeout = Duration::from_secs(self.config.sync_timeout_secs);
        let result = match tokio::time::timeout(timeout, self.sync_agent.sync_all()).await {
            Ok(result) => result,
            Err(_) => Err(SyncError::Timeout),
        };

        if let Ok(report) = &result {
            self.pending.store(report.remaining, Ordering::SeqCst);
        }
        // Agent may have drained part of the queue even on failure.
        if let Err(e) = self.refresh_pending_count().await {
            warn!(error = %e, "[fc-01] Could not refresh pending count after sync");
        }
        result
    }

    fn try_claim_sync(&self) -> bool {
        self.sync_running
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
    }

    fn release_sync(&self) {
        self.sync_running.store(false, Ordering::SeqCst);
    }

    async fn on_reconnected(&self) -> TransitionOutcome {
        let pending = match self.refresh_pending_count().await {
            Ok(n) => n,
            Err(e) => {
                warn!(error = %e, "[fc-01] Reconnected but pending queue is unreadable");
                return TransitionOutcome::ReconnectedSyncFailed(e.to_string());
            }
        };

        if pending == 0 {
            info!("[fc-01] Back online, nothing queued");
            return TransitionOutcome::ReconnectedIdle;
        }

        if !self.try_claim_sync() {
            debug!(pending, "[fc-01] Back online, sync already running");
            return TransitionOutcome::ReconnectedIdle;
        }

        info!(pending, "[fc-01] Back online, syncing queued submissions");
        let result = self.run_sync().await;
        self.release_sync();

        match result {
            Ok(report) => {
                info!(
                    delivered = report.delivered,
                    failed = report.failed,
                    remaining = report.remaining,
                    "[fc-01] Reconnect sync finished"
                );
                TransitionOutcome::ReconnectedSynced(report)
            }
            Err(e) => {
                warn!(error = %e, "[fc-01] Reconnect sync failed");
                TransitionOutcome::ReconnectedSyncFailed(e.to_string())
            }
        }
    }
}

#[async_trait]
impl ConnectivityApi for ConnectivityMonitor {
    async fn set_online(&self, online: bool) -> TransitionOutcome {
        let previous = self.signal.replace(online);
        match Transition::between(previous, online) {
            Transition::Unchanged => TransitionOutcome::Unchanged,
            Transition::WentOffline => {
                info!("[fc-01] Connection lost, working offline");
                TransitionOutcome::WentOffline
            }
            Transition::Reconnected => self.on_reconnected().await,
        }
    }

    async fn sync_now(&self) -> Result<SyncReport, ConnectivityError> {
        if !self.is_online() {
            return Err(ConnectivityError::Offline);
        }
        if !self.try_claim_sync() {
            return Err(ConnectivityError::SyncInProgress);
        }
        info!("[fc-01] Manual sync requested");
        let result = self.run_sync().await;
        self.release_sync();
        Ok(result?)
    }

    async fn refresh_pending_count(&self) -> Result<usize, ConnectivityError> {
        let count = self.cache.get_pending_count().await?;
        self.pending.store(count, Ordering::SeqCst);
        Ok(count)
    }

    fn is_online(&self) -> bool {
        self.signal.is_online()
    }

    fn pending_count(&self) -> usize {
        self.pending.load(Ordering::SeqCst)
    }

    fn handle(&self) -> ConnectivityHandle {
        self.signal.handle()
    }
}
