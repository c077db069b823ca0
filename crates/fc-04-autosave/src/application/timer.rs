//! # Autosave Timer
//!
//! Fixed-period background save. It may interleave with transition saves;
//! both write complete snapshots, so the last write wins.

use fc_03_session_paginator::SessionPaginator;
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::debug;

use super::persistor::AutosavePersistor;

/// Save `session` every `interval_secs` while it has answers. The task
/// ends at the first tick after the persistor's generation moves on.
pub fn spawn_autosave(
    persistor: Arc<AutosavePersistor>,
    session: Arc<Mutex<SessionPaginator>>,
) -> JoinHandle<()> {
    let ticket = persistor.generation().current();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(persistor.config().interval());
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // First tick fires immediately.
        interval.tick().await;

        loop {
            interval.tick().await;
            if !persistor.generation().is_current(ticket) {
                debug!("[fc-04] Autosave timer stopped");
                break;
            }
            let state = session.lock().state().clone();
            if !state.has_responses() {
                continue;
            }
            persistor.persist_into(&session, &state, Some(ticket)).await;
        }
    })
}
