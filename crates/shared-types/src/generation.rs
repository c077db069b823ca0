//! # Session Generations
//!
//! Guards asynchronous continuations against teardown. Every load begins a
//! new generation; a completion carrying a stale ticket must be discarded
//! without touching state.
//!
//! ```text
//! begin() ──► ticket(n) ──► await backend ──► is_current(ticket)?
//!                                              ├─ yes: apply result
//!                                              └─ no:  drop result
//! ```

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Opaque token identifying one generation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GenerationTicket(u64);

/// Shared generation counter. Clones observe the same counter, so a clone
/// handed to the UI layer can invalidate in-flight work.
#[derive(Clone, Debug, Default)]
pub struct SessionGeneration {
    current: Arc<AtomicU64>,
}

impl SessionGeneration {
    /// Create a fresh counter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new generation, invalidating all earlier tickets.
    pub fn begin(&self) -> GenerationTicket {
        GenerationTicket(self.current.fetch_add(1, Ordering::SeqCst) + 1)
    }

    /// Invalidate every outstanding ticket (teardown / navigation away).
    pub fn invalidate(&self) {
        self.current.fetch_add(1, Ordering::SeqCst);
    }

    /// Ticket for the generation currently in effect.
    pub fn current(&self) -> GenerationTicket {
        GenerationTicket(self.current.load(Ordering::SeqCst))
    }

    /// True if no newer generation has started since `ticket` was issued.
    pub fn is_current(&self, ticket: GenerationTicket) -> bool {
        self.current.load(Ordering::SeqCst) == ticket.0
    }
}
