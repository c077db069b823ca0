//! # FC-01 Connectivity Monitor
//!
//! Wraps the platform's online/offline signal into a boolean and triggers
//! exactly one Sync Agent pass on each offline→online transition while
//! submissions are pending.
//!
//! **Component ID:** 01  
//! **Architecture:** Hexagonal (DDD + Ports/Adapters)
//!
//! ## Consumers
//!
//! | Consumer | Uses |
//! |----------|------|
//! | TokenVerifier | offline fallback to cached forms |
//! | AutosavePersistor | remote save only while online |
//! | SubmissionRouter | immediate delivery vs. queueing |
//!
//! ## Module Structure
//!
//! ```text
//! fc-01-connectivity/
//! ├── domain/          # Transition, TransitionOutcome, ConnectivitySignal, errors
//! ├── ports/           # ConnectivityApi (inbound)
//! ├── application/     # ConnectivityMonitor
//! └── config.rs        # ConnectivityConfig
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod application;
pub mod config;
pub mod domain;
pub mod ports;

// Re-exports
pub use application::ConnectivityMonitor;
pub use config::ConnectivityConfig;
pub use domain::{
    ConnectivityError, ConnectivityHandle, ConnectivitySignal, Transition, TransitionOutcome,
};
pub use ports::ConnectivityApi;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
