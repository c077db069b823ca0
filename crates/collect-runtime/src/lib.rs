//! # FieldForce Collect Runtime
//!
//! Runs the collection engine outside a browser: real adapters behind the
//! component ports, and a command-line front end.
//!
//! ## Modular Structure
//!
//! - `adapters/` - HTTP backend, JSON file store, queue-draining sync agent
//! - `container/` - Runtime configuration and component wiring
//! - `telemetry` - Global `tracing` subscriber
//!
//! ## Startup Sequence
//!
//! 1. Read `RuntimeConfig` from `FC_*` variables
//! 2. Install the tracing subscriber
//! 3. Open the store and wire components (`CollectContainer::open`)
//! 4. Run one command

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod adapters;
pub mod container;
pub mod telemetry;

// Re-exports
pub use adapters::{HttpCollectBackend, HttpSetupError, JsonFileStore, QueueSyncAgent};
pub use container::{CollectContainer, FormSession, RuntimeConfig, RuntimeError};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
