//! # FC-04 Autosave Persistor
//!
//! Keeps an in-progress session alive across reloads through two
//! independent channels:
//!
//! - **Local**: full `{responses, currentPage, savedAt}` snapshot in the
//!   key-value store, on every page transition and every timer tick.
//! - **Remote**: the same payload posted to the session store while online.
//!   Failures are swallowed; the next tick tries again.
//!
//! **Component ID:** 04  
//! **Architecture:** Hexagonal (DDD + Ports/Adapters)
//!
//! ## Resume Priority
//!
//! ```text
//! resume_id remote ──miss──► token remote ──miss──► local snapshot ──miss──► fresh
//! ```
//!
//! The first hit replaces the whole session. Priority, not recency: an
//! older remote session beats a newer local one.
//!
//! ## Module Structure
//!
//! ```text
//! fc-04-autosave/
//! ├── domain/          # SessionSnapshot, RemoteSession, resume chain, errors
//! ├── ports/           # AutosaveApi (in), SessionBackend (out) + mock
//! ├── application/     # AutosavePersistor, autosave timer
//! └── config.rs        # AutosaveConfig
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod application;
pub mod config;
pub mod domain;
pub mod ports;

// Re-exports
pub use application::{spawn_autosave, AutosavePersistor};
pub use config::AutosaveConfig;
pub use domain::{
    AutosaveError, PersistOutcome, RemoteSave, RemoteSession, ResumeSource, ResumedSession,
    SessionSaveRequest, SessionSnapshot, SessionStatus,
};
pub use ports::{AutosaveApi, MockSessionBackend, SessionBackend};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
