//! # Ports Module
//!
//! Inbound API of the Connectivity Monitor. Outbound dependencies are the
//! shared `LocalCache` and `SyncAgent` contracts from `shared-store`.

pub mod inbound;

pub use inbound::*;
