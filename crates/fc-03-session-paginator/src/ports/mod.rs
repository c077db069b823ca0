//! # Ports Module
//!
//! The paginator is pure in-memory state; it has no outbound dependencies.

pub mod inbound;

pub use inbound::*;
