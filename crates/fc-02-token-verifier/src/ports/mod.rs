//! # Ports Module
//!
//! Inbound API and outbound backend contract of the Token Verifier.

pub mod inbound;
pub mod outbound;

pub use inbound::*;
pub use outbound::*;
