//! # FieldForce Collect Test Suite
//!
//! Cross-component flows, wired the way the runtime wires them but over
//! in-memory stores and mock backends.
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! └── integration/
//!     ├── scenarios.rs   # End-to-end collection scenarios
//!     └── flows.rs       # Handshake, queueing and reconnect properties
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p fc-tests
//! cargo test -p fc-tests integration::scenarios::
//! ```

pub mod integration;
