//! # Domain Module
//!
//! Core domain types for the Autosave Persistor.

pub mod errors;
pub mod resume;
pub mod snapshot;

pub use errors::*;
pub use resume::*;
pub use snapshot::*;
