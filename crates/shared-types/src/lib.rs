//! # Shared Types Crate
//!
//! Data model shared by every FieldForce Collect component: forms and their
//! tagged field union, collection tokens, device identity, session state and
//! submissions, plus the backend error type and cancellation generations.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: All cross-component types are defined here.
//! - **Load-time validation**: Forms are checked once when fetched
//!   (`FormDefinition::validate`), never per render.
//! - **No internals of collaborators**: Storage and sync contracts live in
//!   `shared-store`.

pub mod entities;
pub mod errors;
pub mod forms;
pub mod generation;
pub mod keys;

pub use entities::*;
pub use errors::*;
pub use forms::*;
pub use generation::{GenerationTicket, SessionGeneration};
