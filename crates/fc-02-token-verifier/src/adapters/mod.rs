//! # Adapters
//!
//! Persistent device state kept in the process-wide key-value store.

pub mod device_registry;
pub mod verification_cache;

pub use device_registry::DeviceRegistry;
pub use verification_cache::VerificationCache;
