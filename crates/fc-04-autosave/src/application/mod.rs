//! # Application Module

pub mod persistor;
pub mod timer;

pub use persistor::AutosavePersistor;
pub use timer::spawn_autosave;
