//! Infrastructure layer for werewolf
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer: AI backends, the role-template cache file,
//! and configuration file loading.

pub mod backends;
pub mod config;
pub mod store;

// Re-export commonly used types
pub use backends::{
    BackendKind, BackendSetupError, GeminiApiBackend, GeminiCliBackend, OllamaBackend,
    create_backend,
};
pub use config::{ConfigLoader, ConfigValidationError, FileConfig};
pub use store::JsonFileTemplateStore;
