//! # plugctl Storage
//!
//! File-backed pieces around the registry: the application configuration
//! ([`AppConfig`], JSON/YAML/TOML by extension) and the persisted set of
//! active plugins ([`ActivationStore`]).
pub mod config;
pub mod error;
pub mod state;

pub use config::{AppConfig, ConfigFormat};
pub use error::StorageSystemError;
pub use state::ActivationStore;
