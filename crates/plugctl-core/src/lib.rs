//! Core library for `plugctl`: a plugin registry whose activation and
//! deactivation respect declared requirements and conflicts.
pub mod kernel;
pub mod plugin_system;
pub mod storage;

pub use kernel::error::{Error, Result};
pub use plugin_system::{
    Plugin, PluginHost, PluginLoader, PluginManifest, PluginRegistry, ResolutionPlan, Resolver,
};
pub use plugin_system::error::PluginSystemError;
pub use storage::{ActivationStore, AppConfig};

#[cfg(test)]
mod tests;
