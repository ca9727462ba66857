//! # plugctl Plugin System Errors
//!
//! Defines error types specific to the plugin system.
//!
//! [`PluginSystemError`] is the primary enum. The two resolver errors,
//! [`PluginSystemError::InvalidPluginReference`] and
//! [`PluginSystemError::InvalidManifest`], are raised whenever a plugin is
//! dereferenced, directly or transitively. The remaining variants cover manifest
//! parsing, registration and dependency resolution failures.
use std::path::PathBuf;

use crate::plugin_system::dependency::DependencyError;

#[derive(Debug, thiserror::Error)]
pub enum PluginSystemError {
    #[error("Invalid plugin reference: no plugin with id '{plugin_id}' is installed")]
    InvalidPluginReference { plugin_id: String },

    #[error("Invalid manifest: plugin '{plugin_id}' has no usable manifest")]
    InvalidManifest { plugin_id: String },

    #[error("Plugin manifest error for '{path}': {message}")]
    ManifestError {
        path: PathBuf,
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Plugin registration error for '{plugin_id}': {message}")]
    RegistrationError { plugin_id: String, message: String },

    #[error("Dependency resolution failed: {0}")]
    DependencyResolution(#[from] DependencyError),
}

impl PluginSystemError {
    pub fn invalid_reference(plugin_id: impl Into<String>) -> Self {
        PluginSystemError::InvalidPluginReference { plugin_id: plugin_id.into() }
    }

    pub fn invalid_manifest(plugin_id: impl Into<String>) -> Self {
        PluginSystemError::InvalidManifest { plugin_id: plugin_id.into() }
    }

    /// The plugin this error refers to, when there is exactly one.
    pub fn plugin_id(&self) -> Option<&str> {
        match self {
            PluginSystemError::InvalidPluginReference { plugin_id }
            | PluginSystemError::InvalidManifest { plugin_id }
            | PluginSystemError::RegistrationError { plugin_id, .. } => Some(plugin_id),
            PluginSystemError::DependencyResolution(
                DependencyError::Contradiction { plugin_id, .. } | DependencyError::Unsatisfiable { plugin_id, .. },
            ) => Some(plugin_id),
            _ => None,
        }
    }
}
