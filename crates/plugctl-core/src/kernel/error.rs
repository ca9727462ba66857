//! # plugctl Core Errors
//!
//! Defines the crate-level error type.
//!
//! [`Error`] wraps the typed errors of each subsystem ([`PluginSystemError`] for
//! the registry, loader and resolver, [`StorageSystemError`] for configuration and
//! the persisted activation state) so callers can propagate any of them with `?`.
use std::path::PathBuf;
use std::result::Result as StdResult;

use thiserror::Error as ThisError;

use crate::plugin_system::error::PluginSystemError;
use crate::storage::error::StorageSystemError;

/// Top-level error type for plugctl
#[derive(Debug, ThisError)]
pub enum Error {
    /// Specific, typed plugin system error
    #[error("Plugin system error: {0}")]
    PluginSystem(#[from] PluginSystemError),

    /// Specific, typed storage system error
    #[error("Storage system error: {0}")]
    StorageSystem(#[from] StorageSystemError),
}

/// Shorthand for Result with our Error type
pub type Result<T> = StdResult<T, Error>;

impl Error {
    /// Returns the plugin id the error is about, if any.
    ///
    /// The CLI uses this to name the offending plugin in its failure output.
    pub fn plugin_id(&self) -> Option<&str> {
        match self {
            Error::PluginSystem(e) => e.plugin_id(),
            _ => None,
        }
    }

    /// Creates an I/O error with the operation and path that failed
    pub fn io(source: std::io::Error, operation: impl Into<String>, path: PathBuf) -> Self {
        Error::StorageSystem(StorageSystemError::io(source, operation, path))
    }
}
