use std::sync::Arc;

use crate::plugin_system::error::PluginSystemError;
use crate::plugin_system::manifest::PluginManifest;

/// An installed plugin as seen by the registry.
///
/// A plugin may be installed without a usable manifest; such a plugin is listed
/// but can never be activated or deactivated through the resolver.
pub trait Plugin: Send + Sync {
    /// Unique identifier of the plugin
    fn id(&self) -> &str;

    /// The plugin manifest, if one was found and parsed
    fn manifest(&self) -> Option<&PluginManifest>;

    /// Version declared by the manifest
    fn version(&self) -> Option<&str> {
        self.manifest().map(|m| m.version.as_str())
    }

    /// Called by the registry right before the plugin is marked active.
    /// An error vetoes the activation.
    fn on_activate(&self) -> Result<(), PluginSystemError> {
        Ok(())
    }

    /// Called by the registry right before the plugin is marked inactive.
    /// An error vetoes the deactivation.
    fn on_deactivate(&self) -> Result<(), PluginSystemError> {
        Ok(())
    }
}

/// The registry operations the resolver consumes.
///
/// `activate`/`deactivate` are the primitives: they change a single plugin's
/// active flag, are idempotent, and report refusal as `Ok(false)`. They return
/// `Err` only for an id that is not installed.
pub trait PluginHost {
    /// Look up an installed plugin
    fn get_plugin(&self, id: &str) -> Option<Arc<dyn Plugin>>;

    /// Currently active plugins, in registry listing order
    fn list_active_plugins(&self) -> Vec<Arc<dyn Plugin>>;

    /// Whether the plugin is currently active
    fn is_active(&self, id: &str) -> bool;

    /// Mark a single plugin active
    fn activate(&mut self, id: &str) -> Result<bool, PluginSystemError>;

    /// Mark a single plugin inactive
    fn deactivate(&mut self, id: &str) -> Result<bool, PluginSystemError>;

    /// Whether the primitives refuse changes that leave requirements unmet
    fn enforces_requirements(&self) -> bool {
        false
    }
}
