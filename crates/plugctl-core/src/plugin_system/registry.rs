use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::plugin_system::dependency::RequirementIssue;
use crate::plugin_system::error::PluginSystemError;
use crate::plugin_system::manifest::PluginManifest;
use crate::plugin_system::traits::{Plugin, PluginHost};

type Result<T> = std::result::Result<T, PluginSystemError>;

/// Registry of installed plugins and their active flags.
///
/// Plugins are listed in registration order. When `enforce_requirements` is on
/// (the default) the activation primitives refuse any change that would leave
/// the touched plugin with an unmet requirement or an active conflict.
pub struct PluginRegistry {
    /// Installed plugins, in listing order
    plugins: Vec<Arc<dyn Plugin>>,
    /// Plugin id -> position in `plugins`
    index: HashMap<String, usize>,
    /// Active plugin IDs
    active: HashSet<String>,
    enforce_requirements: bool,
}

impl PluginRegistry {
    /// Create an empty registry with requirement enforcement enabled
    pub fn new() -> Self {
        Self {
            plugins: Vec::new(),
            index: HashMap::new(),
            active: HashSet::new(),
            enforce_requirements: true,
        }
    }

    pub fn with_enforcement(mut self, enforce: bool) -> Self {
        self.enforce_requirements = enforce;
        self
    }

    pub fn set_enforce_requirements(&mut self, enforce: bool) {
        self.enforce_requirements = enforce;
    }

    pub fn enforces_requirements(&self) -> bool {
        self.enforce_requirements
    }

    /// Register an installed plugin. Newly registered plugins are inactive.
    pub fn register_plugin(&mut self, plugin: Arc<dyn Plugin>) -> Result<()> {
        let id = plugin.id().to_string();
        if id.is_empty() {
            return Err(PluginSystemError::RegistrationError {
                plugin_id: id,
                message: "plugin id must not be empty".to_string(),
            });
        }
        if self.index.contains_key(&id) {
            return Err(PluginSystemError::RegistrationError {
                plugin_id: id,
                message: "plugin already registered".to_string(),
            });
        }

        self.index.insert(id, self.plugins.len());
        self.plugins.push(plugin);
        Ok(())
    }

    /// Unregister a plugin by ID, dropping its active flag
    pub fn unregister_plugin(&mut self, id: &str) -> Result<Arc<dyn Plugin>> {
        let position = self
            .index
            .remove(id)
            .ok_or_else(|| PluginSystemError::invalid_reference(id))?;
        let plugin = self.plugins.remove(position);
        self.active.remove(id);
        // Positions after the removed plugin shifted down by one
        for (i, p) in self.plugins.iter().enumerate().skip(position) {
            self.index.insert(p.id().to_string(), i);
        }
        Ok(plugin)
    }

    /// Check if a plugin is installed
    pub fn has_plugin(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// Iterate installed plugins in listing order
    pub fn iter_plugins(&self) -> impl Iterator<Item = &Arc<dyn Plugin>> {
        self.plugins.iter()
    }

    /// All installed plugin IDs, in listing order
    pub fn plugin_ids(&self) -> Vec<String> {
        self.plugins.iter().map(|p| p.id().to_string()).collect()
    }

    /// Active plugin IDs, in listing order
    pub fn active_plugin_ids(&self) -> Vec<String> {
        self.plugins
            .iter()
            .filter(|p| self.active.contains(p.id()))
            .map(|p| p.id().to_string())
            .collect()
    }

    pub fn plugin_count(&self) -> usize {
        self.plugins.len()
    }

    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    /// Restore a previously persisted active set.
    ///
    /// Bypasses the primitives and their hooks. Ids that are not installed are
    /// skipped and returned.
    pub fn restore_active<I, S>(&mut self, ids: I) -> Vec<String>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut unknown = Vec::new();
        for id in ids {
            let id = id.into();
            if self.has_plugin(&id) {
                self.active.insert(id);
            } else {
                log::warn!("Ignoring persisted active plugin '{}': not installed", id);
                unknown.push(id);
            }
        }
        unknown
    }

    /// Report the unmet requirements and active conflicts of a plugin.
    pub fn check_requirements(&self, id: &str) -> Result<Vec<RequirementIssue>> {
        let plugin = self
            .get_plugin(id)
            .ok_or_else(|| PluginSystemError::invalid_reference(id))?;
        let manifest = plugin
            .manifest()
            .ok_or_else(|| PluginSystemError::invalid_manifest(id))?;
        Ok(self.requirement_issues(manifest))
    }

    /// Every active plugin whose requirements or conflicts are currently violated.
    ///
    /// An empty report means the active set is consistent.
    pub fn consistency_report(&self) -> Vec<(String, Vec<RequirementIssue>)> {
        self.plugins
            .iter()
            .filter(|p| self.active.contains(p.id()))
            .filter_map(|p| {
                let issues = self.requirement_issues(p.manifest()?);
                (!issues.is_empty()).then(|| (p.id().to_string(), issues))
            })
            .collect()
    }

    /// Active plugins that declare `id` as a plugin requirement
    pub fn active_dependents(&self, id: &str) -> Vec<String> {
        self.plugins
            .iter()
            .filter(|p| p.id() != id && self.active.contains(p.id()))
            .filter(|p| p.manifest().is_some_and(|m| m.requires_plugin(id)))
            .map(|p| p.id().to_string())
            .collect()
    }

    fn requirement_issues(&self, manifest: &PluginManifest) -> Vec<RequirementIssue> {
        let mut issues = Vec::new();

        for dep in manifest.plugin_requires().filter(|dep| dep.name != manifest.id) {
            let Some(required) = self.get_plugin(&dep.name) else {
                issues.push(RequirementIssue::NotInstalled(dep.name.clone()));
                continue;
            };
            if !self.active.contains(&dep.name) {
                issues.push(RequirementIssue::Inactive(dep.name.clone()));
            }
            if let Some(range) = &dep.version {
                let found = required.version().unwrap_or("<unknown>");
                if !range.includes_str(found) {
                    issues.push(RequirementIssue::VersionMismatch {
                        plugin_id: dep.name.clone(),
                        required: range.constraint_string().to_string(),
                        found: found.to_string(),
                    });
                }
            }
        }

        for conflict in manifest.plugin_conflicts() {
            if conflict.name != manifest.id && self.active.contains(&conflict.name) {
                issues.push(RequirementIssue::ConflictActive(conflict.name.clone()));
            }
        }

        issues
    }
}

impl Default for PluginRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl PluginHost for PluginRegistry {
    fn get_plugin(&self, id: &str) -> Option<Arc<dyn Plugin>> {
        self.index.get(id).map(|&i| self.plugins[i].clone())
    }

    fn list_active_plugins(&self) -> Vec<Arc<dyn Plugin>> {
        self.plugins
            .iter()
            .filter(|p| self.active.contains(p.id()))
            .cloned()
            .collect()
    }

    fn is_active(&self, id: &str) -> bool {
        self.active.contains(id)
    }

    fn activate(&mut self, id: &str) -> Result<bool> {
        let plugin = self
            .get_plugin(id)
            .ok_or_else(|| PluginSystemError::invalid_reference(id))?;
        if self.active.contains(id) {
            return Ok(true);
        }

        if self.enforce_requirements {
            if let Some(manifest) = plugin.manifest() {
                let issues = self.requirement_issues(manifest);
                if !issues.is_empty() {
                    for issue in &issues {
                        log::warn!("Cannot activate '{}': {}", id, issue);
                    }
                    return Ok(false);
                }
            }
        }

        if let Err(e) = plugin.on_activate() {
            log::warn!("Activation of '{}' was vetoed: {}", id, e);
            return Ok(false);
        }

        self.active.insert(id.to_string());
        log::info!("Plugin '{}' activated", id);
        Ok(true)
    }

    fn enforces_requirements(&self) -> bool {
        self.enforce_requirements
    }

    fn deactivate(&mut self, id: &str) -> Result<bool> {
        let plugin = self
            .get_plugin(id)
            .ok_or_else(|| PluginSystemError::invalid_reference(id))?;
        if !self.active.contains(id) {
            return Ok(true);
        }

        if self.enforce_requirements {
            let dependents = self.active_dependents(id);
            if !dependents.is_empty() {
                log::warn!(
                    "Cannot deactivate '{}': required by active plugin(s) {}",
                    id,
                    dependents.join(", ")
                );
                return Ok(false);
            }
        }

        if let Err(e) = plugin.on_deactivate() {
            log::warn!("Deactivation of '{}' was vetoed: {}", id, e);
            return Ok(false);
        }

        self.active.remove(id);
        log::info!("Plugin '{}' deactivated", id);
        Ok(true)
    }
}
