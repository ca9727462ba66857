//! # Forced activation and deactivation
//!
//! [`Resolver`] drives a [`PluginHost`] so that activating a plugin also
//! deactivates everything it conflicts with and activates everything it
//! requires, and deactivating a plugin first deactivates its active dependents.
//!
//! A forced call is executed in two phases. A [`ResolutionPlan`] is computed
//! against a simulated copy of the active set, which dereferences every plugin
//! the call will touch; then the plan's steps are applied through the host
//! primitives in order. Reference and manifest errors therefore surface before
//! anything is mutated. When the host enforces requirements, so do refusals it
//! can predict from manifests alone: a plugin to be activated that requires an
//! uninstalled plugin, or a version outside the declared range, fails the call
//! with [`DependencyError::Unsatisfiable`].
//!
//! Within one call each plugin is expanded at most once per action. A plugin
//! reached again for the same action is skipped, which covers both diamonds and
//! requirement cycles. A plugin that would have to be activated and deactivated
//! in the same call fails the call with [`DependencyError::Contradiction`].
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

use crate::plugin_system::dependency::{DependencyError, RequirementIssue};
use crate::plugin_system::error::PluginSystemError;
use crate::plugin_system::manifest::PluginManifest;
use crate::plugin_system::traits::{Plugin, PluginHost};

type Result<T> = std::result::Result<T, PluginSystemError>;

/// The primitive a plan step calls
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlannedAction {
    Activate,
    Deactivate,
}

impl fmt::Display for PlannedAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlannedAction::Activate => f.write_str("activate"),
            PlannedAction::Deactivate => f.write_str("deactivate"),
        }
    }
}

/// One primitive call of a forced operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedStep {
    pub action: PlannedAction,
    pub plugin_id: String,
    /// False when the plugin is already in the target state at this point of the plan
    pub changes_state: bool,
}

/// Ordered primitive calls performed by a forced activate/deactivate.
#[derive(Debug, Clone)]
pub struct ResolutionPlan {
    root: String,
    action: PlannedAction,
    steps: Vec<PlannedStep>,
}

impl ResolutionPlan {
    /// The plugin the operation was requested for
    pub fn root(&self) -> &str {
        &self.root
    }

    pub fn action(&self) -> PlannedAction {
        self.action
    }

    pub fn steps(&self) -> &[PlannedStep] {
        &self.steps
    }

    /// True when applying the plan would not change any active flag
    pub fn is_noop(&self) -> bool {
        self.steps.iter().all(|s| !s.changes_state)
    }

    /// Plugins the plan turns on, in order
    pub fn activations(&self) -> Vec<&str> {
        self.changed(PlannedAction::Activate)
    }

    /// Plugins the plan turns off, in order
    pub fn deactivations(&self) -> Vec<&str> {
        self.changed(PlannedAction::Deactivate)
    }

    fn changed(&self, action: PlannedAction) -> Vec<&str> {
        self.steps
            .iter()
            .filter(|s| s.action == action && s.changes_state)
            .map(|s| s.plugin_id.as_str())
            .collect()
    }
}

/// Dependency and conflict aware front end to a [`PluginHost`].
pub struct Resolver<'h, H: PluginHost + ?Sized> {
    host: &'h mut H,
}

impl<'h, H: PluginHost + ?Sized> Resolver<'h, H> {
    pub fn new(host: &'h mut H) -> Self {
        Self { host }
    }

    pub fn host(&self) -> &H {
        &*self.host
    }

    /// Activate a plugin.
    ///
    /// Unforced, this is the host primitive alone. Forced, conflicts are
    /// deactivated (with their dependents), then requirements are activated
    /// (with theirs), then the plugin itself. Returns the primitive's result
    /// for `id`.
    pub fn activate(&mut self, id: &str, force: bool) -> Result<bool> {
        if !force {
            resolve(&*self.host, id)?;
            return self.host.activate(id);
        }

        let plan = self.plan_activation(id)?;
        self.apply(&plan)
    }

    /// Deactivate a plugin.
    ///
    /// Unforced, this is the host primitive alone. Forced, every active
    /// dependent is deactivated first, recursively.
    pub fn deactivate(&mut self, id: &str, force: bool) -> Result<bool> {
        if !force {
            resolve(&*self.host, id)?;
            return self.host.deactivate(id);
        }

        let plan = self.plan_deactivation(id)?;
        self.apply(&plan)
    }

    /// Installed plugins that `id` declares a conflict with, in manifest order
    pub fn get_conflicts(&self, id: &str) -> Result<Vec<String>> {
        let plugin = resolve(&*self.host, id)?;
        Ok(installed_conflicts(&*self.host, manifest_of(&plugin)?))
    }

    /// Installed plugins that `id` requires, in manifest order
    pub fn get_requires(&self, id: &str) -> Result<Vec<String>> {
        let plugin = resolve(&*self.host, id)?;
        Ok(installed_requires(&*self.host, manifest_of(&plugin)?))
    }

    /// Active plugins that require `id`, in registry listing order
    pub fn get_dependents(&self, id: &str) -> Vec<String> {
        self.host
            .list_active_plugins()
            .iter()
            .filter(|p| p.id() != id && p.manifest().is_some_and(|m| m.requires_plugin(id)))
            .map(|p| p.id().to_string())
            .collect()
    }

    /// Compute what a forced activation of `id` would do, without doing it.
    pub fn plan_activation(&self, id: &str) -> Result<ResolutionPlan> {
        let mut planner = Planner::new(&*self.host, id);
        planner.visit_activate(id)?;
        Ok(planner.finish(PlannedAction::Activate))
    }

    /// Compute what a forced deactivation of `id` would do, without doing it.
    pub fn plan_deactivation(&self, id: &str) -> Result<ResolutionPlan> {
        let mut planner = Planner::new(&*self.host, id);
        planner.visit_deactivate(id)?;
        Ok(planner.finish(PlannedAction::Deactivate))
    }

    fn apply(&mut self, plan: &ResolutionPlan) -> Result<bool> {
        let mut outcome = false;
        for step in plan.steps() {
            let ok = match step.action {
                PlannedAction::Activate => self.host.activate(&step.plugin_id)?,
                PlannedAction::Deactivate => self.host.deactivate(&step.plugin_id)?,
            };
            if step.plugin_id == plan.root() {
                outcome = ok;
            } else if !ok {
                log::warn!(
                    "Could not {} '{}' while resolving '{}', continuing",
                    step.action,
                    step.plugin_id,
                    plan.root()
                );
            }
        }
        Ok(outcome)
    }
}

/// Walks the requirement/conflict graph over a simulated active set.
struct Planner<'h, H: PluginHost + ?Sized> {
    host: &'h H,
    root: String,
    /// Simulated active flags that differ from the host
    overlay: HashMap<String, bool>,
    /// Plugins switched on by the plan so far, in order
    newly_active: Vec<String>,
    activating: HashSet<String>,
    deactivating: HashSet<String>,
    steps: Vec<PlannedStep>,
}

impl<'h, H: PluginHost + ?Sized> Planner<'h, H> {
    fn new(host: &'h H, root: &str) -> Self {
        Self {
            host,
            root: root.to_string(),
            overlay: HashMap::new(),
            newly_active: Vec::new(),
            activating: HashSet::new(),
            deactivating: HashSet::new(),
            steps: Vec::new(),
        }
    }

    fn finish(self, action: PlannedAction) -> ResolutionPlan {
        ResolutionPlan {
            root: self.root,
            action,
            steps: self.steps,
        }
    }

    fn is_active(&self, id: &str) -> bool {
        self.overlay
            .get(id)
            .copied()
            .unwrap_or_else(|| self.host.is_active(id))
    }

    fn visit_activate(&mut self, id: &str) -> Result<()> {
        if self.activating.contains(id) {
            log::trace!("'{}' already scheduled for activation", id);
            return Ok(());
        }
        if self.deactivating.contains(id) {
            return Err(self.contradiction(id));
        }

        let plugin = resolve(self.host, id)?;
        let manifest = manifest_of(&plugin)?;
        if self.host.enforces_requirements() && !self.is_active(id) {
            let issues = unmeetable_requirements(self.host, manifest);
            if !issues.is_empty() {
                return Err(DependencyError::Unsatisfiable {
                    plugin_id: id.to_string(),
                    root: self.root.clone(),
                    issues,
                }
                .into());
            }
        }
        self.activating.insert(id.to_string());

        for conflict in installed_conflicts(self.host, manifest) {
            self.visit_deactivate(&conflict)?;
        }
        for required in installed_requires(self.host, manifest) {
            self.visit_activate(&required)?;
        }

        let changes_state = !self.is_active(id);
        if changes_state {
            self.overlay.insert(id.to_string(), true);
            self.newly_active.push(id.to_string());
        }
        self.steps.push(PlannedStep {
            action: PlannedAction::Activate,
            plugin_id: id.to_string(),
            changes_state,
        });
        Ok(())
    }

    fn visit_deactivate(&mut self, id: &str) -> Result<()> {
        if self.deactivating.contains(id) {
            log::trace!("'{}' already scheduled for deactivation", id);
            return Ok(());
        }
        if self.activating.contains(id) {
            return Err(self.contradiction(id));
        }

        resolve(self.host, id)?;
        self.deactivating.insert(id.to_string());

        for dependent in self.dependents(id) {
            self.visit_deactivate(&dependent)?;
        }

        let changes_state = self.is_active(id);
        if changes_state {
            self.overlay.insert(id.to_string(), false);
        }
        self.steps.push(PlannedStep {
            action: PlannedAction::Deactivate,
            plugin_id: id.to_string(),
            changes_state,
        });
        Ok(())
    }

    /// Dependents of `id` among the simulated active set: host listing order
    /// first, then plugins the plan has switched on.
    fn dependents(&self, id: &str) -> Vec<String> {
        let active_now = self
            .host
            .list_active_plugins()
            .into_iter()
            .filter(|p| self.is_active(p.id()));
        let switched_on = self
            .newly_active
            .iter()
            .filter(|pid| self.is_active(pid) && !self.host.is_active(pid))
            .filter_map(|pid| self.host.get_plugin(pid));

        active_now
            .chain(switched_on)
            .filter(|p| p.id() != id && p.manifest().is_some_and(|m| m.requires_plugin(id)))
            .map(|p| p.id().to_string())
            .collect()
    }

    fn contradiction(&self, id: &str) -> PluginSystemError {
        DependencyError::Contradiction {
            plugin_id: id.to_string(),
            root: self.root.clone(),
        }
        .into()
    }
}

/// Dereference a plugin id, requiring a manifest.
fn resolve<H: PluginHost + ?Sized>(host: &H, id: &str) -> Result<Arc<dyn Plugin>> {
    let plugin = host
        .get_plugin(id)
        .ok_or_else(|| PluginSystemError::invalid_reference(id))?;
    if plugin.manifest().is_none() {
        return Err(PluginSystemError::invalid_manifest(id));
    }
    Ok(plugin)
}

fn manifest_of(plugin: &Arc<dyn Plugin>) -> Result<&PluginManifest> {
    plugin
        .manifest()
        .ok_or_else(|| PluginSystemError::invalid_manifest(plugin.id()))
}

/// Installed conflicts in manifest order. A self-conflict is ignored.
fn installed_conflicts<H: PluginHost + ?Sized>(host: &H, manifest: &PluginManifest) -> Vec<String> {
    manifest
        .plugin_conflicts()
        .filter(|dep| dep.name != manifest.id && host.get_plugin(&dep.name).is_some())
        .map(|dep| dep.name.clone())
        .collect()
}

fn installed_requires<H: PluginHost + ?Sized>(host: &H, manifest: &PluginManifest) -> Vec<String> {
    manifest
        .plugin_requires()
        .filter(|dep| dep.name != manifest.id && host.get_plugin(&dep.name).is_some())
        .map(|dep| dep.name.clone())
        .collect()
}

/// Requirement issues that activating other plugins cannot fix.
fn unmeetable_requirements<H: PluginHost + ?Sized>(host: &H, manifest: &PluginManifest) -> Vec<RequirementIssue> {
    let mut issues = Vec::new();
    for dep in manifest.plugin_requires().filter(|dep| dep.name != manifest.id) {
        let Some(required) = host.get_plugin(&dep.name) else {
            issues.push(RequirementIssue::NotInstalled(dep.name.clone()));
            continue;
        };
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
    issues
}
