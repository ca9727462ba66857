use serde::Serialize;

use crate::plugin_system::dependency::Dependency;
use crate::plugin_system::version::VersionRange;

/// Represents a plugin manifest that describes a plugin
#[derive(Debug, Clone, Serialize)]
pub struct PluginManifest {
    /// Unique identifier for the plugin
    pub id: String,

    /// Human-readable name
    pub name: String,

    /// Plugin version
    pub version: String,

    /// Plugin description
    pub description: String,

    /// Plugin author
    pub author: String,

    /// Plugin website URL (optional)
    pub website: Option<String>,

    /// License information
    pub license: Option<String>,

    /// Hard requirements, in declaration order
    pub requires: Vec<Dependency>,

    /// Declared incompatibilities, in declaration order
    pub conflicts: Vec<Dependency>,

    /// Tags for categorization
    pub tags: Vec<String>,
}

impl PluginManifest {
    /// Create a new plugin manifest
    pub fn new(id: &str, name: &str, version: &str, description: &str, author: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            version: version.to_string(),
            description: description.to_string(),
            author: author.to_string(),
            website: None,
            license: None,
            requires: Vec::new(),
            conflicts: Vec::new(),
            tags: Vec::new(),
        }
    }

    pub fn requires(&self) -> &[Dependency] {
        &self.requires
    }

    pub fn conflicts(&self) -> &[Dependency] {
        &self.conflicts
    }

    /// Plugin-type requirements only
    pub fn plugin_requires(&self) -> impl Iterator<Item = &Dependency> {
        self.requires.iter().filter(|dep| dep.is_plugin())
    }

    /// Plugin-type conflicts only
    pub fn plugin_conflicts(&self) -> impl Iterator<Item = &Dependency> {
        self.conflicts.iter().filter(|dep| dep.is_plugin())
    }

    /// Whether this manifest lists `plugin_id` as a plugin-type requirement
    pub fn requires_plugin(&self, plugin_id: &str) -> bool {
        self.plugin_requires().any(|dep| dep.name == plugin_id)
    }

    /// Add a requirement
    pub fn add_requirement(&mut self, dependency: Dependency) -> &mut Self {
        self.requires.push(dependency);
        self
    }

    /// Add a conflict
    pub fn add_conflict(&mut self, dependency: Dependency) -> &mut Self {
        self.conflicts.push(dependency);
        self
    }

    /// Add a tag to the plugin
    pub fn add_tag(&mut self, tag: &str) -> &mut Self {
        self.tags.push(tag.to_string());
        self
    }
}

/// Builder for creating a plugin manifest
pub struct ManifestBuilder {
    manifest: PluginManifest,
}

impl ManifestBuilder {
    /// Create a new manifest builder
    pub fn new(id: &str, name: &str, version: &str) -> Self {
        Self {
            manifest: PluginManifest::new(id, name, version, "", "Unknown"),
        }
    }

    /// Set the plugin description
    pub fn description(mut self, description: &str) -> Self {
        self.manifest.description = description.to_string();
        self
    }

    /// Set the plugin author
    pub fn author(mut self, author: &str) -> Self {
        self.manifest.author = author.to_string();
        self
    }

    /// Require another plugin, any version
    pub fn requires_plugin(mut self, id: &str) -> Self {
        self.manifest.add_requirement(Dependency::plugin(id));
        self
    }

    /// Require another plugin within a version range
    pub fn requires_plugin_version(mut self, id: &str, range: VersionRange) -> Self {
        self.manifest.add_requirement(Dependency::plugin_version(id, range));
        self
    }

    /// Add an arbitrary requirement entry
    pub fn requires(mut self, dependency: Dependency) -> Self {
        self.manifest.add_requirement(dependency);
        self
    }

    /// Declare a conflict with another plugin
    pub fn conflicts_plugin(mut self, id: &str) -> Self {
        self.manifest.add_conflict(Dependency::plugin(id));
        self
    }

    /// Add an arbitrary conflict entry
    pub fn conflicts(mut self, dependency: Dependency) -> Self {
        self.manifest.add_conflict(dependency);
        self
    }

    /// Build the manifest
    pub fn build(self) -> PluginManifest {
        self.manifest
    }
}
