use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::kernel::constants::PLUGIN_DEPENDENCY_TYPE;
use crate::plugin_system::version::VersionRange;

/// What a manifest `requires`/`conflicts` entry refers to.
///
/// Only [`DependencyKind::Plugin`] entries take part in resolution. Every other
/// `type` (runtime version, extensions, ...) is kept verbatim and ignored.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum DependencyKind {
    Plugin,
    Other(String),
}

impl DependencyKind {
    pub fn is_plugin(&self) -> bool {
        matches!(self, DependencyKind::Plugin)
    }

    pub fn as_str(&self) -> &str {
        match self {
            DependencyKind::Plugin => PLUGIN_DEPENDENCY_TYPE,
            DependencyKind::Other(kind) => kind,
        }
    }
}

impl From<String> for DependencyKind {
    fn from(value: String) -> Self {
        if value == PLUGIN_DEPENDENCY_TYPE {
            DependencyKind::Plugin
        } else {
            DependencyKind::Other(value)
        }
    }
}

impl From<DependencyKind> for String {
    fn from(kind: DependencyKind) -> Self {
        kind.as_str().to_string()
    }
}

impl fmt::Display for DependencyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A typed `{type, name}` reference declared in a manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dependency {
    #[serde(rename = "type")]
    pub kind: DependencyKind,

    /// For plugin entries, the id of the referenced plugin
    pub name: String,

    /// Acceptable versions of the referenced plugin (optional)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<VersionRange>,
}

impl Dependency {
    /// A reference to another plugin, any version
    pub fn plugin(name: &str) -> Self {
        Self {
            kind: DependencyKind::Plugin,
            name: name.to_string(),
            version: None,
        }
    }

    /// A reference to another plugin restricted to a version range
    pub fn plugin_version(name: &str, version_range: VersionRange) -> Self {
        Self {
            kind: DependencyKind::Plugin,
            name: name.to_string(),
            version: Some(version_range),
        }
    }

    /// A reference of a non-plugin type, e.g. `("extension", "gd")`
    pub fn other(kind: &str, name: &str) -> Self {
        Self {
            kind: DependencyKind::from(kind.to_string()),
            name: name.to_string(),
            version: None,
        }
    }

    pub fn is_plugin(&self) -> bool {
        self.kind.is_plugin()
    }
}

impl fmt::Display for Dependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.version {
            Some(range) => write!(f, "{}: {} ({})", self.kind, self.name, range.constraint_string()),
            None => write!(f, "{}: {}", self.kind, self.name),
        }
    }
}

/// Error that can occur when resolving dependencies
#[derive(Debug, Error)]
pub enum DependencyError {
    /// One forced operation would need the same plugin both active and inactive
    #[error(
        "Plugin '{plugin_id}' would have to be both activated and deactivated while resolving '{root}'"
    )]
    Contradiction { plugin_id: String, root: String },

    /// A plugin the operation must activate has requirements no plan can meet
    #[error(
        "Plugin '{plugin_id}' cannot be activated while resolving '{root}': {}",
        join_issues(.issues)
    )]
    Unsatisfiable {
        plugin_id: String,
        root: String,
        issues: Vec<RequirementIssue>,
    },
}

fn join_issues(issues: &[RequirementIssue]) -> String {
    issues.iter().map(ToString::to_string).collect::<Vec<_>>().join("; ")
}

/// An unmet requirement or active conflict of a single plugin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequirementIssue {
    /// Required plugin is not installed
    NotInstalled(String),
    /// Required plugin is installed but inactive
    Inactive(String),
    /// Required plugin does not satisfy the declared version range
    VersionMismatch {
        plugin_id: String,
        required: String,
        found: String,
    },
    /// A declared conflict is currently active
    ConflictActive(String),
}

impl fmt::Display for RequirementIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequirementIssue::NotInstalled(id) => write!(f, "requires '{}', which is not installed", id),
            RequirementIssue::Inactive(id) => write!(f, "requires '{}', which is not active", id),
            RequirementIssue::VersionMismatch { plugin_id, required, found } => write!(
                f,
                "requires '{}' version '{}', but found version '{}'",
                plugin_id, required, found
            ),
            RequirementIssue::ConflictActive(id) => write!(f, "conflicts with active plugin '{}'", id),
        }
    }
}
