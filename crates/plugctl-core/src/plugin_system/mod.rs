//! # plugctl Plugin System
//!
//! Installed plugins, their manifests, and dependency/conflict aware activation.
//!
//! ## Key Submodules and Responsibilities:
//!
//! - **[`dependency`]**: Typed `{type, name}` manifest entries ([`Dependency`]),
//!   requirement issues and resolution errors.
//! - **[`error`]**: [`PluginSystemError`](error::PluginSystemError), including the
//!   `InvalidPluginReference` and `InvalidManifest` failures.
//! - **[`loader`]**: Discovers plugin directories and parses their manifests.
//! - **[`manifest`]**: Plugin metadata ([`PluginManifest`]) with its ordered
//!   `requires` and `conflicts` lists.
//! - **[`registry`]**: The [`PluginRegistry`], owner of the active flags and of
//!   the activate/deactivate primitives.
//! - **[`resolver`]**: The [`Resolver`], which performs forced activation and
//!   deactivation over any [`PluginHost`].
//! - **[`traits`]**: The [`Plugin`] and [`PluginHost`] traits.
//! - **[`version`]**: Semver constraints used by versioned requirements.
pub mod dependency;
pub mod error;
pub mod loader;
pub mod manifest;
pub mod registry;
pub mod resolver;
pub mod traits;
pub mod version;

pub use dependency::{Dependency, DependencyKind, RequirementIssue};
pub use loader::{InstalledPlugin, PluginLoader};
pub use manifest::{ManifestBuilder, PluginManifest};
pub use registry::PluginRegistry;
pub use resolver::{PlannedAction, PlannedStep, ResolutionPlan, Resolver};
pub use traits::{Plugin, PluginHost};
pub use version::VersionRange;

// Test module declaration
#[cfg(test)]
mod tests;
