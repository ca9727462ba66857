use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Deserialize;
use tokio::fs;

use crate::kernel::constants::MANIFEST_FILE_NAMES;
use crate::kernel::error::{Error as KernelError, Result as KernelResult};
use crate::plugin_system::dependency::Dependency;
use crate::plugin_system::error::PluginSystemError;
use crate::plugin_system::manifest::PluginManifest;
use crate::plugin_system::registry::PluginRegistry;
use crate::plugin_system::traits::Plugin;
use crate::storage::config::ConfigFormat;

// --- Intermediate struct for deserialization ---

#[derive(Deserialize, Debug)]
struct RawPluginManifest {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    name: Option<String>,
    version: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    author: String,
    #[serde(default)]
    website: Option<String>,
    #[serde(default)]
    license: Option<String>,
    #[serde(default)]
    requires: Vec<Dependency>,
    #[serde(default)]
    conflicts: Vec<Dependency>,
    #[serde(default)]
    tags: Vec<String>,
}

/// A plugin discovered on disk.
///
/// Its id is the name of its directory. `manifest` is `None` when the
/// directory has no manifest file or the file could not be parsed.
#[derive(Debug, Clone)]
pub struct InstalledPlugin {
    id: String,
    manifest: Option<PluginManifest>,
}

impl InstalledPlugin {
    pub fn new(id: &str, manifest: Option<PluginManifest>) -> Self {
        Self {
            id: id.to_string(),
            manifest,
        }
    }
}

impl Plugin for InstalledPlugin {
    fn id(&self) -> &str {
        &self.id
    }

    fn manifest(&self) -> Option<&PluginManifest> {
        self.manifest.as_ref()
    }
}

/// Discovers installed plugins in one or more plugin directories.
pub struct PluginLoader {
    plugin_dirs: Vec<PathBuf>,
}

impl PluginLoader {
    pub fn new() -> Self {
        Self { plugin_dirs: Vec::new() }
    }

    /// Add a directory whose subdirectories are plugins
    pub fn add_plugin_dir<P: AsRef<Path>>(&mut self, dir: P) {
        self.plugin_dirs.push(dir.as_ref().to_path_buf());
    }

    /// Directories scanned, in priority order
    pub fn plugin_dirs(&self) -> &[PathBuf] {
        &self.plugin_dirs
    }

    /// Scan every plugin directory.
    ///
    /// Plugins are returned sorted by id within each directory. When two
    /// directories contain the same id, the first one wins.
    pub async fn scan(&self) -> KernelResult<Vec<InstalledPlugin>> {
        let mut plugins = Vec::new();
        let mut seen = HashSet::new();

        for dir in &self.plugin_dirs {
            if !fs::try_exists(dir).await.unwrap_or(false) {
                log::warn!("Plugin directory {} does not exist, skipping", dir.display());
                continue;
            }

            for (id, path) in Self::list_plugin_dirs(dir).await? {
                if !seen.insert(id.clone()) {
                    log::warn!("Plugin '{}' in {} shadowed by an earlier directory", id, dir.display());
                    continue;
                }
                let manifest = Self::find_and_load_manifest(&id, &path).await;
                plugins.push(InstalledPlugin::new(&id, manifest));
            }
        }

        log::debug!("Discovered {} plugin(s)", plugins.len());
        Ok(plugins)
    }

    /// Scan and register every discovered plugin, returning how many were registered.
    pub async fn register_all_plugins(&self, registry: &mut PluginRegistry) -> KernelResult<usize> {
        let plugins = self.scan().await?;
        let count = plugins.len();
        for plugin in plugins {
            registry.register_plugin(Arc::new(plugin))?;
        }
        Ok(count)
    }

    /// Parse a manifest file for the plugin `plugin_id`.
    ///
    /// A manifest `id`, when present, must match the plugin directory name.
    pub async fn load_manifest(path: &Path, plugin_id: &str) -> KernelResult<PluginManifest> {
        let content = fs::read_to_string(path)
            .await
            .map_err(|e| KernelError::io(e, "read_manifest", path.to_path_buf()))?;

        let format = ConfigFormat::from_path(path).ok_or_else(|| PluginSystemError::ManifestError {
            path: path.to_path_buf(),
            message: "unsupported manifest format".to_string(),
            source: None,
        })?;

        let raw: RawPluginManifest = format.decode(&content).map_err(|e| PluginSystemError::ManifestError {
            path: path.to_path_buf(),
            message: format!("Failed to parse manifest {}", format.extension().to_uppercase()),
            source: Some(Box::new(e)),
        })?;

        if let Some(declared) = raw.id.as_deref().filter(|declared| *declared != plugin_id) {
            return Err(PluginSystemError::ManifestError {
                path: path.to_path_buf(),
                message: format!("manifest declares id '{}' but plugin directory is '{}'", declared, plugin_id),
                source: None,
            }
            .into());
        }

        Ok(PluginManifest {
            id: plugin_id.to_string(),
            name: raw.name.unwrap_or_else(|| plugin_id.to_string()),
            version: raw.version,
            description: raw.description,
            author: raw.author,
            website: raw.website,
            license: raw.license,
            requires: raw.requires,
            conflicts: raw.conflicts,
            tags: raw.tags,
        })
    }

    async fn list_plugin_dirs(dir: &Path) -> KernelResult<Vec<(String, PathBuf)>> {
        let mut entries = fs::read_dir(dir)
            .await
            .map_err(|e| KernelError::io(e, "read_plugin_dir", dir.to_path_buf()))?;

        let mut found = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| KernelError::io(e, "read_plugin_dir_entry", dir.to_path_buf()))?
        {
            let path = entry.path();
            if !path.is_dir() {
                continue;
            }
            match entry.file_name().to_str() {
                Some(name) => found.push((name.to_string(), path)),
                None => log::warn!("Skipping plugin directory with non UTF-8 name: {}", path.display()),
            }
        }

        found.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(found)
    }

    async fn find_and_load_manifest(id: &str, plugin_dir: &Path) -> Option<PluginManifest> {
        for file_name in MANIFEST_FILE_NAMES {
            let candidate = plugin_dir.join(file_name);
            if !fs::try_exists(&candidate).await.unwrap_or(false) {
                continue;
            }
            return match Self::load_manifest(&candidate, id).await {
                Ok(manifest) => Some(manifest),
                Err(e) => {
                    log::warn!("Plugin '{}' has an invalid manifest: {}", id, e);
                    None
                }
            };
        }

        log::warn!("Plugin '{}' has no manifest in {}", id, plugin_dir.display());
        None
    }
}

impl Default for PluginLoader {
    fn default() -> Self {
        Self::new()
    }
}
