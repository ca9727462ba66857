#![cfg(test)]

use std::fs;
use std::path::Path;

use crate::kernel::error::Result;
use crate::plugin_system::loader::PluginLoader;
use crate::plugin_system::registry::PluginRegistry;
use crate::storage::config::AppConfig;
use crate::storage::state::ActivationStore;

/// A small installation:
///
/// - `blog` requires `comments`, which requires `likes`
/// - `dashboard` requires `blog`
/// - `classic_theme` and `modern_theme` conflict with each other
/// - `legacy` has no manifest
pub fn write_installation(plugins_dir: &Path) {
    let plugins: &[(&str, &str)] = &[
        (
            "blog",
            r#"{"version": "1.8.0", "requires": [{"type": "plugin", "name": "comments"}]}"#,
        ),
        (
            "comments",
            r#"{"version": "2.0.0", "requires": [{"type": "plugin", "name": "likes", "version": ">=1.0"}]}"#,
        ),
        ("likes", r#"{"version": "1.1.0"}"#),
        (
            "dashboard",
            r#"{"version": "1.0.0", "requires": [{"type": "plugin", "name": "blog"}]}"#,
        ),
        (
            "classic_theme",
            r#"{"version": "1.0.0", "conflicts": [{"type": "plugin", "name": "modern_theme"}]}"#,
        ),
        (
            "modern_theme",
            r#"{"version": "3.0.0", "conflicts": [{"type": "plugin", "name": "classic_theme"}]}"#,
        ),
    ];

    for (id, manifest) in plugins {
        let dir = plugins_dir.join(id);
        fs::create_dir_all(&dir).expect("Failed to create plugin dir");
        fs::write(dir.join("manifest.json"), manifest).expect("Failed to write manifest");
    }
    fs::create_dir_all(plugins_dir.join("legacy")).expect("Failed to create plugin dir");
}

/// Configuration rooted in `root`, with the installation written to `root/plugins`
pub fn test_config(root: &Path) -> AppConfig {
    let config = AppConfig {
        plugins_dir: root.join("plugins"),
        state_file: root.join("state").join("active_plugins.json"),
        ..AppConfig::default()
    };
    write_installation(&config.plugins_dir);
    config
}

/// Build a registry from disk and restore the persisted active set, the way a
/// fresh process would.
pub async fn open_registry(config: &AppConfig) -> Result<(PluginRegistry, ActivationStore)> {
    let mut registry = PluginRegistry::new().with_enforcement(config.enforce_requirements);
    let mut loader = PluginLoader::new();
    loader.add_plugin_dir(&config.plugins_dir);
    loader.register_all_plugins(&mut registry).await?;

    let store = ActivationStore::new(&config.state_file);
    registry.restore_active(store.load().await?);
    Ok((registry, store))
}
