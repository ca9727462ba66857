#![cfg(test)]

use tempfile::tempdir;

use super::common::{open_registry, test_config};
use crate::kernel::error::{Error, Result};
use crate::plugin_system::error::PluginSystemError;
use crate::plugin_system::resolver::Resolver;
use crate::plugin_system::traits::PluginHost;

#[tokio::test]
async fn test_forced_activation_persists_across_reload() -> Result<()> {
    let tmp_dir = tempdir().expect("Failed to create temp directory");
    let config = test_config(tmp_dir.path());

    let (mut registry, store) = open_registry(&config).await?;
    assert_eq!(registry.plugin_count(), 7);
    assert_eq!(registry.active_count(), 0);

    assert!(Resolver::new(&mut registry).activate("blog", true)?);
    assert_eq!(registry.active_plugin_ids(), vec!["blog", "comments", "likes"]);
    store.save(&registry.active_plugin_ids()).await?;

    let (reloaded, _) = open_registry(&config).await?;
    assert_eq!(reloaded.active_plugin_ids(), vec!["blog", "comments", "likes"]);
    assert!(reloaded.consistency_report().is_empty());
    Ok(())
}

#[tokio::test]
async fn test_theme_switch_and_cascade_deactivation() -> Result<()> {
    let tmp_dir = tempdir().expect("Failed to create temp directory");
    let config = test_config(tmp_dir.path());
    let (mut registry, _) = open_registry(&config).await?;

    let mut resolver = Resolver::new(&mut registry);
    assert!(resolver.activate("modern_theme", false)?);
    assert!(resolver.activate("dashboard", true)?);

    // Unforced activation of the other theme is refused while modern is on
    assert!(!resolver.activate("classic_theme", false)?);
    assert!(resolver.activate("classic_theme", true)?);
    assert!(!resolver.host().is_active("modern_theme"));

    let plan = resolver.plan_deactivation("likes")?;
    assert_eq!(plan.deactivations(), vec!["dashboard", "blog", "comments", "likes"]);

    assert!(resolver.deactivate("likes", true)?);
    assert_eq!(registry.active_plugin_ids(), vec!["classic_theme"]);
    Ok(())
}

#[tokio::test]
async fn test_plugin_without_manifest_is_listed_but_not_resolvable() -> Result<()> {
    let tmp_dir = tempdir().expect("Failed to create temp directory");
    let config = test_config(tmp_dir.path());
    let (mut registry, _) = open_registry(&config).await?;

    assert!(registry.has_plugin("legacy"));
    match Resolver::new(&mut registry).activate("legacy", true) {
        Err(PluginSystemError::InvalidManifest { plugin_id }) => assert_eq!(plugin_id, "legacy"),
        other => panic!("Expected InvalidManifest, got {:?}", other),
    }

    let err: Error = Resolver::new(&mut registry)
        .deactivate("missing", true)
        .unwrap_err()
        .into();
    assert_eq!(err.plugin_id(), Some("missing"));
    Ok(())
}

#[tokio::test]
async fn test_stale_state_entries_are_ignored() -> Result<()> {
    let tmp_dir = tempdir().expect("Failed to create temp directory");
    let config = test_config(tmp_dir.path());
    let (_, store) = open_registry(&config).await?;
    store
        .save(&["likes".to_string(), "uninstalled".to_string()])
        .await?;

    let (registry, _) = open_registry(&config).await?;
    assert_eq!(registry.active_plugin_ids(), vec!["likes"]);
    Ok(())
}
