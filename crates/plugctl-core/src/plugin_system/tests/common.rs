#![cfg(test)]

use std::sync::{Arc, Mutex};

use crate::plugin_system::error::PluginSystemError;
use crate::plugin_system::manifest::{ManifestBuilder, PluginManifest};
use crate::plugin_system::registry::PluginRegistry;
use crate::plugin_system::traits::Plugin;

/// Shared log of primitive calls, e.g. `["activate:c", "activate:b"]`
pub type EventLog = Arc<Mutex<Vec<String>>>;

/// Mock plugin recording its activation hooks into a shared log
pub struct TestPlugin {
    id: String,
    manifest: Option<PluginManifest>,
    events: EventLog,
    veto_activation: bool,
}

impl TestPlugin {
    pub fn new(manifest: PluginManifest, events: EventLog) -> Self {
        Self {
            id: manifest.id.clone(),
            manifest: Some(manifest),
            events,
            veto_activation: false,
        }
    }

    pub fn without_manifest(id: &str, events: EventLog) -> Self {
        Self {
            id: id.to_string(),
            manifest: None,
            events,
            veto_activation: false,
        }
    }

    pub fn vetoing(mut self) -> Self {
        self.veto_activation = true;
        self
    }
}

impl Plugin for TestPlugin {
    fn id(&self) -> &str {
        &self.id
    }

    fn manifest(&self) -> Option<&PluginManifest> {
        self.manifest.as_ref()
    }

    fn on_activate(&self) -> Result<(), PluginSystemError> {
        if self.veto_activation {
            return Err(PluginSystemError::RegistrationError {
                plugin_id: self.id.clone(),
                message: "activation vetoed by test".to_string(),
            });
        }
        self.events.lock().unwrap().push(format!("activate:{}", self.id));
        Ok(())
    }

    fn on_deactivate(&self) -> Result<(), PluginSystemError> {
        self.events.lock().unwrap().push(format!("deactivate:{}", self.id));
        Ok(())
    }
}

pub fn new_log() -> EventLog {
    Arc::new(Mutex::new(Vec::new()))
}

pub fn events(log: &EventLog) -> Vec<String> {
    log.lock().unwrap().clone()
}

pub fn manifest(id: &str) -> ManifestBuilder {
    ManifestBuilder::new(id, id, "1.0.0")
}

/// Registry populated from manifests, in the given order, all inactive
pub fn registry_with(manifests: Vec<PluginManifest>, log: &EventLog) -> PluginRegistry {
    let mut registry = PluginRegistry::new();
    for m in manifests {
        registry
            .register_plugin(Arc::new(TestPlugin::new(m, log.clone())))
            .expect("register test plugin");
    }
    registry
}
