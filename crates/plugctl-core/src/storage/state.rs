use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tokio::fs;

use crate::storage::config::ConfigFormat;
use crate::storage::error::StorageSystemError;

type Result<T> = std::result::Result<T, StorageSystemError>;

#[derive(Debug, Default, Serialize, Deserialize)]
struct ActivationState {
    #[serde(default)]
    active: Vec<String>,
}

/// Persists the ids of active plugins between runs as a JSON file.
#[derive(Debug, Clone)]
pub struct ActivationStore {
    path: PathBuf,
}

impl ActivationStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the persisted active ids. A missing file means nothing is active.
    pub async fn load(&self) -> Result<Vec<String>> {
        match fs::read_to_string(&self.path).await {
            Ok(data) => {
                let state: ActivationState = ConfigFormat::Json.decode(&data)?;
                Ok(state.active)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(StorageSystemError::io(e, "read_state", self.path.clone())),
        }
    }

    /// Replace the persisted active ids.
    pub async fn save(&self, active: &[String]) -> Result<()> {
        let state = ActivationState { active: active.to_vec() };
        let data = ConfigFormat::Json.encode(&state)?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| StorageSystemError::io(e, "create_state_dir", parent.to_path_buf()))?;
        }
        fs::write(&self.path, data)
            .await
            .map_err(|e| StorageSystemError::io(e, "write_state", self.path.clone()))?;
        log::debug!("Saved {} active plugin(s) to {}", active.len(), self.path.display());
        Ok(())
    }
}
