use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tokio::fs;

use crate::kernel::constants;
use crate::storage::error::StorageSystemError;

type Result<T> = std::result::Result<T, StorageSystemError>;

/// Supported configuration file formats
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConfigFormat {
    /// JSON format (.json)
    Json,
    /// YAML format (.yaml, .yml) - requires "yaml-config" feature
    #[cfg(feature = "yaml-config")]
    Yaml,
    /// TOML format (.toml) - requires "toml-config" feature
    #[cfg(feature = "toml-config")]
    Toml,
}

impl ConfigFormat {
    /// Get the file extension for this format
    pub fn extension(&self) -> &'static str {
        match self {
            ConfigFormat::Json => "json",
            #[cfg(feature = "yaml-config")]
            ConfigFormat::Yaml => "yaml",
            #[cfg(feature = "toml-config")]
            ConfigFormat::Toml => "toml",
        }
    }

    /// Determine format from file extension
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(|ext| match ext.to_lowercase().as_str() {
                "json" => Some(ConfigFormat::Json),
                #[cfg(feature = "yaml-config")]
                "yaml" | "yml" => Some(ConfigFormat::Yaml),
                #[cfg(feature = "toml-config")]
                "toml" => Some(ConfigFormat::Toml),
                _ => None,
            })
    }

    /// Deserialize any serde type from a string in this format
    pub fn decode<T: DeserializeOwned>(&self, data: &str) -> Result<T> {
        let err = |source: Box<dyn std::error::Error + Send + Sync>| StorageSystemError::DeserializationError {
            format: self.extension().to_string(),
            source,
        };
        match self {
            ConfigFormat::Json => serde_json::from_str(data).map_err(|e| err(Box::new(e))),
            #[cfg(feature = "yaml-config")]
            ConfigFormat::Yaml => serde_yaml::from_str(data).map_err(|e| err(Box::new(e))),
            #[cfg(feature = "toml-config")]
            ConfigFormat::Toml => toml::from_str(data).map_err(|e| err(Box::new(e))),
        }
    }

    /// Serialize any serde type to a string in this format
    pub fn encode<T: Serialize>(&self, value: &T) -> Result<String> {
        let err = |source: Box<dyn std::error::Error + Send + Sync>| StorageSystemError::SerializationError {
            format: self.extension().to_string(),
            source,
        };
        match self {
            ConfigFormat::Json => serde_json::to_string_pretty(value).map_err(|e| err(Box::new(e))),
            #[cfg(feature = "yaml-config")]
            ConfigFormat::Yaml => serde_yaml::to_string(value).map_err(|e| err(Box::new(e))),
            #[cfg(feature = "toml-config")]
            ConfigFormat::Toml => toml::to_string_pretty(value).map_err(|e| err(Box::new(e))),
        }
    }
}

/// Application configuration.
///
/// Every field has a default, so a partial file (or no file) is valid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Directory scanned for installed plugins
    pub plugins_dir: PathBuf,
    /// JSON file holding the ids of active plugins
    pub state_file: PathBuf,
    /// Refuse primitive activations/deactivations that break requirements
    pub enforce_requirements: bool,
    /// Default log filter when RUST_LOG is unset
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            plugins_dir: PathBuf::from(constants::DEFAULT_PLUGINS_DIR),
            state_file: PathBuf::from(constants::DEFAULT_STATE_FILE),
            enforce_requirements: true,
            log_level: "warn".to_string(),
        }
    }
}

impl AppConfig {
    /// Load the configuration at `path`, format chosen by extension.
    ///
    /// A missing file yields the defaults.
    pub async fn load(path: &Path) -> Result<Self> {
        let format = ConfigFormat::from_path(path)
            .ok_or_else(|| StorageSystemError::UnsupportedConfigFormat(path.to_path_buf()))?;

        let data = match fs::read_to_string(path).await {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::debug!("No configuration at {}, using defaults", path.display());
                return Ok(Self::default());
            }
            Err(e) => return Err(StorageSystemError::io(e, "read_config", path.to_path_buf())),
        };

        format.decode(&data)
    }

    /// Write the configuration to `path`, creating parent directories.
    pub async fn save(&self, path: &Path) -> Result<()> {
        let format = ConfigFormat::from_path(path)
            .ok_or_else(|| StorageSystemError::UnsupportedConfigFormat(path.to_path_buf()))?;
        let data = format.encode(self)?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| StorageSystemError::io(e, "create_config_dir", parent.to_path_buf()))?;
        }
        fs::write(path, data)
            .await
            .map_err(|e| StorageSystemError::io(e, "write_config", path.to_path_buf()))
    }
}
