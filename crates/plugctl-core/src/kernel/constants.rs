/// Application name
pub const APP_NAME: &str = "plugctl";

/// Application version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default configuration file, relative to the working directory
pub const DEFAULT_CONFIG_FILE: &str = ".plugctl/config.toml";

/// Default plugins directory
pub const DEFAULT_PLUGINS_DIR: &str = "plugins";

/// Default file holding the persisted list of active plugins
pub const DEFAULT_STATE_FILE: &str = ".plugctl/active_plugins.json";

/// Manifest file names looked up in each plugin directory, in order
pub const MANIFEST_FILE_NAMES: &[&str] = &["manifest.json", "manifest.toml", "manifest.yaml", "manifest.yml"];

/// Dependency `type` value that refers to another plugin
pub const PLUGIN_DEPENDENCY_TYPE: &str = "plugin";
