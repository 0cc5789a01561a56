//! Pipeline configuration from naturedoc.toml

use crate::renderer::RenderOptions;
use crate::store::Principal;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Name of the configuration file looked up by the CLI
pub const CONFIG_FILE_NAME: &str = "naturedoc.toml";

/// Main configuration from naturedoc.toml
///
/// Every table is optional; missing values take their defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Renderer settings
    pub render: RenderOptions,

    /// Where articles are stored
    pub store: StoreConfig,

    /// Listing page settings
    pub listing: ListingConfig,

    /// Identity used for store writes made from the command line
    pub principal: Principal,
}

/// `[store]` table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Article directory, relative to the configuration file
    pub path: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("articles"),
        }
    }
}

/// `[listing]` table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListingConfig {
    /// Maximum excerpt length on article cards, in characters
    pub excerpt_chars: usize,
}

impl Default for ListingConfig {
    fn default() -> Self {
        Self { excerpt_chars: 160 }
    }
}

impl Config {
    /// Load configuration from a naturedoc.toml file
    ///
    /// # Parameters
    /// * `path` - Path to the naturedoc.toml configuration file
    ///
    /// # Returns
    /// * `Ok(Config)` - Successfully loaded configuration
    /// * `Err(ConfigError)` - Error reading or parsing the configuration file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(&path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load configuration, falling back to defaults when the file is absent
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        if !path.as_ref().exists() {
            log::info!(
                "No configuration at {}, using defaults",
                path.as_ref().display()
            );
            return Ok(Self::default());
        }
        Self::load(path)
    }

    /// Save configuration to a naturedoc.toml file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self)?;
        fs::write(&path, content)?;
        Ok(())
    }

    /// Article directory resolved against the directory holding the config
    pub fn store_path(&self, config_dir: &Path) -> PathBuf {
        config_dir.join(&self.store.path)
    }
}

/// Errors that can occur when loading or saving configuration
#[derive(Error, Debug)]
#[allow(clippy::enum_variant_names)]
pub enum ConfigError {
    /// IO error when reading or writing file
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Error parsing TOML
    #[error("TOML parse error: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Error serializing to TOML
    #[error("TOML serialize error: {0}")]
    SerializeError(#[from] toml::ser::Error),
}
