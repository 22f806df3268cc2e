//! Application configuration read from `config.toml`.

use std::{
    collections::HashSet,
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result, bail};
pub use daily_check_suggest::SuggestConfig;
use serde::Deserialize;

/// Devices offered when no device list has been stored yet.
pub const BUILTIN_DEVICES: [&str; 4] = ["Phone", "Laptop", "Desktop", "Tablet"];

/// Top-level configuration loaded from `config.toml`.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    /// Document storage location.
    #[serde(default)]
    pub storage: StorageConfig,
    /// Device labels used before any list is stored.
    #[serde(default)]
    pub devices: DevicesConfig,
    /// Suggestion service endpoint and model.
    #[serde(default)]
    pub suggest: SuggestConfig,
}

impl AppConfig {
    /// Load configuration from `path`, using defaults when the file does not exist.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read, parsed, or fails validation.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents =
            fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
        Self::from_toml(&contents).with_context(|| format!("failed to parse {}", path.display()))
    }

    /// Parse and validate configuration text.
    ///
    /// # Errors
    /// Returns an error if the TOML is malformed or fails validation.
    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: Self = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        self.devices.ensure_valid_defaults()?;
        if self.suggest.endpoint.trim().is_empty() {
            bail!("suggest.endpoint must not be empty");
        }
        if self.suggest.model.trim().is_empty() {
            bail!("suggest.model must not be empty");
        }
        Ok(())
    }
}

/// Where documents are kept.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct StorageConfig {
    /// Data directory; the platform data directory is used when unset.
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
}

/// Device registry settings.
#[derive(Debug, Clone, Deserialize)]
pub struct DevicesConfig {
    #[serde(default = "DevicesConfig::builtin_defaults")]
    defaults: Vec<String>,
}

impl Default for DevicesConfig {
    fn default() -> Self {
        Self {
            defaults: Self::builtin_defaults(),
        }
    }
}

impl DevicesConfig {
    fn builtin_defaults() -> Vec<String> {
        BUILTIN_DEVICES.iter().map(|&label| label.to_owned()).collect()
    }

    /// Construct a configuration with explicit default labels.
    pub const fn from_defaults(defaults: Vec<String>) -> Self {
        Self { defaults }
    }

    /// Labels used when nothing has been stored yet.
    pub fn defaults(&self) -> &[String] {
        &self.defaults
    }

    fn ensure_valid_defaults(&self) -> Result<()> {
        if self.defaults.is_empty() {
            bail!("devices.defaults must list at least one device");
        }
        let mut seen = HashSet::new();
        for label in &self.defaults {
            if label.trim().is_empty() {
                bail!("devices.defaults must not contain empty names");
            }
            if label.trim() != label {
                bail!("devices.defaults must not contain leading or trailing spaces: {label:?}");
            }
            if !seen.insert(label.as_str()) {
                bail!("duplicate default device detected: {label}");
            }
        }
        Ok(())
    }
}
