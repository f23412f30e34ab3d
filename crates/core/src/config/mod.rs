//! Configuration system for Lucid
//!
//! This module provides:
//! - [`CoreConfig`] - settings for the event bus and task scheduler
//! - [`ModuleConfig`] - a trait for module-owned config files
//! - TOML file format with auto-generated defaults
//!
//! # Example
//!
//! ```ignore
//! use serde::{Deserialize, Serialize};
//! use lucid_core::ModuleConfig;
//!
//! #[derive(Default, Serialize, Deserialize)]
//! pub struct TrackerConfig {
//!     pub max_history: usize,
//! }
//!
//! impl ModuleConfig for TrackerConfig {
//!     const MODULE_NAME: &'static str = "tracker";
//! }
//!
//! let config = TrackerConfig::load(lucid.data_dir()?)?;
//! ```

mod loader;

use std::path::Path;

use serde::{de::DeserializeOwned, Deserialize, Serialize};

pub use loader::{config_dir, core_config_path, module_config_path};

/// Configuration system errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read or write config file
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Failed to parse TOML content
    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Failed to serialize config to TOML
    #[error("Failed to serialize config: {0}")]
    SerializeError(#[from] toml::ser::Error),

    /// The context was created without a data directory
    #[error("Config directory not available - no data directory configured")]
    NoConfigDirectory,
}

/// Result type for config operations
pub type ConfigResult<T> = Result<T, ConfigError>;

fn read_or_create<T>(path: &Path, what: &str) -> ConfigResult<T>
where
    T: Default + Serialize + DeserializeOwned,
{
    if path.exists() {
        let content = std::fs::read_to_string(path)?;
        let config: T = toml::from_str(&content)?;
        tracing::debug!("Loaded {} config from {:?}", what, path);
        Ok(config)
    } else {
        let default = T::default();
        write_toml(path, &default)?;
        tracing::info!("Created default {} config at {:?}", what, path);
        Ok(default)
    }
}

fn write_toml<T: Serialize>(path: &Path, value: &T) -> ConfigResult<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let content = toml::to_string_pretty(value)?;
    std::fs::write(path, content)?;
    Ok(())
}

/// Trait for module configuration types.
///
/// Configs are stored at
/// `<data_dir>/config/lucid/modules/{MODULE_NAME}.toml`.
pub trait ModuleConfig: Default + Serialize + DeserializeOwned + Send + Sync {
    /// The module name used for config file path resolution.
    const MODULE_NAME: &'static str;

    /// Load config from file, creating default if missing.
    fn load(data_dir: &Path) -> ConfigResult<Self> {
        let path = module_config_path(data_dir, Self::MODULE_NAME);
        read_or_create(&path, Self::MODULE_NAME)
    }

    /// Save config to file.
    ///
    /// Creates parent directories if they don't exist.
    fn save(&self, data_dir: &Path) -> ConfigResult<()> {
        let path = module_config_path(data_dir, Self::MODULE_NAME);
        write_toml(&path, self)?;
        tracing::debug!("Saved config for {} to {:?}", Self::MODULE_NAME, path);
        Ok(())
    }

    /// Reload config from file.
    fn reload(&mut self, data_dir: &Path) -> ConfigResult<()> {
        let path = module_config_path(data_dir, Self::MODULE_NAME);
        let content = std::fs::read_to_string(&path)?;
        *self = toml::from_str(&content)?;
        tracing::debug!("Reloaded config for {} from {:?}", Self::MODULE_NAME, path);
        Ok(())
    }
}

/// Event bus settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BusConfig {
    /// Maximum nesting of re-entrant `post` calls on one thread
    pub max_dispatch_depth: usize,

    /// Warn when a single subscriber call takes longer than this
    pub slow_subscriber_warn_ms: u64,
}

impl Default for BusConfig {
    fn default() -> Self {
        Self {
            max_dispatch_depth: 16,
            slow_subscriber_warn_ms: 5,
        }
    }
}

/// Delayed task scheduler settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TaskConfig {
    /// Capacity of the cross-thread submission queue
    pub queue_capacity: usize,

    /// Upper bound on tasks executed during one tick
    pub max_per_tick: usize,
}

impl Default for TaskConfig {
    fn default() -> Self {
        Self {
            queue_capacity: 1024,
            max_per_tick: 1024,
        }
    }
}

/// Core configuration.
///
/// Loaded from `<data_dir>/config/lucid.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoreConfig {
    /// Config version for future migration support
    pub version: u32,

    /// Enable debug logging
    pub debug: bool,

    pub bus: BusConfig,

    pub tasks: TaskConfig,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            version: 1,
            debug: false,
            bus: BusConfig::default(),
            tasks: TaskConfig::default(),
        }
    }
}

impl CoreConfig {
    /// Load core config from file, creating default if missing.
    pub fn load(data_dir: &Path) -> ConfigResult<Self> {
        read_or_create(&core_config_path(data_dir), "core")
    }

    /// Save core config to file.
    pub fn save(&self, data_dir: &Path) -> ConfigResult<()> {
        let path = core_config_path(data_dir);
        write_toml(&path, self)?;
        tracing::debug!("Saved core config to {:?}", path);
        Ok(())
    }

    /// Reload core config from file.
    pub fn reload(&mut self, data_dir: &Path) -> ConfigResult<()> {
        let path = core_config_path(data_dir);
        let content = std::fs::read_to_string(&path)?;
        *self = toml::from_str(&content)?;
        tracing::debug!("Reloaded core config from {:?}", path);
        Ok(())
    }
}
