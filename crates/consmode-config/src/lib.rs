//! Configuration management for consmode
//!
//! TOML-based configuration covering the surface's knobs and the elevation
//! helper choice. The conservation control path itself is not configurable;
//! it is fixed by the driver and resolved by the HAL probe.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    NotFound(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
}

/// System-wide configuration directory.
pub const CONFIG_DIR: &str = "/etc/consmode";

const CONFIG_FILE: &str = "config.toml";

/// Per-user configuration directory, honoring `XDG_CONFIG_HOME`.
pub fn user_config_dir() -> Option<PathBuf> {
    if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
        if !xdg.is_empty() {
            return Some(PathBuf::from(xdg).join("consmode"));
        }
    }

    std::env::var("HOME")
        .ok()
        .map(|home| PathBuf::from(home).join(".config").join("consmode"))
}

/// Main consmode configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConsmodeConfig {
    #[serde(default)]
    pub surface: SurfaceConfig,

    #[serde(default)]
    pub helper: HelperConfig,
}

/// Interactive surface knobs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SurfaceConfig {
    /// Event loop tick rate in milliseconds.
    #[serde(default = "default_tick_rate_ms")]
    pub tick_rate_ms: u64,

    /// How long the success acknowledgement stays visible.
    #[serde(default = "default_toast_duration_ms")]
    pub toast_duration_ms: u64,

    /// Default log filter when RUST_LOG is unset.
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
}

fn default_tick_rate_ms() -> u64 {
    100
}

fn default_toast_duration_ms() -> u64 {
    2000
}

fn default_log_filter() -> String {
    "info".to_string()
}

impl Default for SurfaceConfig {
    fn default() -> Self {
        Self {
            tick_rate_ms: default_tick_rate_ms(),
            toast_duration_ms: default_toast_duration_ms(),
            log_filter: default_log_filter(),
        }
    }
}

/// Elevation helper selection
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HelperConfig {
    /// Helper command to run instead of the pkexec/sudo default chain.
    #[serde(default)]
    pub command: Option<String>,
}

impl ConsmodeConfig {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Load configuration from default locations: user config first, then
    /// the system file, then built-in defaults.
    pub fn load_default() -> Result<Self, ConfigError> {
        if let Some(user_dir) = user_config_dir() {
            let user_config = user_dir.join(CONFIG_FILE);
            if user_config.exists() {
                return Self::load(&user_config);
            }
        }

        let system_config = Path::new(CONFIG_DIR).join(CONFIG_FILE);
        if system_config.exists() {
            return Self::load(&system_config);
        }

        tracing::debug!("No configuration file found, using defaults");
        Ok(Self::default())
    }

    /// Save configuration to a file
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let contents = toml::to_string_pretty(self)?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, contents)?;
        tracing::info!("Configuration saved to {}", path.display());
        Ok(())
    }
}
