use anyhow::{Context, Result};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::collab::api::DEFAULT_LATENCY_MS;
use crate::manifest::ValidationMode;
use crate::shell::navigation::DEFAULT_DEPTH_WARNING;
use crate::tui::ThemeVariant;

pub const MANIFEST_ENV: &str = "MANIFEST_SHELL_MANIFEST";
pub const IMAGE_ENV: &str = "MANIFEST_SHELL_IMAGE";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub manifest: ManifestSettings,
    #[serde(default)]
    pub navigation: NavigationSettings,
    #[serde(default)]
    pub api: ApiSettings,
    #[serde(default)]
    pub device: DeviceSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
    #[serde(default)]
    pub ui: UiSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ManifestSettings {
    /// External manifest; the bundled one is used when unset
    pub path: Option<PathBuf>,
    #[serde(default)]
    pub validation: ValidationMode,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NavigationSettings {
    #[serde(default = "default_depth_warning")]
    pub depth_warning: usize,
}

fn default_depth_warning() -> usize {
    DEFAULT_DEPTH_WARNING
}

impl Default for NavigationSettings {
    fn default() -> Self {
        Self {
            depth_warning: default_depth_warning(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiSettings {
    #[serde(default = "default_latency_ms")]
    pub latency_ms: u64,
}

fn default_latency_ms() -> u64 {
    DEFAULT_LATENCY_MS
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            latency_ms: default_latency_ms(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct DeviceSettings {
    /// File handed out by the image picker; unset means the pick is cancelled
    pub image_path: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_file")]
    pub file: PathBuf,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_file() -> PathBuf {
    PathBuf::from("manifest-shell.log")
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: default_log_file(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct UiSettings {
    #[serde(default)]
    pub theme: ThemeVariant,
}

impl Config {
    pub fn get_config_path() -> Result<PathBuf> {
        let config_dir = if cfg!(target_os = "linux") {
            // XDG config directory on Linux
            dirs::config_dir()
                .context("Failed to get XDG config directory")?
                .join("manifest-shell")
        } else {
            dirs::home_dir()
                .context("Failed to get home directory")?
                .join(".manifest-shell")
        };
        Ok(config_dir.join("config.toml"))
    }

    /// Load from the default location, then apply environment overrides
    pub fn load() -> Result<Self> {
        let config_path = Self::get_config_path()?;
        let mut config = Self::load_from(&config_path)?;
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn load_from(config_path: &Path) -> Result<Self> {
        debug!("Loading config from: {:?}", config_path);

        if !config_path.exists() {
            info!("Config file doesn't exist, using defaults");
            return Ok(Self::default());
        }

        let config_content = fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read config file: {:?}", config_path))?;

        let config: Config = toml::from_str(&config_content)
            .with_context(|| format!("Failed to parse config file: {:?}", config_path))?;

        debug!("Loaded config: {:?}", config);
        Ok(config)
    }

    /// Environment variables win over the file; empty values are ignored
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(path) = non_empty(MANIFEST_ENV) {
            debug!("{} overrides manifest path", MANIFEST_ENV);
            self.manifest.path = Some(PathBuf::from(path));
        }
        if let Some(path) = non_empty(IMAGE_ENV) {
            debug!("{} overrides device image path", IMAGE_ENV);
            self.device.image_path = Some(PathBuf::from(path));
        }
    }
}
