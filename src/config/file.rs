//! Configuration file management for melodyq.
//!
//! This module handles loading and saving application configuration from TOML files.
//! Configuration is stored in the user's config directory and created with defaults
//! on first run.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Where the analysis service lives and how long to wait for it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ServerConfig {
    /// Base URL of the service, e.g. "http://127.0.0.1:5000"
    #[serde(default = "default_url")]
    pub url: String,
    /// Path of the capture-and-analyse endpoint
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    /// Request timeout in seconds. The service records for several seconds
    /// before answering, so this must stay well above the recording length.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_url() -> String {
    "http://127.0.0.1:5000".to_string()
}

fn default_endpoint() -> String {
    "/process-audio".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            endpoint: default_endpoint(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl ServerConfig {
    /// Full URL of the analysis endpoint, with exactly one `/` between base and path.
    pub fn endpoint_url(&self) -> String {
        let base = self.url.trim_end_matches('/');
        let path = self.endpoint.trim_start_matches('/');
        format!("{base}/{path}")
    }
}

/// Complete application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct MelodyqConfig {
    #[serde(default)]
    pub server: ServerConfig,
}

impl MelodyqConfig {
    /// Loads configuration from the user's config directory, writing the defaults
    /// first if no config file exists yet.
    ///
    /// # Errors
    /// - If the config directory cannot be determined or created
    /// - If the config file cannot be read or written
    /// - If the TOML is malformed
    pub fn load() -> anyhow::Result<Self> {
        let config_path = get_config_path()?;
        if !config_path.exists() {
            tracing::info!("No config found, writing defaults to {}", config_path.display());
            Self::default().save_to(&config_path)?;
        }
        Self::load_from(&config_path)
    }

    /// Loads configuration from a specific file.
    ///
    /// # Errors
    /// - If the file cannot be read
    /// - If the TOML is malformed
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        let config_content = fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Failed to read {}: {e}", path.display()))?;
        let config: MelodyqConfig = toml::from_str(&config_content)
            .map_err(|e| anyhow::anyhow!("Invalid config in {}: {e}", path.display()))?;
        Ok(config)
    }

    /// Writes configuration to a specific file.
    ///
    /// # Errors
    /// - If the config cannot be serialized
    /// - If the file cannot be written
    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        let config_content = toml::to_string_pretty(self)?;
        fs::write(path, config_content)?;
        tracing::info!("Configuration saved");
        Ok(())
    }
}

/// Retrieves the path to the config file, creating its directory if needed.
///
/// # Errors
/// - If the home directory cannot be determined
/// - If the config directory cannot be created
pub fn get_config_path() -> anyhow::Result<PathBuf> {
    let config_dir = dirs::home_dir()
        .ok_or_else(|| anyhow::anyhow!("Could not determine home directory"))?
        .join(".config")
        .join("melodyq");

    fs::create_dir_all(&config_dir)
        .map_err(|e| anyhow::anyhow!("Failed to create config directory: {e}"))?;

    Ok(config_dir.join("melodyq.toml"))
}
