//! Console configuration
//!
//! Configuration is loaded from:
//! 1. Default values
//! 2. Config file (~/.config/roster/config.toml, or the path in ROSTER_CONFIG)
//! 3. Environment variables (ROSTER_* prefix)
//!
//! Environment variables take precedence over config file values.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::sync::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};

/// Environment variable prefix
const ENV_PREFIX: &str = "ROSTER";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Base URL of the users API
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Records per page
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    /// How long saved/deleted confirmations stay visible
    #[serde(default = "default_notification_ms")]
    pub notification_ms: u64,

    /// Whole-request timeout for API calls
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            page_size: default_page_size(),
            notification_ms: default_notification_ms(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Config {
    /// Load configuration from the default location and environment
    pub fn load() -> Result<Self> {
        Self::load_from_path(&Self::config_file_path())
    }

    /// Load configuration from a specific path
    ///
    /// A missing file means defaults. Environment overrides still apply.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {:?}", path))?;
            toml::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {:?}", path))?
        } else {
            Self::default()
        };

        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML string (no environment overrides)
    pub fn load_from_str(toml_content: &str) -> Result<Self> {
        let config: Config = toml::from_str(toml_content).context("Failed to parse config TOML")?;
        config.validate()?;
        Ok(config)
    }

    fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(val) = std::env::var(format!("{}_API_URL", ENV_PREFIX)) {
            if !val.is_empty() {
                self.api_url = val;
            }
        }

        if let Ok(val) = std::env::var(format!("{}_PAGE_SIZE", ENV_PREFIX)) {
            self.page_size = val
                .parse()
                .with_context(|| format!("Invalid {}_PAGE_SIZE: {:?}", ENV_PREFIX, val))?;
        }

        if let Ok(val) = std::env::var(format!("{}_NOTIFICATION_MS", ENV_PREFIX)) {
            self.notification_ms = val
                .parse()
                .with_context(|| format!("Invalid {}_NOTIFICATION_MS: {:?}", ENV_PREFIX, val))?;
        }

        Ok(())
    }

    fn validate(&self) -> Result<()> {
        if !(1..=MAX_PAGE_SIZE).contains(&self.page_size) {
            bail!(
                "page_size must be between 1 and {}, got {}",
                MAX_PAGE_SIZE,
                self.page_size
            );
        }
        if !self.api_url.starts_with("http://") && !self.api_url.starts_with("https://") {
            bail!("api_url must be an http(s) URL, got {:?}", self.api_url);
        }
        Ok(())
    }

    pub fn notification_ttl(&self) -> Duration {
        Duration::from_millis(self.notification_ms)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Get the config file path
    pub fn config_file_path() -> PathBuf {
        if let Ok(path) = std::env::var(format!("{}_CONFIG", ENV_PREFIX)) {
            return PathBuf::from(path);
        }
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("roster")
            .join("config.toml")
    }
}

fn default_api_url() -> String {
    "http://localhost:9000".to_string()
}

fn default_page_size() -> u32 {
    DEFAULT_PAGE_SIZE
}

fn default_notification_ms() -> u64 {
    3000
}

fn default_timeout_secs() -> u64 {
    10
}
