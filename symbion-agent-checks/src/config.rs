//! Agent configuration
//!
//! Handles:
//! - Check scheduling settings
//! - Elasticsearch endpoint and check behaviour
//! - TOML file loading with environment overrides

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Environment variable naming an explicit config file
pub const CONFIG_PATH_ENV: &str = "SYMBION_AGENT_CONFIG";

/// Same variable the official Elasticsearch clients read for their default endpoint
pub const ELASTICSEARCH_URL_ENV: &str = "ELASTICSEARCH_URL";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    pub agent: AgentSettings,
    pub elasticsearch: ElasticConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentSettings {
    pub check_interval_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ElasticConfig {
    pub url: String,
    pub request_timeout_secs: Option<u64>,
    /// Placeholder delay of each run, stands in for shard collection
    pub run_delay_ms: u64,
    /// Keep the leadership computed at init instead of refreshing it every run
    pub leadership_snapshot_only: bool,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            agent: AgentSettings::default(),
            elasticsearch: ElasticConfig::default(),
        }
    }
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self {
            check_interval_secs: 30,
        }
    }
}

impl Default for ElasticConfig {
    fn default() -> Self {
        Self {
            url: crate::elastic::DEFAULT_URL.to_string(),
            request_timeout_secs: None,
            run_delay_ms: 1000,
            leadership_snapshot_only: false,
        }
    }
}

impl AgentConfig {
    /// Load config from `SYMBION_AGENT_CONFIG` or the OS-specific location,
    /// then apply environment overrides
    pub async fn load() -> Result<Self, ConfigError> {
        let path = match std::env::var(CONFIG_PATH_ENV) {
            Ok(p) if !p.is_empty() => PathBuf::from(p),
            _ => Self::config_file_path()?,
        };

        let mut config = Self::load_from(&path).await?;
        config.apply_url_override(std::env::var(ELASTICSEARCH_URL_ENV).ok());
        Ok(config)
    }

    /// Load config from a given file; a missing file yields the defaults
    pub async fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            info!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = tokio::fs::read_to_string(path).await?;
        let config: AgentConfig = toml::from_str(&content)?;
        debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Replace the Elasticsearch URL when an override is set and non-empty
    pub fn apply_url_override(&mut self, url: Option<String>) {
        if let Some(url) = url.filter(|u| !u.trim().is_empty()) {
            debug!("Elasticsearch url overridden to {}", url);
            self.elasticsearch.url = url;
        }
    }

    /// Get OS-specific config file path
    pub fn config_file_path() -> Result<PathBuf, ConfigError> {
        let mut path = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;

        path.push("symbion-agent");
        path.push("checks.toml");
        Ok(path)
    }
}
