//! TOML configuration parsing and validation.
//!
//! ```toml
//! [remote]
//! project_id = "tra-lich-lam"
//! api_key = "..."                 # optional; SHIFTS_API_KEY overrides
//!
//! [history]
//! limit = 50
//!
//! [device]
//! identity_path = "./data/device_id"
//! ```

use anyhow::{Context, Result};
use serde::Deserialize;
use shift_lookup_core::models::HISTORY_LIMIT;
use std::path::{Path, PathBuf};

/// Environment variable that overrides `remote.api_key`.
pub const API_KEY_ENV: &str = "SHIFTS_API_KEY";

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub remote: RemoteConfig,
    #[serde(default)]
    pub history: HistoryConfig,
    #[serde(default)]
    pub device: DeviceConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RemoteConfig {
    pub project_id: String,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_database")]
    pub database: String,
    #[serde(default = "default_schedules_collection")]
    pub schedules_collection: String,
    #[serde(default = "default_history_collection")]
    pub history_collection: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    "https://firestore.googleapis.com/v1".to_string()
}
fn default_database() -> String {
    "(default)".to_string()
}
fn default_schedules_collection() -> String {
    "schedules".to_string()
}
fn default_history_collection() -> String {
    "search_history".to_string()
}
fn default_timeout_secs() -> u64 {
    30
}

#[derive(Debug, Deserialize, Clone)]
pub struct HistoryConfig {
    #[serde(default = "default_history_limit")]
    pub limit: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            limit: HISTORY_LIMIT,
        }
    }
}

fn default_history_limit() -> usize {
    HISTORY_LIMIT
}

#[derive(Debug, Deserialize, Clone)]
pub struct DeviceConfig {
    #[serde(default = "default_identity_path")]
    pub identity_path: PathBuf,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            identity_path: default_identity_path(),
        }
    }
}

fn default_identity_path() -> PathBuf {
    PathBuf::from("./data/device_id")
}

impl Config {
    /// Config with every default filled in, for commands that do not talk
    /// to the remote store.
    pub fn minimal() -> Self {
        Self {
            remote: RemoteConfig {
                project_id: String::new(),
                api_key: None,
                base_url: default_base_url(),
                database: default_database(),
                schedules_collection: default_schedules_collection(),
                history_collection: default_history_collection(),
                timeout_secs: default_timeout_secs(),
            },
            history: HistoryConfig::default(),
            device: DeviceConfig::default(),
        }
    }
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let mut config: Config =
        toml::from_str(&content).with_context(|| "Failed to parse config file")?;

    if let Ok(key) = std::env::var(API_KEY_ENV) {
        if !key.is_empty() {
            config.remote.api_key = Some(key);
        }
    }

    // Validate remote
    if config.remote.project_id.trim().is_empty() {
        anyhow::bail!("remote.project_id must not be empty");
    }
    if config.remote.timeout_secs == 0 {
        anyhow::bail!("remote.timeout_secs must be > 0");
    }
    for (name, value) in [
        ("remote.schedules_collection", &config.remote.schedules_collection),
        ("remote.history_collection", &config.remote.history_collection),
    ] {
        if value.is_empty() || value.contains('/') {
            anyhow::bail!("{} must be a single collection id, got '{}'", name, value);
        }
    }

    // Validate history
    if !(1..=HISTORY_LIMIT).contains(&config.history.limit) {
        anyhow::bail!("history.limit must be in [1, {}]", HISTORY_LIMIT);
    }

    Ok(config)
}
