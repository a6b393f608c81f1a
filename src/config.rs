use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;
use tokio::fs;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub blocklist: BlocklistConfig,

    #[serde(default)]
    pub guard: GuardConfig,

    #[serde(default)]
    pub mirror: MirrorConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    #[serde(default = "default_storage_path")]
    pub path: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct BlocklistConfig {
    /// Entries added to the built-in seed on first run.
    #[serde(default)]
    pub extra_domains: Vec<String>,
    /// Path of the local blocked-page resource; redirect target for every
    /// blocked navigation, and always excluded from matching.
    #[serde(default = "default_blocked_page")]
    pub blocked_page: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct GuardConfig {
    /// Route-change poll period. Polling is the last-resort detection layer;
    /// the click/submit/mutation hooks run first-class.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct MirrorConfig {
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default)]
    pub user_id: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_log_enable")]
    pub enable: bool,
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
    /// Allowed verdicts are noisy; off by default, blocked ones always log.
    #[serde(default)]
    pub log_allowed: bool,
    #[serde(default = "default_memory_capacity")]
    pub memory_capacity: usize,
}

// Defaults
fn default_host() -> String {
    "127.0.0.1".to_string()
}
fn default_port() -> u16 {
    8943
}
fn default_storage_path() -> String {
    "siteguard.json".to_string()
}
fn default_blocked_page() -> String {
    "/blocked".to_string()
}
fn default_poll_interval_ms() -> u64 {
    1000
}
fn default_log_enable() -> bool {
    true
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_log_format() -> String {
    "text".to_string()
}
fn default_memory_capacity() -> usize {
    200
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            storage: StorageConfig::default(),
            blocklist: BlocklistConfig::default(),
            guard: GuardConfig::default(),
            mirror: MirrorConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: default_storage_path(),
        }
    }
}

impl Default for BlocklistConfig {
    fn default() -> Self {
        Self {
            extra_domains: vec![],
            blocked_page: default_blocked_page(),
        }
    }
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval_ms(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enable: default_log_enable(),
            level: default_log_level(),
            format: default_log_format(),
            log_allowed: false,
            memory_capacity: default_memory_capacity(),
        }
    }
}

impl Config {
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .await
            .context("Failed to read config file")?;
        let config: Config = toml::from_str(&contents).context("Failed to parse config TOML")?;
        Ok(config)
    }

    /// Absolute URL of the blocked-page resource served by the control API.
    pub fn blocked_page_url(&self) -> String {
        format!("http://{}:{}{}", self.host, self.port, self.blocklist.blocked_page)
    }
}
