use crate::engine::Algorithm;
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

    /// Reference file the corpus is drawn from.
    #[serde(default)]
    pub reference_path: String,

    /// true: re-read the file before every query. false: load once at
    /// startup and serve the same snapshot for the process lifetime.
    #[serde(default = "default_reread_on_query")]
    pub reread_on_query: bool,

    #[serde(default)]
    pub use_ssl: bool,

    #[serde(default)]
    pub algorithm: Algorithm,

    /// Payloads longer than this are rejected before matching.
    #[serde(default = "default_max_query_len")]
    pub max_query_len: usize,

    #[serde(default = "default_read_timeout_ms")]
    pub read_timeout_ms: u64,

    #[serde(default = "default_handshake_timeout_ms")]
    pub handshake_timeout_ms: u64,

    /// Serve multiple queries per connection until the client disconnects.
    #[serde(default)]
    pub keep_alive: bool,

    #[serde(default)]
    pub tls: TlsConfig,

    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub stats: StatsConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct TlsConfig {
    #[serde(default = "default_cert_path")]
    pub cert_path: String,
    #[serde(default = "default_key_path")]
    pub key_path: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_log_enable")]
    pub enable: bool,
    #[serde(default = "default_log_all_queries")]
    pub log_all_queries: bool,
    #[serde(default = "default_log_format")]
    pub format: String,
    #[serde(default = "default_log_level")]
    pub level: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StatsConfig {
    #[serde(default = "default_stats_enable")]
    pub enable: bool,
    #[serde(default = "default_log_interval")]
    pub log_interval_seconds: u64,
}

// Defaults
fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    44445
}
fn default_reread_on_query() -> bool {
    true
}
fn default_max_query_len() -> usize {
    1024
}
fn default_read_timeout_ms() -> u64 {
    5000
}
fn default_handshake_timeout_ms() -> u64 {
    5000
}
fn default_cert_path() -> String {
    "server.crt".to_string()
}
fn default_key_path() -> String {
    "server.key".to_string()
}
fn default_log_enable() -> bool {
    true
}
fn default_log_all_queries() -> bool {
    true
}
fn default_log_format() -> String {
    "text".to_string()
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_stats_enable() -> bool {
    true
}
fn default_log_interval() -> u64 {
    300
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            reference_path: String::new(),
            reread_on_query: default_reread_on_query(),
            use_ssl: false,
            algorithm: Algorithm::default(),
            max_query_len: default_max_query_len(),
            read_timeout_ms: default_read_timeout_ms(),
            handshake_timeout_ms: default_handshake_timeout_ms(),
            keep_alive: false,
            tls: TlsConfig::default(),
            logging: LoggingConfig::default(),
            stats: StatsConfig::default(),
        }
    }
}

impl Default for TlsConfig {
    fn default() -> Self {
        Self {
            cert_path: default_cert_path(),
            key_path: default_key_path(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enable: default_log_enable(),
            log_all_queries: default_log_all_queries(),
            format: default_log_format(),
            level: default_log_level(),
        }
    }
}

impl Default for StatsConfig {
    fn default() -> Self {
        Self {
            enable: default_stats_enable(),
            log_interval_seconds: default_log_interval(),
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
}
