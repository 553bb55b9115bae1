// Configuration types module
// Defines all configuration-related data structures

use serde::Deserialize;

/// Main configuration structure
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub performance: PerformanceConfig,
    pub static_files: StaticFilesConfig,
}

/// Server configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Tokio worker threads, CPU cores when unset
    #[serde(default)]
    pub workers: Option<usize>,
}

/// Logging configuration
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    /// `tracing` filter directive, e.g. `info` or `staticroots=debug`
    pub level: String,
    pub access_log: bool,
    /// Access log format (combined, common, json, or custom pattern)
    #[serde(default = "default_access_log_format")]
    pub access_log_format: String,
    /// Access log file path (optional, written through tracing if not set)
    #[serde(default)]
    pub access_log_file: Option<String>,
}

#[allow(clippy::missing_const_for_fn)]
fn default_access_log_format() -> String {
    "combined".to_string()
}

/// Performance configuration
#[derive(Debug, Deserialize, Clone)]
pub struct PerformanceConfig {
    pub keep_alive_timeout: u64,
    pub read_timeout: u64,
    pub write_timeout: u64,
    #[serde(default)]
    pub max_connections: Option<u64>,
}

/// Static file roots and response policy
#[derive(Debug, Deserialize, Clone)]
pub struct StaticFilesConfig {
    /// Directory served under `static_prefix`
    pub static_root: String,
    #[serde(default = "default_static_prefix")]
    pub static_prefix: String,
    /// Directory served at `/`, e.g. for `robots.txt`
    #[serde(default)]
    pub root: Option<String>,
    /// `Cache-Control` max-age in seconds, 0 disables caching
    #[serde(default = "default_max_age")]
    pub max_age: u32,
    #[serde(default = "default_allow_all_origins")]
    pub allow_all_origins: bool,
}

#[allow(clippy::missing_const_for_fn)]
fn default_static_prefix() -> String {
    crate::resolver::DEFAULT_ASSET_PREFIX.to_string()
}

#[allow(clippy::missing_const_for_fn)]
fn default_max_age() -> u32 {
    60
}

#[allow(clippy::missing_const_for_fn)]
fn default_allow_all_origins() -> bool {
    true
}
