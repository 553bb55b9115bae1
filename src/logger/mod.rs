//! Logger module
//!
//! Diagnostics go through `tracing`, installed here with a
//! `tracing-subscriber` formatter. Access logging is separate: each request
//! renders an [`AccessLogEntry`] in the configured format and hands it to an
//! [`AccessLog`] sink.

mod format;
pub mod writer;

pub use format::{AccessLogEntry, AccessLogFormat};
pub use writer::AccessLog;

use crate::config::{Config, LoggingConfig};
use std::net::SocketAddr;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Install the global `tracing` subscriber
///
/// Should be called once at application startup. `RUST_LOG`, when set,
/// takes precedence over the configured level.
pub fn init(config: &LoggingConfig) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to install tracing subscriber: {e}"))
}

pub fn log_server_start(addr: &SocketAddr, config: &Config) {
    let files = &config.static_files;
    info!("Listening on: http://{addr}");
    info!(
        "Serving {} under {}",
        files.static_root, files.static_prefix
    );
    match &files.root {
        Some(root) => info!("Serving {root} at /"),
        None => info!("No top-level root configured"),
    }
    if let Some(workers) = config.server.workers {
        info!("Worker threads: {workers}");
    }
    if let Some(ref path) = config.logging.access_log_file {
        info!("Access log: {path}");
    }
}
