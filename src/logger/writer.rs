//! Access log writer module
//!
//! Writes rendered access log lines either to an append-only file or, when
//! no file is configured, through `tracing` under the `access` target.

use super::format::{AccessLogEntry, AccessLogFormat};
use crate::config::LoggingConfig;
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;
use std::sync::{Mutex, PoisonError};

/// Log output target
enum AccessLogTarget {
    Tracing,
    File(Mutex<File>),
}

/// Access log sink owned by the server and shared between connections
pub struct AccessLog {
    format: AccessLogFormat,
    target: AccessLogTarget,
}

impl std::fmt::Debug for AccessLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let target = match self.target {
            AccessLogTarget::Tracing => "tracing",
            AccessLogTarget::File(_) => "file",
        };
        f.debug_struct("AccessLog")
            .field("format", &self.format)
            .field("target", &target)
            .finish()
    }
}

impl AccessLog {
    /// Build the sink described by the logging config, `None` if access logging is off
    pub fn from_config(config: &LoggingConfig) -> io::Result<Option<Self>> {
        if !config.access_log {
            return Ok(None);
        }
        let format = AccessLogFormat::from(config.access_log_format.as_str());
        let log = match config.access_log_file.as_deref() {
            Some(path) => Self::open(format, path)?,
            None => Self::tracing(format),
        };
        Ok(Some(log))
    }

    pub const fn tracing(format: AccessLogFormat) -> Self {
        Self {
            format,
            target: AccessLogTarget::Tracing,
        }
    }

    pub fn open(format: AccessLogFormat, path: impl AsRef<Path>) -> io::Result<Self> {
        Ok(Self {
            format,
            target: AccessLogTarget::File(Mutex::new(open_log_file(path.as_ref())?)),
        })
    }

    pub fn write(&self, entry: &AccessLogEntry) {
        let line = entry.render(&self.format);
        match &self.target {
            AccessLogTarget::Tracing => tracing::info!(target: "access", "{line}"),
            AccessLogTarget::File(file) => {
                // A panicking writer leaves at worst a partial line, keep logging
                let mut f = file.lock().unwrap_or_else(PoisonError::into_inner);
                if let Err(e) = writeln!(f, "{line}") {
                    tracing::warn!("Failed to write access log: {e}");
                }
            }
        }
    }
}

/// Open or create a log file for appending
fn open_log_file(path: &Path) -> io::Result<File> {
    // Create parent directories if they don't exist
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    OpenOptions::new().create(true).append(true).open(path)
}
