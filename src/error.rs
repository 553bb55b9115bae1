//! Error types
//!
//! Configuration errors are fatal at startup. Serving errors are turned into
//! HTTP status codes by the static file handler and never reach the client
//! with internal details attached.

use std::io;
use std::path::PathBuf;

/// Raised while constructing a [`crate::Resolver`]
#[derive(Debug, thiserror::Error)]
pub enum ConfigurationError {
    #[error("root directory '{}' is not accessible: {source}", .path.display())]
    MissingRoot {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("root '{}' is not a directory", .path.display())]
    NotADirectory { path: PathBuf },

    #[error("asset prefix must start and end with '/', got {prefix:?}")]
    InvalidPrefix { prefix: String },
}

/// Failure while serving a request path that exists on disk
#[derive(Debug, thiserror::Error)]
pub enum ServeError {
    /// The path could not be inspected, e.g. permission denied or a symlink loop
    #[error("failed to look up '{}': {source}", .path.display())]
    Lookup {
        path: PathBuf,
        #[source]
        source: io::Error,
    },


    #[error("failed to read '{}': {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}
