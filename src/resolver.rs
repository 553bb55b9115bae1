//! Request path resolution
//!
//! Maps a request path onto a file under one of two roots:
//! 1. paths starting with the asset prefix are looked up under the asset root
//!    with the prefix stripped;
//! 2. every other path is looked up under the top-level root.
//!
//! The first rule that applies decides; the two roots are never merged.
//! A resolved file must stay inside its root after symlinks are followed.

use crate::error::{ConfigurationError, ServeError};
use crate::http::mime;
use std::io;
use std::path::{Component, Path, PathBuf};
use std::time::SystemTime;
use tokio::fs;
use tracing::{debug, warn};

/// Prefix used when none is configured
pub const DEFAULT_ASSET_PREFIX: &str = "/static/";

/// A request path that maps to a readable regular file
#[derive(Debug, Clone)]
pub struct FileMatch {
    /// Canonical absolute path of the file
    pub path: PathBuf,
    pub content_type: &'static str,
    pub modified: Option<SystemTime>,
}

impl FileMatch {
    /// Read the whole file into memory
    pub async fn read(&self) -> Result<Vec<u8>, ServeError> {
        fs::read(&self.path).await.map_err(|source| ServeError::Read {
            path: self.path.clone(),
            source,
        })
    }
}

/// Why a request path did not map to a file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoMatchReason {
    NotFound,
    /// The path tried to leave its root. Callers treat this exactly like `NotFound`.
    TraversalRejected,
}

#[derive(Debug, Clone)]
pub enum Resolution {
    Match(FileMatch),
    NoMatch(NoMatchReason),
}

impl Resolution {
    pub const fn is_match(&self) -> bool {
        matches!(self, Self::Match(_))
    }
}

/// Resolves request paths against an asset root and an optional top-level root
///
/// Immutable after construction, so a single instance can be shared between
/// any number of concurrent requests.
#[derive(Debug, Clone)]
pub struct Resolver {
    asset_root: PathBuf,
    asset_prefix: String,
    top_level_root: Option<PathBuf>,
}

impl Resolver {
    /// Build a resolver using [`DEFAULT_ASSET_PREFIX`]
    pub fn new(
        asset_root: impl AsRef<Path>,
        top_level_root: Option<&Path>,
    ) -> Result<Self, ConfigurationError> {
        Self::with_prefix(asset_root, DEFAULT_ASSET_PREFIX, top_level_root)
    }

    /// Build a resolver with a custom asset prefix such as `/assets/`
    pub fn with_prefix(
        asset_root: impl AsRef<Path>,
        asset_prefix: &str,
        top_level_root: Option<&Path>,
    ) -> Result<Self, ConfigurationError> {
        if !asset_prefix.starts_with('/') || !asset_prefix.ends_with('/') {
            return Err(ConfigurationError::InvalidPrefix {
                prefix: asset_prefix.to_string(),
            });
        }

        let asset_root = validate_root(asset_root.as_ref())?;
        let top_level_root = top_level_root.map(validate_root).transpose()?;

        Ok(Self {
            asset_root,
            asset_prefix: asset_prefix.to_string(),
            top_level_root,
        })
    }

    pub fn asset_root(&self) -> &Path {
        &self.asset_root
    }

    pub fn asset_prefix(&self) -> &str {
        &self.asset_prefix
    }

    pub fn top_level_root(&self) -> Option<&Path> {
        self.top_level_root.as_deref()
    }

    /// Resolve a request path (the URI path, still percent-encoded)
    ///
    /// Fails only when the path exists but the filesystem refuses to say what
    /// it is, e.g. permission denied on a parent directory or a symlink loop.
    pub async fn resolve(&self, request_path: &str) -> Result<Resolution, ServeError> {
        if let Some(rest) = request_path.strip_prefix(&self.asset_prefix) {
            return lookup(&self.asset_root, rest, request_path).await;
        }

        match &self.top_level_root {
            Some(root) => lookup(root, request_path.trim_start_matches('/'), request_path).await,
            None => Ok(Resolution::NoMatch(NoMatchReason::NotFound)),
        }
    }
}

fn validate_root(path: &Path) -> Result<PathBuf, ConfigurationError> {
    let metadata = std::fs::metadata(path).map_err(|source| ConfigurationError::MissingRoot {
        path: path.to_path_buf(),
        source,
    })?;
    if !metadata.is_dir() {
        return Err(ConfigurationError::NotADirectory {
            path: path.to_path_buf(),
        });
    }
    path.canonicalize()
        .map_err(|source| ConfigurationError::MissingRoot {
            path: path.to_path_buf(),
            source,
        })
}

/// Turn the part of a request path below a root into a relative filesystem path
///
/// Rejects anything that could step outside the root before the filesystem
/// is touched at all.
fn sanitize(relative: &str) -> Result<PathBuf, NoMatchReason> {
    let Ok(decoded) = urlencoding::decode(relative) else {
        return Err(NoMatchReason::NotFound);
    };
    if decoded.contains('\0') || decoded.contains('\\') {
        return Err(NoMatchReason::TraversalRejected);
    }

    let mut clean = PathBuf::new();
    for segment in decoded.split('/') {
        match segment {
            "" | "." => {}
            ".." => return Err(NoMatchReason::TraversalRejected),
            _ => {
                // Catches drive prefixes and anything else that is not a plain name
                let mut components = Path::new(segment).components();
                match (components.next(), components.next()) {
                    (Some(Component::Normal(_)), None) => clean.push(segment),
                    _ => return Err(NoMatchReason::TraversalRejected),
                }
            }
        }
    }
    Ok(clean)
}

/// Absent paths are a miss, every other I/O failure is an error
fn classify(err: io::Error, path: &Path, request_path: &str) -> Result<Resolution, ServeError> {
    match err.kind() {
        io::ErrorKind::NotFound | io::ErrorKind::NotADirectory => {
            // Missing files are the common case, not worth more than debug
            debug!(path = request_path, "no file at {}", path.display());
            Ok(Resolution::NoMatch(NoMatchReason::NotFound))
        }
        _ => Err(ServeError::Lookup {
            path: path.to_path_buf(),
            source: err,
        }),
    }
}

async fn lookup(
    root: &Path,
    relative: &str,
    request_path: &str,
) -> Result<Resolution, ServeError> {
    let relative = match sanitize(relative) {
        Ok(p) => p,
        Err(reason) => {
            if reason == NoMatchReason::TraversalRejected {
                warn!(path = request_path, "path traversal attempt blocked");
            }
            return Ok(Resolution::NoMatch(reason));
        }
    };
    if relative.as_os_str().is_empty() {
        return Ok(Resolution::NoMatch(NoMatchReason::NotFound));
    }

    let candidate = root.join(&relative);
    let canonical = match fs::canonicalize(&candidate).await {
        Ok(path) => path,
        Err(e) => return classify(e, &candidate, request_path),
    };
    if !canonical.starts_with(root) {
        warn!(
            path = request_path,
            "resolved path escapes root {}, rejecting",
            root.display()
        );
        return Ok(Resolution::NoMatch(NoMatchReason::TraversalRejected));
    }

    let metadata = match fs::metadata(&canonical).await {
        Ok(metadata) => metadata,
        Err(e) => return classify(e, &canonical, request_path),
    };
    if !metadata.is_file() {
        return Ok(Resolution::NoMatch(NoMatchReason::NotFound));
    }

    let content_type = mime::get_content_type(canonical.extension().and_then(|e| e.to_str()));
    Ok(Resolution::Match(FileMatch {
        path: canonical,
        content_type,
        modified: metadata.modified().ok(),
    }))
}
