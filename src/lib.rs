//! Static file middleware for hyper services
//!
//! [`StaticFiles`] serves an asset root under a URL prefix (`/static/` by
//! default) and a top-level root at `/` (for files like `robots.txt`), and
//! forwards every other request to the [`Handler`] it wraps.
//!
//! ```no_run
//! use staticroots::{NotFound, Resolver, StaticFiles};
//! use std::path::Path;
//!
//! # fn main() -> Result<(), staticroots::ConfigurationError> {
//! let resolver = Resolver::new("static", Some(Path::new("public")))?;
//! let app = StaticFiles::new(resolver, NotFound).with_max_age(3600);
//! # let _ = app;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod handler;
pub mod http;
pub mod logger;
pub mod resolver;
pub mod server;

pub use error::{ConfigurationError, ServeError};
pub use handler::{Handler, NotFound, StaticFiles};
pub use resolver::{FileMatch, NoMatchReason, Resolution, Resolver};
