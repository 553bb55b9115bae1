//! Static file serving module
//!
//! [`StaticFiles`] sits in front of another handler. Requests whose path
//! resolves to a file are answered here; all others go to the wrapped
//! handler untouched.

use crate::config::StaticFilesConfig;
use crate::error::ConfigurationError;
use crate::handler::Handler;
use crate::http::{self, cache, cache::CachePolicy, FileHeaders};
use crate::resolver::{FileMatch, Resolution, Resolver};
use async_trait::async_trait;
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::header::IF_NONE_MATCH;
use hyper::{Method, Request, Response};
use std::path::Path;
use tracing::{debug, error};

/// Static file middleware wrapping the next handler
#[derive(Debug, Clone)]
pub struct StaticFiles<H> {
    resolver: Resolver,
    cache_control: String,
    allow_all_origins: bool,
    next: H,
}

impl<H> StaticFiles<H> {
    /// Wrap `next` with the default cache policy and CORS enabled
    pub fn new(resolver: Resolver, next: H) -> Self {
        Self {
            resolver,
            cache_control: CachePolicy::default().to_header_value(),
            allow_all_origins: true,
            next,
        }
    }

    /// Build from the `[static_files]` configuration section
    pub fn from_config(config: &StaticFilesConfig, next: H) -> Result<Self, ConfigurationError> {
        let resolver = Resolver::with_prefix(
            &config.static_root,
            &config.static_prefix,
            config.root.as_deref().map(Path::new),
        )?;
        Ok(Self::new(resolver, next)
            .with_max_age(config.max_age)
            .with_allow_all_origins(config.allow_all_origins))
    }

    #[must_use]
    pub fn with_max_age(mut self, max_age: u32) -> Self {
        self.cache_control = CachePolicy::from_max_age(max_age).to_header_value();
        self
    }

    #[must_use]
    pub fn with_allow_all_origins(mut self, allow: bool) -> Self {
        self.allow_all_origins = allow;
        self
    }

    pub const fn resolver(&self) -> &Resolver {
        &self.resolver
    }

    /// Answer a request for a resolved file
    async fn respond(
        &self,
        file: &FileMatch,
        method: &Method,
        if_none_match: Option<&str>,
    ) -> Response<Full<Bytes>> {
        let is_head = match *method {
            Method::GET => false,
            Method::HEAD => true,
            _ => return http::build_405_response(),
        };

        let content = match file.read().await {
            Ok(content) => content,
            Err(e) => {
                error!("{e}");
                return http::build_500_response();
            }
        };

        let etag = cache::generate_etag(&content);
        if cache::check_etag_match(if_none_match, &etag) {
            return http::build_304_response(&etag, &self.cache_control);
        }

        let last_modified = file.modified.map(cache::http_date);
        let headers = FileHeaders {
            content_type: file.content_type,
            etag: &etag,
            last_modified: last_modified.as_deref(),
            cache_control: &self.cache_control,
            allow_all_origins: self.allow_all_origins,
        };
        http::build_file_response(Bytes::from(content), &headers, is_head)
    }
}

#[async_trait]
impl<B, H> Handler<B> for StaticFiles<H>
where
    B: Send + 'static,
    H: Handler<B>,
{
    async fn handle(&self, req: Request<B>) -> Response<Full<Bytes>> {
        // Owned copies, the request is never borrowed across an await
        let path = req.uri().path().to_string();
        let file = match self.resolver.resolve(&path).await {
            Ok(Resolution::Match(file)) => file,
            Ok(Resolution::NoMatch(reason)) => {
                debug!(path = %path, ?reason, "passing request through");
                return self.next.handle(req).await;
            }
            Err(e) => {
                error!("{e}");
                return http::build_500_response();
            }
        };

        let method = req.method().clone();
        let if_none_match = req
            .headers()
            .get(IF_NONE_MATCH)
            .and_then(|v| v.to_str().ok())
            .map(ToString::to_string);

        self.respond(&file, &method, if_none_match.as_deref()).await
    }
}
