//! Request handler module
//!
//! A [`Handler`] turns a request into a response. Handlers compose by
//! wrapping: [`StaticFiles`] serves files and hands everything else to the
//! handler it wraps, and [`NotFound`] ends the chain when there is no
//! application behind the static layer.

pub mod static_files;

pub use static_files::StaticFiles;

use crate::http;
use async_trait::async_trait;
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Request, Response};
use std::sync::Arc;

/// Single-method request handling capability
///
/// Generic over the request body so the same handler runs behind the hyper
/// server (`Request<Incoming>`) and in tests with any in-memory body.
#[async_trait]
pub trait Handler<B>: Send + Sync
where
    B: Send + 'static,
{
    async fn handle(&self, req: Request<B>) -> Response<Full<Bytes>>;
}

#[async_trait]
impl<B, H> Handler<B> for Arc<H>
where
    B: Send + 'static,
    H: Handler<B> + ?Sized,
{
    async fn handle(&self, req: Request<B>) -> Response<Full<Bytes>> {
        (**self).handle(req).await
    }
}

/// Terminal handler answering every request with 404
#[derive(Debug, Clone, Copy, Default)]
pub struct NotFound;

#[async_trait]
impl<B> Handler<B> for NotFound
where
    B: Send + 'static,
{
    async fn handle(&self, _req: Request<B>) -> Response<Full<Bytes>> {
        http::build_404_response()
    }
}
