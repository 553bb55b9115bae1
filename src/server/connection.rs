// Connection handling module
// Accepts TCP connections, enforces the connection limit and serves each
// connection over HTTP/1.1 in its own task

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;

use http_body_util::Full;
use hyper::body::{Body as _, Bytes, Incoming};
use hyper::header::{HeaderName, REFERER, USER_AGENT};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Request, Response};
use hyper_util::rt::TokioIo;
use tracing::{debug, warn};

use super::ServeOptions;
use crate::handler::Handler;
use crate::logger::AccessLogEntry;

/// State shared by every connection of one server
pub struct ConnectionContext<H> {
    handler: Arc<H>,
    options: ServeOptions,
    active: AtomicUsize,
}

impl<H> ConnectionContext<H> {
    pub const fn new(handler: Arc<H>, options: ServeOptions) -> Self {
        Self {
            handler,
            options,
            active: AtomicUsize::new(0),
        }
    }

    pub fn active_connections(&self) -> usize {
        self.active.load(Ordering::SeqCst)
    }
}

impl<H> ConnectionContext<H>
where
    H: Handler<Incoming>,
{
    /// Run one request through the handler, writing an access log entry if enabled
    async fn dispatch(&self, req: Request<Incoming>, peer_addr: SocketAddr) -> Response<Full<Bytes>> {
        let Some(access_log) = &self.options.access_log else {
            return self.handler.handle(req).await;
        };

        let started = Instant::now();
        let mut entry = AccessLogEntry::new(
            peer_addr.ip().to_string(),
            req.method().to_string(),
            req.uri().path().to_string(),
        );
        entry.query = req.uri().query().map(ToString::to_string);
        entry.http_version = format!("{:?}", req.version())
            .trim_start_matches("HTTP/")
            .to_string();
        entry.referer = header_value(&req, &REFERER);
        entry.user_agent = header_value(&req, &USER_AGENT);

        let response = self.handler.handle(req).await;

        entry.status = response.status().as_u16();
        entry.body_bytes = response.body().size_hint().exact().unwrap_or(0);
        entry.request_time_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);
        access_log.write(&entry);
        response
    }
}

fn header_value(req: &Request<Incoming>, name: &HeaderName) -> Option<String> {
    req.headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(ToString::to_string)
}

/// Accept a connection, checking the connection limit.
///
/// Rejected connections are closed immediately without a response.
pub fn accept_connection<H>(
    stream: tokio::net::TcpStream,
    peer_addr: SocketAddr,
    ctx: &Arc<ConnectionContext<H>>,
) where
    H: Handler<Incoming> + 'static,
{
    // Increment counter first, then check limit (prevents race condition)
    let prev_count = ctx.active.fetch_add(1, Ordering::SeqCst);

    if let Some(max_conn) = ctx.options.max_connections {
        if prev_count >= max_conn {
            ctx.active.fetch_sub(1, Ordering::SeqCst);
            warn!("Max connections reached: {prev_count}/{max_conn}. Connection rejected.");
            drop(stream);
            return;
        }
    }

    debug!("[Connection] Accepted from: {peer_addr}");
    handle_connection(stream, peer_addr, Arc::clone(ctx));
}

/// Serve a single connection in a spawned task.
///
/// The whole connection, keep-alive included, is bounded by the configured
/// timeout. The active connection counter is decremented when it ends.
fn handle_connection<H>(
    stream: tokio::net::TcpStream,
    peer_addr: SocketAddr,
    ctx: Arc<ConnectionContext<H>>,
) where
    H: Handler<Incoming> + 'static,
{
    tokio::spawn(async move {
        let io = TokioIo::new(stream);

        let mut builder = http1::Builder::new();
        builder.keep_alive(ctx.options.keep_alive);

        let service_ctx = Arc::clone(&ctx);
        let service = service_fn(move |req| {
            let ctx = Arc::clone(&service_ctx);
            async move { Ok::<_, Infallible>(ctx.dispatch(req, peer_addr).await) }
        });
        let conn = builder.serve_connection(io, service);

        match tokio::time::timeout(ctx.options.timeout, conn).await {
            Ok(Ok(())) => {}
            Ok(Err(err)) => debug!("Connection from {peer_addr} ended with error: {err}"),
            Err(_) => warn!(
                "Connection from {peer_addr} timed out after {} seconds",
                ctx.options.timeout.as_secs()
            ),
        }

        ctx.active.fetch_sub(1, Ordering::SeqCst);
    });
}
