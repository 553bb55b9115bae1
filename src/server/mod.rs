// Server module entry point
// Hosts a `Handler` behind a tokio + hyper HTTP/1.1 accept loop

pub mod connection;
pub mod listener;
pub mod signal;

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use hyper::body::Incoming;
use tokio::net::TcpListener;
use tracing::{error, info};

use crate::config::PerformanceConfig;
use crate::handler::Handler;
use crate::logger::AccessLog;
use connection::{accept_connection, ConnectionContext};

pub use listener::bind;
pub use signal::shutdown_signal;

/// Per-server connection behavior
#[derive(Debug, Clone)]
pub struct ServeOptions {
    pub keep_alive: bool,
    /// Upper bound on the lifetime of one connection
    pub timeout: Duration,
    pub max_connections: Option<usize>,
    pub access_log: Option<Arc<AccessLog>>,
}

impl ServeOptions {
    pub fn from_config(config: &PerformanceConfig, access_log: Option<AccessLog>) -> Self {
        Self {
            keep_alive: config.keep_alive_timeout > 0,
            timeout: Duration::from_secs(config.read_timeout.max(config.write_timeout)),
            max_connections: config
                .max_connections
                .map(|max| usize::try_from(max).unwrap_or(usize::MAX)),
            access_log: access_log.map(Arc::new),
        }
    }
}

impl Default for ServeOptions {
    fn default() -> Self {
        Self {
            keep_alive: true,
            timeout: Duration::from_secs(30),
            max_connections: None,
            access_log: None,
        }
    }
}

/// Accept connections until `shutdown` resolves
///
/// Each connection runs in its own task and shares `handler`, so the handler
/// is invoked concurrently from several worker threads.
pub async fn serve<H, F>(listener: TcpListener, handler: Arc<H>, options: ServeOptions, shutdown: F)
where
    H: Handler<Incoming> + 'static,
    F: Future<Output = ()>,
{
    let ctx = Arc::new(ConnectionContext::new(handler, options));
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            accept_result = listener.accept() => {
                match accept_result {
                    Ok((stream, peer_addr)) => accept_connection(stream, peer_addr, &ctx),
                    Err(e) => error!("Failed to accept connection: {e}"),
                }
            }

            () = &mut shutdown => {
                info!(
                    "Stopped accepting connections, {} still active",
                    ctx.active_connections()
                );
                break;
            }
        }
    }
}
