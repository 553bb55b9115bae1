use anyhow::Context;
use clap::Parser;
use staticroots::config::{Config, Overrides};
use staticroots::logger::{self, AccessLog};
use staticroots::server::{self, ServeOptions};
use staticroots::{NotFound, StaticFiles};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "staticroots")]
#[command(about = "Serve an asset directory and a top-level directory over HTTP")]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Args {
    /// Path to config file (defaults to ./config.toml when present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory served under the asset prefix
    #[arg(long, env = "STATICROOTS_STATIC_ROOT")]
    static_root: Option<String>,

    /// Directory served at the server root, e.g. for robots.txt
    #[arg(long, env = "STATICROOTS_ROOT")]
    root: Option<String>,

    #[arg(long)]
    host: Option<String>,

    #[arg(short, long)]
    port: Option<u16>,
}

impl Args {
    fn overrides(&self) -> Overrides {
        Overrides {
            host: self.host.clone(),
            port: self.port,
            static_root: self.static_root.clone(),
            root: self.root.clone(),
        }
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let cfg = Config::load_from(args.config.as_deref(), &args.overrides())
        .context("failed to load configuration")?;
    logger::init(&cfg.logging)?;

    // Size the runtime from the workers setting, CPU cores otherwise
    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();
    if let Some(workers) = cfg.server.workers {
        runtime_builder.worker_threads(workers);
    }
    let runtime = runtime_builder.build()?;

    runtime.block_on(run(cfg))
}

async fn run(cfg: Config) -> anyhow::Result<()> {
    let addr = cfg.get_socket_addr().map_err(anyhow::Error::msg)?;

    // Fails fast on missing roots
    let app = StaticFiles::from_config(&cfg.static_files, NotFound)
        .context("invalid static file configuration")?;
    let access_log =
        AccessLog::from_config(&cfg.logging).context("failed to open access log")?;
    let listener = server::bind(addr).with_context(|| format!("failed to bind {addr}"))?;

    logger::log_server_start(&addr, &cfg);
    server::serve(
        listener,
        Arc::new(app),
        ServeOptions::from_config(&cfg.performance, access_log),
        server::shutdown_signal(),
    )
    .await;

    Ok(())
}
