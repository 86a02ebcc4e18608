//! CLI entrypoint (§6, §10). Wires [`AppConfig`] into a [`Db`], an
//! [`octave_mcp_proxy::ServerRegistry`], and whichever of the HTTP bridge /
//! stdio proxy the caller asked for, then waits for `SIGINT`/`SIGTERM`.

use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use octave_mcp_proxy::ServerRegistry;
use octave_storage::Db;

use app_server::config::AppConfig;
use app_server::state::AppState;
use app_server::{http, stdio};

#[derive(Parser, Debug)]
#[command(name = "app-server", about = "Workstation-local coding-assistant core")]
struct Cli {
    /// Overrides `OCTAVE_DATA_DIR`.
    #[arg(long)]
    data_dir: Option<std::path::PathBuf>,

    /// Overrides `OCTAVE_HTTP_PORT`.
    #[arg(long)]
    http_port: Option<u16>,

    /// Serve the loopback HTTP bridge. Default when neither this nor
    /// `--stdio` is given.
    #[arg(long)]
    http: bool,

    /// Serve the line-delimited JSON-RPC proxy on stdin/stdout instead of
    /// (or alongside) the HTTP bridge.
    #[arg(long)]
    stdio: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut config = AppConfig::from_env()?;
    if let Some(data_dir) = cli.data_dir {
        config.data_dir = data_dir;
    }
    if let Some(http_port) = cli.http_port {
        config.http_port = http_port;
    }

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(&config.log_directive).unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let db = Arc::new(Db::open(&config.data_dir)?);
    let registry = Arc::new(ServerRegistry::new(db.clone()));
    let state = AppState::new(db, registry.clone(), config.compact_cli.clone());

    let serve_http = cli.http || !cli.stdio;

    let http_task = if serve_http {
        let addr = std::net::SocketAddr::new(config.http_addr, config.http_port);
        let app = http::router(state.clone());
        tracing::info!(%addr, "loopback HTTP bridge listening");
        let listener = tokio::net::TcpListener::bind(addr).await?;
        Some(tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                tracing::error!(error = %e, "HTTP bridge exited");
            }
        }))
    } else {
        None
    };

    let stdio_task = if cli.stdio {
        tracing::info!("stdio JSON-RPC proxy listening on stdin/stdout");
        Some(tokio::spawn(stdio::serve(registry)))
    } else {
        None
    };

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("shutdown signal received");
        }
        () = wait_forever_if_none(http_task) => {}
    }

    if let Some(task) = stdio_task {
        task.abort();
    }

    Ok(())
}

/// Awaits `task` if present, otherwise never resolves — lets the outer
/// `select!` fall through to whichever branch (signal or real task exit)
/// comes first without special-casing "no HTTP server was started".
async fn wait_forever_if_none(task: Option<tokio::task::JoinHandle<()>>) {
    match task {
        Some(task) => {
            let _ = task.await;
        }
        None => std::future::pending::<()>().await,
    }
}
