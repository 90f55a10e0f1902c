//! The forgegraph server binary. CLI parsing and the main loop follow
//! the teacher's `orchestrator-server.rs`: env-driven `RUST_LOG` init,
//! a config summary log line, a `TcpListener` + `axum::serve`, and
//! `shutdown_signal` racing Ctrl-C against SIGTERM.

mod auth;
mod config;
mod health;
mod router;
mod state;
mod ws;

use clap::Parser;
use config::ServerConfig;
use forge_tooling::config::ConfigBuilder;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "forge-server")]
#[command(about = "The forgegraph workflow engine server", long_about = None)]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Cli {
    /// Address to bind the HTTP/WebSocket listener on.
    #[arg(long, env = "FORGE_HOST")]
    host: Option<String>,

    /// Port to bind the HTTP/WebSocket listener on.
    #[arg(long, env = "FORGE_PORT")]
    port: Option<u16>,

    /// Path the MCP endpoint listens on.
    #[arg(long, env = "FORGE_MCP_PATH")]
    mcp_path: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let rust_log = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    tracing_subscriber::fmt().with_env_filter(rust_log).init();

    let cli = Cli::parse();

    let mut config = ServerConfig::from_env_with_defaults("FORGE_")?;
    if let Some(host) = cli.host {
        config.host = host;
    }
    if let Some(port) = cli.port {
        config.port = port;
    }
    if let Some(mcp_path) = cli.mcp_path {
        config.mcp_path = mcp_path;
    }
    config.validate()?;

    info!(
        host = %config.host,
        port = config.port,
        mcp_path = %config.mcp_path,
        auth_enabled = config.auth_enabled,
        mcp_enabled = config.mcp_enabled,
        pubsub_enabled = config.pubsub_enabled,
        ha_mode = config.ha_mode,
        "starting forge-server"
    );

    // No external token issuer / user directory is wired into this
    // workspace (spec.md §1 lists the OAuth issuer and the relational
    // user schema as out-of-scope external collaborators); the fixed
    // test doubles stand in for them here the same way the in-memory
    // KV and graph stores stand in for their own external backends.
    let issuer = Arc::new(forge_session::FakeTokenIssuer::default());
    let users = Arc::new(forge_session::InMemoryUserStore::default());

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    let cleanup_interval = Duration::from_secs(config.checkpoint_cleanup_interval_secs);
    let checkpoint_max_age_secs = config.checkpoint_max_age_secs;

    let app_state = state::build(config, issuer, users).await?;
    spawn_checkpoint_cleanup(app_state.clone(), cleanup_interval, checkpoint_max_age_secs);

    let app = router::create_router(app_state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// Background timer pruning terminal threads older than `max_age_secs`
/// from both engines (spec.md 6.2's 24h checkpoint TTL is enforced by
/// the KV entry's own expiry, but a live thread index entry for an
/// already-expired state would otherwise linger; this timer keeps the
/// thread index itself in step).
fn spawn_checkpoint_cleanup(state: state::AppState, interval: Duration, max_age_secs: i64) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        loop {
            ticker.tick().await;
            match state.plan_engine.cleanup(max_age_secs).await {
                Ok(removed) if removed > 0 => info!(removed, engine = "plan", "checkpoint cleanup"),
                Ok(_) => {}
                Err(e) => warn!(error = %e, engine = "plan", "checkpoint cleanup failed"),
            }
            match state.codegen_engine.cleanup(max_age_secs).await {
                Ok(removed) if removed > 0 => info!(removed, engine = "codegen", "checkpoint cleanup"),
                Ok(_) => {}
                Err(e) => warn!(error = %e, engine = "codegen", "checkpoint cleanup failed"),
            }
        }
    });
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install CTRL-C signal handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("received CTRL-C, shutting down"),
        _ = terminate => info!("received SIGTERM, shutting down"),
    }
}
