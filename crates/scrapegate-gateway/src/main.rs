//! scrapegate gateway
//!
//! - `/metrics?target=...` : per-target snapshot, cached collector per target
//! - `/reset?target=...`   : drop a target's collector
//! - `/health`             : liveness

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

use scrapegate_gateway::{app_state, config, router};

#[derive(Debug, Parser)]
#[command(name = "scrapegate", version, about = "Per-target metrics scrape gateway")]
struct Args {
    /// Path to the gateway configuration file
    #[arg(long, default_value = "/etc/scrapegate/scrapegate.yml")]
    config: String,

    /// Set verbose logging
    #[arg(long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "info" };
    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        "build information"
    );

    let cfg = match config::load_from_file(&args.config) {
        Ok(cfg) => cfg,
        Err(e) => {
            tracing::error!(path = %args.config, "{e}");
            return ExitCode::FAILURE;
        }
    };
    let listen = match cfg.gateway.bind() {
        Ok(addr) => addr,
        Err(e) => {
            tracing::error!("{e}");
            return ExitCode::FAILURE;
        }
    };

    let state = match app_state::AppState::new(cfg) {
        Ok(state) => state,
        Err(e) => {
            tracing::error!("startup failed: {e}");
            return ExitCode::FAILURE;
        }
    };
    let app = router::build_router(state);

    let listener = match tokio::net::TcpListener::bind(listen).await {
        Ok(l) => l,
        Err(e) => {
            tracing::error!(%listen, "failed to bind: {e}");
            return ExitCode::FAILURE;
        }
    };
    tracing::info!(%listen, "scrapegate listening");

    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        tracing::error!("server failed: {e}");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!("failed to install Ctrl+C handler: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut s) => {
                s.recv().await;
            }
            Err(e) => {
                tracing::warn!("failed to install signal handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("signal received, starting graceful shutdown");
}
