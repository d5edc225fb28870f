//! vitals gateway
//!
//! - Ingest endpoint: POST /update/ (bearer token)
//! - Background snapshot publisher to the configured sink
//! - Graceful shutdown on SIGINT / SIGTERM: drain HTTP, then stop the publisher

use std::net::SocketAddr;

use tokio::sync::watch;
use tracing_subscriber::{fmt, EnvFilter};

use vitals_core::error::{Result, VitalsError};
use vitals_gateway::publish::{sink, PublisherExit, SnapshotPublisher};
use vitals_gateway::{app_state::AppState, config, router};

const CONFIG_ENV: &str = "VITALS_CONFIG";
const DEFAULT_CONFIG_PATH: &str = "vitals.yaml";

#[tokio::main]
async fn main() {
    // stdout belongs to the stdout sink.
    fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run().await {
        tracing::error!(error = %e, "vitals-gateway failed");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let path = std::env::var(CONFIG_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    let cfg = config::load_from_file(&path)?;
    let listen: SocketAddr = cfg.gateway.listen.parse().map_err(|e| {
        VitalsError::Config(format!("gateway.listen must be a valid SocketAddr: {e}"))
    })?;

    // Sink handles are acquired once and reused by every tick.
    let sink = sink::from_config(&cfg.publisher.sink)?;
    let state = AppState::new(cfg)?;

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let publisher = SnapshotPublisher::from_config(
        state.store(),
        sink,
        &state.cfg().publisher,
        state.metrics(),
    )
    .spawn(shutdown_rx);

    let app = router::build_router(state.clone());

    tracing::info!(%listen, config = %path, "vitals-gateway starting");
    let listener = tokio::net::TcpListener::bind(listen)
        .await
        .map_err(|e| VitalsError::Internal(format!("failed to bind {listen}: {e}")))?;

    let served = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(state))
        .await;

    let _ = shutdown_tx.send(true);
    match publisher.await {
        Ok(PublisherExit::Shutdown) => tracing::info!("snapshot publisher stopped"),
        Ok(PublisherExit::Halted(e)) => {
            tracing::warn!(error = %e, "snapshot publisher had halted before shutdown")
        }
        Err(e) => tracing::error!(error = %e, "snapshot publisher task failed"),
    }

    served.map_err(|e| VitalsError::Internal(format!("server failed: {e}")))
}

async fn shutdown_signal(state: AppState) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
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

    state.set_draining();
    tracing::info!("signal received, draining");
}
