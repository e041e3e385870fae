//! glyph OCR server entry point.
//!
//! Loads configuration, selects a cache backend, opens the OCR log and
//! serves the HTTP API until Ctrl-C or SIGTERM. Logs are JSON on stdout.

use anyhow::Result;
use glyph_core::AppConfig;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

mod error;
mod pipeline;
mod routes;
mod state;

use state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .json()
        .init();

    let config = AppConfig::load()?;
    tracing::info!(bind_addr = %config.bind_addr, language = %config.ocr_language, "starting glyph-ocr");

    let state = AppState::build(&config).await?;
    let cache = state.pipeline.cache().clone();

    let listener = TcpListener::bind(&config.bind_addr).await?;
    tracing::info!(addr = %listener.local_addr()?, "listening");

    axum::serve(listener, routes::router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    cache.shutdown().await;
    tracing::info!("shutdown complete");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("shutdown signal received");
}
