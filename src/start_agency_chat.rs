//! Startup helpers for the agency chat server.

use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;

use crate::core::config::AppConfig;
use crate::server::{self, AppState};

/// How often idle carts are swept.
const CART_SWEEP_INTERVAL: Duration = Duration::from_secs(600);

/// Run the server until Ctrl-C.
///
/// # Returns
/// `ExitCode::SUCCESS` on graceful shutdown, `1` on failure.
#[must_use]
pub fn run() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    tracing::info!("Starting agency chat v{}", env!("CARGO_PKG_VERSION"));

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            tracing::error!("Failed to create runtime: {e}");
            return ExitCode::from(1);
        }
    };

    if let Err(e) = rt.block_on(serve()) {
        tracing::error!("Server error: {e:#}");
        return ExitCode::from(1);
    }

    ExitCode::SUCCESS
}

async fn serve() -> anyhow::Result<()> {
    let config = AppConfig::from_env().context("loading configuration")?;
    tracing::info!(
        port = config.server.port,
        model = %config.gemini.model,
        database = %config.storage.sqlite_path.display(),
        documents = %config.knowledge.documents_dir.display(),
        "configuration loaded"
    );

    let state = AppState::new(&config)
        .await
        .context("initializing application state")?;

    let sweeper = Arc::clone(&state);
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(CART_SWEEP_INTERVAL);
        loop {
            ticker.tick().await;
            sweeper.cart.discard_idle();
        }
    });

    server::run_server_with_shutdown(state, config.server.port, shutdown_signal())
        .await
        .context("serving http")?;

    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown requested");
}
