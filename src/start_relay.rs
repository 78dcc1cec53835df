//! Startup helpers for the campus relay server.

use std::process::ExitCode;
use std::sync::Arc;

use crate::config::RelayConfig;
use crate::relay::{self, AppState};

/// Install the global `tracing` subscriber (INFO unless `RUST_LOG` says otherwise).
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();
}

/// Run the relay (used by the `campus-relay` binary).
///
/// # Returns
/// `ExitCode::SUCCESS` on graceful shutdown, `1` on failure.
#[must_use]
pub fn run() -> ExitCode {
    init_tracing();

    tracing::info!("Starting campus relay v{}", env!("CARGO_PKG_VERSION"));

    let config = match RelayConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Invalid configuration: {e}");
            return ExitCode::from(1);
        }
    };

    let state = match initialize(&config) {
        Ok(s) => s,
        Err(e) => {
            tracing::error!("Failed to create state: {e}");
            return ExitCode::from(1);
        }
    };

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            tracing::error!("Failed to create runtime: {e}");
            return ExitCode::from(1);
        }
    };

    let serve = relay::run_server_with_shutdown(state, config.socket_addr(), shutdown_signal());
    if let Err(e) = rt.block_on(serve) {
        tracing::error!("Server error: {e}");
        return ExitCode::from(1);
    }

    tracing::info!("Campus relay stopped");
    ExitCode::SUCCESS
}

/// Initialize relay state without starting the server.
///
/// # Errors
/// Returns an error if the HTTP client cannot be built.
pub fn initialize(config: &RelayConfig) -> Result<Arc<AppState>, reqwest::Error> {
    tracing::info!("Rasa webhook: {}", config.webhook_url);
    if let Some(timeout) = config.request_timeout {
        tracing::info!("Downstream request timeout: {}s", timeout.as_secs());
    }
    AppState::new(config)
}

/// Resolve on Ctrl-C.
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Ctrl-C handler unavailable: {e}");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown requested");
}
