//! Aftershock server binary.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `aftershock-config.yaml`
//! 2. Initialize structured logging (tracing)
//! 3. Connect the session log (`PostgreSQL`, or memory as fallback)
//! 4. Build the obstacle grid, engine, and coordinator
//! 5. Start the ticker
//! 6. Serve HTTP and `WebSocket` traffic until `Ctrl-C`
//! 7. Stop the ticker, close out the active session, and close the
//!    database pool

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use aftershock_core::{ConfigError, TickerControl, TrainerConfig};
use aftershock_server::{
    ServerError, StartupError, build_coordinator, connect_session_log, spawn_ticker,
    start_server,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Top-level error for the server binary.
#[derive(Debug, thiserror::Error)]
enum AppError {
    /// Configuration loading failed.
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// The coordinator could not be assembled.
    #[error("startup error: {0}")]
    Startup(#[from] StartupError),

    /// The HTTP server failed.
    #[error("server error: {0}")]
    Server(#[from] ServerError),
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    let config = load_config()?;
    init_tracing(&config);

    info!(
        host = config.server.host,
        port = config.server.port,
        tick_interval_ms = config.simulation.tick_interval_ms,
        seed = ?config.simulation.seed,
        default_disaster = %config.simulation.default_disaster,
        "aftershock-server starting"
    );

    let session_log = connect_session_log(&config.infrastructure).await;
    let coordinator = build_coordinator(&config, session_log)?;

    let control = Arc::new(TickerControl::new());
    let ticker = spawn_ticker(
        Arc::clone(&coordinator),
        Duration::from_millis(config.simulation.tick_interval_ms),
        Arc::clone(&control),
    );

    let served = start_server(&config.server, Arc::clone(&coordinator), shutdown_signal()).await;

    control.request_stop();
    match ticker.await {
        Ok(ticks) => info!(ticks, "ticker stopped"),
        Err(e) => warn!(error = %e, "ticker task failed"),
    }
    coordinator.finish_active_session().await;
    coordinator.session_log().close().await;

    served?;
    info!("aftershock-server shutdown complete");
    Ok(())
}

/// Load `aftershock-config.yaml` from the working directory, or use
/// defaults if it is absent.
fn load_config() -> Result<TrainerConfig, ConfigError> {
    let path = Path::new("aftershock-config.yaml");
    if path.exists() {
        TrainerConfig::from_file(path)
    } else {
        let mut config = TrainerConfig::default();
        config.infrastructure.apply_env_overrides();
        Ok(config)
    }
}

fn init_tracing(config: &TrainerConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);
    if config.logging.json {
        builder.json().init();
    } else {
        builder.init();
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
    info!("shutdown requested");
}
