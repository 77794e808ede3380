//! HTTP server lifecycle.

use std::net::SocketAddr;
use std::sync::Arc;

use aftershock_core::config::ServerConfig;
use aftershock_db::SessionLog;
use tokio::net::TcpListener;
use tracing::info;

use crate::coordinator::Coordinator;
use crate::router::build_router;

/// Errors that can occur when starting or running the server.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Failed to bind to the network address.
    #[error("bind error: {0}")]
    Bind(String),

    /// The server encountered a fatal error while serving.
    #[error("serve error: {0}")]
    Serve(String),
}

/// Bind and serve until `shutdown` resolves.
///
/// In-flight requests finish before this returns; open channels are
/// closed.
///
/// # Errors
///
/// Returns [`ServerError::Bind`] if the address is invalid or taken, and
/// [`ServerError::Serve`] on a fatal I/O error.
pub async fn start_server<L, F>(
    config: &ServerConfig,
    coordinator: Arc<Coordinator<L>>,
    shutdown: F,
) -> Result<(), ServerError>
where
    L: SessionLog,
    F: Future<Output = ()> + Send + 'static,
{
    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .map_err(|e| ServerError::Bind(format!("invalid address: {e}")))?;

    let router = build_router(coordinator);

    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| ServerError::Bind(format!("bind failed on {addr}: {e}")))?;

    info!(%addr, "Aftershock server listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| ServerError::Serve(format!("serve error: {e}")))?;

    info!("Aftershock server stopped");
    Ok(())
}
