//! Axum router construction.

use std::sync::Arc;

use aftershock_db::SessionLog;
use axum::Router;
use axum::routing::get;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::coordinator::Coordinator;
use crate::handlers;
use crate::ws;

/// Build the complete router.
///
/// - `GET /` -- status page
/// - `GET /ws` -- participant event channel
/// - `GET /dashboard` -- session history table
/// - `GET /api/status` -- coordinator summary
/// - `GET /api/sessions` -- session history
/// - `GET /api/sessions/{id}/decisions` -- one session's decisions
///
/// CORS allows any origin; the training client is served from elsewhere.
pub fn build_router<L: SessionLog>(coordinator: Arc<Coordinator<L>>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(handlers::index::<L>))
        .route("/ws", get(ws::ws_channel::<L>))
        .route("/dashboard", get(handlers::dashboard::<L>))
        .route("/api/status", get(handlers::status::<L>))
        .route("/api/sessions", get(handlers::list_sessions::<L>))
        .route(
            "/api/sessions/{id}/decisions",
            get(handlers::session_decisions::<L>),
        )
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(coordinator)
}
