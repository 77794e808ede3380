//! Integration tests for the HTTP routes.
//!
//! Tests use Axum's `Router` directly via `tower::ServiceExt` without
//! starting a TCP server.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use aftershock_core::TrainerConfig;
use aftershock_db::{DbError, DecisionRow, MemorySessionLog, SessionLog, SessionRow};
use aftershock_server::{Coordinator, build_coordinator, build_router};
use aftershock_types::{ConnectionId, DisasterType, SessionId};
use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::Value;
use tokio::sync::mpsc::unbounded_channel;
use tower::ServiceExt;

#[derive(Debug)]
struct OfflineLog;

impl SessionLog for OfflineLog {
    async fn log_session_start(&self, _: DisasterType) -> Result<SessionId, DbError> {
        Err(DbError::Config("offline".to_owned()))
    }

    async fn log_session_end(&self, _: SessionId, _: f64, _: i64) -> Result<(), DbError> {
        Err(DbError::Config("offline".to_owned()))
    }

    async fn log_decision(&self, _: SessionId, _: &str, _: &str, _: i32) -> Result<(), DbError> {
        Err(DbError::Config("offline".to_owned()))
    }

    async fn recent_sessions(&self, _: i64) -> Result<Vec<SessionRow>, DbError> {
        Err(DbError::Config("offline".to_owned()))
    }

    async fn session_decisions(&self, _: SessionId) -> Result<Vec<DecisionRow>, DbError> {
        Err(DbError::Config("offline".to_owned()))
    }
}

fn make_coordinator() -> Arc<Coordinator<MemorySessionLog>> {
    build_coordinator(&TrainerConfig::default(), MemorySessionLog::new()).unwrap()
}

/// Play a short fire drill: one session with two decisions.
async fn play_fire_drill(coordinator: &Coordinator<MemorySessionLog>) {
    let id = ConnectionId::new();
    let (tx, _rx) = unbounded_channel();
    coordinator.connect(id, tx).await;
    coordinator.start_simulation(id, Some(DisasterType::Fire)).await;
    coordinator.submit_decision(id, "evacuate").await;
    coordinator.submit_decision(id, "call for help").await;
}

async fn get<L: SessionLog>(coordinator: &Arc<Coordinator<L>>, uri: &str) -> (StatusCode, Vec<u8>) {
    let response = build_router(Arc::clone(coordinator))
        .oneshot(Request::get(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, bytes.to_vec())
}

async fn get_json<L: SessionLog>(coordinator: &Arc<Coordinator<L>>, uri: &str) -> (StatusCode, Value) {
    let (status, bytes) = get(coordinator, uri).await;
    (status, serde_json::from_slice(&bytes).unwrap())
}

// =========================================================================
// Tests
// =========================================================================

#[tokio::test]
async fn test_index_returns_html() {
    let coordinator = make_coordinator();
    let (status, body) = get(&coordinator, "/").await;
    assert_eq!(status, StatusCode::OK);
    let html = String::from_utf8(body).unwrap();
    assert!(html.contains("Aftershock AI Backend is running"));
}

#[tokio::test]
async fn test_status_reflects_engine() {
    let coordinator = make_coordinator();
    let (status, json) = get_json(&coordinator, "/api/status").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["disaster_type"], "none");
    assert_eq!(json["participants"], 0);

    play_fire_drill(&coordinator).await;
    let (_, json) = get_json(&coordinator, "/api/status").await;
    assert_eq!(json["disaster_type"], "fire");
    assert_eq!(json["hazards"], 1);
    assert!(json["active_session"].is_string());
}

#[tokio::test]
async fn test_list_sessions_empty() {
    let coordinator = make_coordinator();
    let (status, json) = get_json(&coordinator, "/api/sessions").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json, serde_json::json!([]));
}

#[tokio::test]
async fn test_list_sessions_newest_first() {
    let coordinator = make_coordinator();
    play_fire_drill(&coordinator).await;
    let id = ConnectionId::new();
    coordinator.start_simulation(id, Some(DisasterType::Flood)).await;

    let (status, json) = get_json(&coordinator, "/api/sessions").await;
    assert_eq!(status, StatusCode::OK);
    let sessions = json.as_array().unwrap();
    assert_eq!(sessions.len(), 2);
    assert_eq!(sessions.first().unwrap()["disaster_type"], "flood");
    // The fire session was closed out when the flood started.
    assert_eq!(sessions.get(1).unwrap()["score"], 140);

    let (_, json) = get_json(&coordinator, "/api/sessions?limit=1").await;
    assert_eq!(json.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_list_sessions_rejects_bad_limit() {
    let coordinator = make_coordinator();
    let (status, json) = get_json(&coordinator, "/api/sessions?limit=0").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["status"], 400);
    assert!(json["error"].as_str().unwrap().contains("limit"));
}

#[tokio::test]
async fn test_session_decisions() {
    let coordinator = make_coordinator();
    play_fire_drill(&coordinator).await;
    let session = coordinator.status().await.active_session.unwrap();

    let (status, json) =
        get_json(&coordinator, &format!("/api/sessions/{session}/decisions")).await;
    assert_eq!(status, StatusCode::OK);
    let decisions = json.as_array().unwrap();
    assert_eq!(decisions.len(), 2);
    assert_eq!(decisions.first().unwrap()["action"], "evacuate");
    assert_eq!(decisions.get(1).unwrap()["score_impact"], 50);
    assert_eq!(decisions.get(1).unwrap()["feedback"], "Neutral action.");
}

#[tokio::test]
async fn test_session_decisions_invalid_uuid() {
    let coordinator = make_coordinator();
    let (status, json) = get_json(&coordinator, "/api/sessions/not-a-uuid/decisions").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["status"], 400);
}

#[tokio::test]
async fn test_dashboard_renders_sessions() {
    let coordinator = make_coordinator();
    play_fire_drill(&coordinator).await;
    let (status, body) = get(&coordinator, "/dashboard").await;
    assert_eq!(status, StatusCode::OK);
    let html = String::from_utf8(body).unwrap();
    assert!(html.contains("Training Sessions"));
    assert!(html.contains("<td>fire</td>"));
}

#[tokio::test]
async fn test_history_outage_is_service_unavailable() {
    let coordinator = build_coordinator(&TrainerConfig::default(), OfflineLog).unwrap();
    let (status, json) = get_json(&coordinator, "/api/sessions").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(json["status"], 503);

    let (status, _) = get(&coordinator, "/dashboard").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_ws_requires_upgrade() {
    let coordinator = make_coordinator();
    let (status, _) = get(&coordinator, "/ws").await;
    assert!(status.is_client_error());
}

#[tokio::test]
async fn test_unknown_route_is_not_found() {
    let coordinator = make_coordinator();
    let (status, _) = get(&coordinator, "/api/nope").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
