//! HTTP handlers for the status page, the dashboard, and the session API.
//!
//! | Route | Handler |
//! |---|---|
//! | `GET /` | [`index`] |
//! | `GET /api/status` | [`status`] |
//! | `GET /dashboard` | [`dashboard`] |
//! | `GET /api/sessions` | [`list_sessions`] |
//! | `GET /api/sessions/{id}/decisions` | [`session_decisions`] |

use std::sync::Arc;

use aftershock_db::{DecisionRow, SessionLog, SessionRow};
use aftershock_types::SessionId;
use axum::Json;
use axum::extract::{Path, Query, State};
use axum::response::{Html, IntoResponse};
use chrono::{DateTime, Local, Utc};
use serde::Deserialize;
use uuid::Uuid;

use crate::coordinator::{Coordinator, CoordinatorStatus};
use crate::error::ApiError;

/// Sessions listed when no `limit` is given.
pub const DEFAULT_SESSION_LIMIT: i64 = 50;

/// Largest accepted `limit`.
pub const MAX_SESSION_LIMIT: i64 = 500;

/// Query parameters for session listings.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct SessionsQuery {
    /// How many sessions to return, most recent first.
    pub limit: Option<i64>,
}

impl SessionsQuery {
    fn resolve(self) -> Result<i64, ApiError> {
        let limit = self.limit.unwrap_or(DEFAULT_SESSION_LIMIT);
        if (1..=MAX_SESSION_LIMIT).contains(&limit) {
            Ok(limit)
        } else {
            Err(ApiError::InvalidQuery(format!(
                "limit must be between 1 and {MAX_SESSION_LIMIT}, got {limit}"
            )))
        }
    }
}

/// Format a stored timestamp in server local time.
pub fn local_timestamp(at: DateTime<Utc>) -> String {
    at.with_timezone(&Local)
        .format("%Y-%m-%d %H:%M:%S")
        .to_string()
}

/// Minimal status page.
pub async fn index<L: SessionLog>(
    State(coordinator): State<Arc<Coordinator<L>>>,
) -> impl IntoResponse {
    let status = coordinator.status().await;
    Html(format!(
        r#"<!DOCTYPE html>
<html>
<head><title>Aftershock Backend</title>
<style>
body {{ font-family: monospace; background: #111; color: #ddd; padding: 2rem; }}
h1 {{ color: #f84; }}
.metric {{ display: inline-block; margin: 0.5rem 1rem; padding: 1rem; background: #222; border-radius: 4px; }}
.metric .value {{ font-size: 1.5rem; color: #fff; }}
a {{ color: #6cf; }}
</style>
</head>
<body>
<h1>Aftershock AI Backend is running</h1>
<div>
  <div class="metric"><div>Disaster</div><div class="value">{disaster}</div></div>
  <div class="metric"><div>Severity</div><div class="value">{severity:.1}</div></div>
  <div class="metric"><div>Hazards</div><div class="value">{hazards}</div></div>
  <div class="metric"><div>Participants</div><div class="value">{participants}</div></div>
</div>
<h2>Endpoints</h2>
<ul>
  <li><code>GET /ws</code> (participant event channel)</li>
  <li><a href="/dashboard">/dashboard</a></li>
  <li><a href="/api/status">/api/status</a></li>
  <li><a href="/api/sessions">/api/sessions</a></li>
</ul>
</body>
</html>"#,
        disaster = status.disaster_type,
        severity = status.severity,
        hazards = status.hazards,
        participants = status.participants,
    ))
}

/// Current coordinator summary as JSON.
pub async fn status<L: SessionLog>(
    State(coordinator): State<Arc<Coordinator<L>>>,
) -> Json<CoordinatorStatus> {
    Json(coordinator.status().await)
}

/// Persisted sessions, most recent first.
///
/// # Errors
///
/// [`ApiError::InvalidQuery`] for an out-of-range `limit`;
/// [`ApiError::Persistence`] if the history cannot be read.
pub async fn list_sessions<L: SessionLog>(
    State(coordinator): State<Arc<Coordinator<L>>>,
    Query(query): Query<SessionsQuery>,
) -> Result<Json<Vec<SessionRow>>, ApiError> {
    let limit = query.resolve()?;
    let sessions = coordinator.session_log().recent_sessions(limit).await?;
    Ok(Json(sessions))
}

/// Decisions of one session, oldest first.
///
/// # Errors
///
/// [`ApiError::InvalidUuid`] if `id` is not a UUID;
/// [`ApiError::Persistence`] if the history cannot be read.
pub async fn session_decisions<L: SessionLog>(
    State(coordinator): State<Arc<Coordinator<L>>>,
    Path(id): Path<String>,
) -> Result<Json<Vec<DecisionRow>>, ApiError> {
    let uuid = Uuid::parse_str(&id).map_err(|e| ApiError::InvalidUuid(format!("{id}: {e}")))?;
    let decisions = coordinator
        .session_log()
        .session_decisions(SessionId::from(uuid))
        .await?;
    Ok(Json(decisions))
}

/// Session history as an HTML table.
///
/// # Errors
///
/// Same as [`list_sessions`].
pub async fn dashboard<L: SessionLog>(
    State(coordinator): State<Arc<Coordinator<L>>>,
    Query(query): Query<SessionsQuery>,
) -> Result<Html<String>, ApiError> {
    let limit = query.resolve()?;
    let sessions = coordinator.session_log().recent_sessions(limit).await?;
    Ok(Html(render_dashboard(&sessions)))
}

fn render_dashboard(sessions: &[SessionRow]) -> String {
    let mut rows = String::new();
    for session in sessions {
        rows.push_str(&format!(
            "<tr><td><a href=\"/api/sessions/{id}/decisions\">{id}</a></td>\
             <td>{started}</td><td>{disaster}</td><td>{duration:.1}</td><td>{score}</td></tr>\n",
            id = session.id,
            started = local_timestamp(session.started_at),
            disaster = escape_html(&session.disaster_type),
            duration = session.duration_secs,
            score = session.score,
        ));
    }
    if sessions.is_empty() {
        rows.push_str("<tr><td colspan=\"5\">No sessions recorded yet.</td></tr>\n");
    }

    format!(
        r#"<!DOCTYPE html>
<html>
<head><title>Aftershock Training Dashboard</title>
<style>
body {{ font-family: monospace; background: #111; color: #ddd; padding: 2rem; }}
h1 {{ color: #f84; }}
table {{ border-collapse: collapse; }}
th, td {{ padding: 0.4rem 1rem; border-bottom: 1px solid #333; text-align: left; }}
a {{ color: #6cf; }}
</style>
</head>
<body>
<h1>Training Sessions</h1>
<table>
<tr><th>Session</th><th>Started</th><th>Disaster</th><th>Duration (s)</th><th>Score</th></tr>
{rows}</table>
</body>
</html>"#
    )
}

fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}
