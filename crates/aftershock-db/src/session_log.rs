//! The session history contract the coordinator records through.
//!
//! [`SessionLog`] is implemented by [`PgSessionLog`] for production and
//! by [`MemorySessionLog`] when no database is reachable (and in tests).
//! Callers treat every method as best-effort: errors are theirs to log,
//! never to propagate into gameplay.

use aftershock_types::{DisasterType, SessionId};
use chrono::Utc;
use tokio::sync::Mutex;

use crate::decision_store::{DecisionRow, DecisionStore};
use crate::error::DbError;
use crate::postgres::PostgresPool;
use crate::session_store::{SessionRow, SessionStore};

/// Durable record of training sessions and the decisions made in them.
pub trait SessionLog: Send + Sync + 'static {
    /// Record that a disaster of `disaster` has started. Returns the new
    /// session's id.
    fn log_session_start(
        &self,
        disaster: DisasterType,
    ) -> impl Future<Output = Result<SessionId, DbError>> + Send;

    /// Record the final duration and accumulated score of a session.
    fn log_session_end(
        &self,
        session: SessionId,
        duration_secs: f64,
        score: i64,
    ) -> impl Future<Output = Result<(), DbError>> + Send;

    /// Record one scored decision.
    fn log_decision(
        &self,
        session: SessionId,
        action: &str,
        feedback: &str,
        score_impact: i32,
    ) -> impl Future<Output = Result<(), DbError>> + Send;

    /// Up to `limit` sessions, most recent first.
    fn recent_sessions(
        &self,
        limit: i64,
    ) -> impl Future<Output = Result<Vec<SessionRow>, DbError>> + Send;

    /// All decisions of `session`, oldest first.
    fn session_decisions(
        &self,
        session: SessionId,
    ) -> impl Future<Output = Result<Vec<DecisionRow>, DbError>> + Send;
}

/// [`SessionLog`] backed by `PostgreSQL`.
#[derive(Debug, Clone)]
pub struct PgSessionLog {
    pool: PostgresPool,
}

impl PgSessionLog {
    /// Wrap a connected (and migrated) pool.
    pub const fn new(pool: PostgresPool) -> Self {
        Self { pool }
    }

    /// Close the underlying pool. Later calls fail with a pool error.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

impl SessionLog for PgSessionLog {
    async fn log_session_start(&self, disaster: DisasterType) -> Result<SessionId, DbError> {
        let id = SessionId::new();
        SessionStore::new(self.pool.pool())
            .insert(id, disaster, Utc::now())
            .await?;
        Ok(id)
    }

    async fn log_session_end(
        &self,
        session: SessionId,
        duration_secs: f64,
        score: i64,
    ) -> Result<(), DbError> {
        SessionStore::new(self.pool.pool())
            .finish(session, duration_secs, score)
            .await
    }

    async fn log_decision(
        &self,
        session: SessionId,
        action: &str,
        feedback: &str,
        score_impact: i32,
    ) -> Result<(), DbError> {
        DecisionStore::new(self.pool.pool())
            .insert(session, action, feedback, score_impact, Utc::now())
            .await
    }

    async fn recent_sessions(&self, limit: i64) -> Result<Vec<SessionRow>, DbError> {
        SessionStore::new(self.pool.pool()).list_recent(limit).await
    }

    async fn session_decisions(&self, session: SessionId) -> Result<Vec<DecisionRow>, DbError> {
        DecisionStore::new(self.pool.pool())
            .list_for_session(session)
            .await
    }
}

/// Process-local [`SessionLog`]. History is lost on restart.
#[derive(Debug, Default)]
pub struct MemorySessionLog {
    sessions: Mutex<Vec<SessionRow>>,
    decisions: Mutex<Vec<DecisionRow>>,
}

impl MemorySessionLog {
    /// Create an empty log.
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionLog for MemorySessionLog {
    async fn log_session_start(&self, disaster: DisasterType) -> Result<SessionId, DbError> {
        let id = SessionId::new();
        self.sessions.lock().await.push(SessionRow {
            id: id.into_inner(),
            started_at: Utc::now(),
            disaster_type: disaster.as_str().to_owned(),
            duration_secs: 0.0,
            score: 0,
        });
        Ok(id)
    }

    async fn log_session_end(
        &self,
        session: SessionId,
        duration_secs: f64,
        score: i64,
    ) -> Result<(), DbError> {
        let mut sessions = self.sessions.lock().await;
        if let Some(row) = sessions.iter_mut().find(|r| r.id == session.into_inner()) {
            row.duration_secs = duration_secs;
            row.score = score;
        }
        Ok(())
    }

    async fn log_decision(
        &self,
        session: SessionId,
        action: &str,
        feedback: &str,
        score_impact: i32,
    ) -> Result<(), DbError> {
        let mut decisions = self.decisions.lock().await;
        let id = i64::try_from(decisions.len()).unwrap_or(i64::MAX).saturating_add(1);
        decisions.push(DecisionRow {
            id,
            session_id: session.into_inner(),
            recorded_at: Utc::now(),
            action: action.to_owned(),
            feedback: feedback.to_owned(),
            score_impact,
        });
        Ok(())
    }

    async fn recent_sessions(&self, limit: i64) -> Result<Vec<SessionRow>, DbError> {
        let take = usize::try_from(limit).unwrap_or(0);
        let sessions = self.sessions.lock().await;
        // Rows are appended in start order, so reverse is newest first.
        Ok(sessions.iter().rev().take(take).cloned().collect())
    }

    async fn session_decisions(&self, session: SessionId) -> Result<Vec<DecisionRow>, DbError> {
        let decisions = self.decisions.lock().await;
        Ok(decisions
            .iter()
            .filter(|d| d.session_id == session.into_inner())
            .cloned()
            .collect())
    }
}
