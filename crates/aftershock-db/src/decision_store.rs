//! Operations on the `decisions` table.

use aftershock_types::SessionId;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::DbError;

/// Operations on the `decisions` table.
pub struct DecisionStore<'a> {
    pool: &'a PgPool,
}

impl<'a> DecisionStore<'a> {
    /// Create a new decision store bound to a connection pool.
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Append one scored decision to a session.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the insert fails, including when
    /// the session does not exist.
    pub async fn insert(
        &self,
        session: SessionId,
        action: &str,
        feedback: &str,
        score_impact: i32,
        recorded_at: DateTime<Utc>,
    ) -> Result<(), DbError> {
        sqlx::query(
            r"INSERT INTO decisions (session_id, recorded_at, action, feedback, score_impact)
              VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(session.into_inner())
        .bind(recorded_at)
        .bind(action)
        .bind(feedback)
        .bind(score_impact)
        .execute(self.pool)
        .await?;

        tracing::debug!(session = %session, action, score_impact, "Inserted decision");
        Ok(())
    }

    /// Decisions of one session in the order they were made.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the query fails.
    pub async fn list_for_session(&self, session: SessionId) -> Result<Vec<DecisionRow>, DbError> {
        let rows = sqlx::query_as::<_, DecisionRow>(
            r"SELECT id, session_id, recorded_at, action, feedback, score_impact
              FROM decisions
              WHERE session_id = $1
              ORDER BY recorded_at, id",
        )
        .bind(session.into_inner())
        .fetch_all(self.pool)
        .await?;

        Ok(rows)
    }
}

/// A row from the `decisions` table.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow, serde::Serialize)]
pub struct DecisionRow {
    /// Auto-incremented row id.
    pub id: i64,
    /// Owning session.
    pub session_id: Uuid,
    /// When the decision was scored.
    pub recorded_at: DateTime<Utc>,
    /// The submitted action.
    pub action: String,
    /// Feedback returned to the participant.
    pub feedback: String,
    /// Score awarded.
    pub score_impact: i32,
}
