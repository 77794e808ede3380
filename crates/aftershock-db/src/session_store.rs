//! Operations on the `sessions` table.
//!
//! One row per started disaster. `duration_secs` and `score` start at
//! zero and are filled in when the session is finished.

use aftershock_types::{DisasterType, SessionId};
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::DbError;

/// Operations on the `sessions` table.
pub struct SessionStore<'a> {
    pool: &'a PgPool,
}

impl<'a> SessionStore<'a> {
    /// Create a new session store bound to a connection pool.
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Insert a freshly started session.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the insert fails.
    pub async fn insert(
        &self,
        id: SessionId,
        disaster: DisasterType,
        started_at: DateTime<Utc>,
    ) -> Result<(), DbError> {
        sqlx::query(
            r"INSERT INTO sessions (id, started_at, disaster_type, duration_secs, score)
              VALUES ($1, $2, $3, 0, 0)",
        )
        .bind(id.into_inner())
        .bind(started_at)
        .bind(disaster.as_str())
        .execute(self.pool)
        .await?;

        tracing::debug!(session = %id, disaster = %disaster, "Inserted session");
        Ok(())
    }

    /// Record the final duration and score of a session.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the update fails.
    pub async fn finish(
        &self,
        id: SessionId,
        duration_secs: f64,
        score: i64,
    ) -> Result<(), DbError> {
        sqlx::query(r"UPDATE sessions SET duration_secs = $2, score = $3 WHERE id = $1")
            .bind(id.into_inner())
            .bind(duration_secs)
            .bind(score)
            .execute(self.pool)
            .await?;
        Ok(())
    }

    /// Most recent sessions first.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the query fails.
    pub async fn list_recent(&self, limit: i64) -> Result<Vec<SessionRow>, DbError> {
        let rows = sqlx::query_as::<_, SessionRow>(
            r"SELECT id, started_at, disaster_type, duration_secs, score
              FROM sessions
              ORDER BY started_at DESC
              LIMIT $1",
        )
        .bind(limit)
        .fetch_all(self.pool)
        .await?;

        Ok(rows)
    }
}

/// A row from the `sessions` table.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow, serde::Serialize)]
pub struct SessionRow {
    /// Session id.
    pub id: Uuid,
    /// When the disaster was started.
    pub started_at: DateTime<Utc>,
    /// Disaster type as its wire string.
    pub disaster_type: String,
    /// Wall-clock seconds the session ran (0 until finished).
    pub duration_secs: f64,
    /// Sum of decision scores (0 until finished).
    pub score: i64,
}
