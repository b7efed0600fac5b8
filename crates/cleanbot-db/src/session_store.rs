//! Session history in the `cleaning_sessions` table.
//!
//! Rows are inserted once and never updated. Enum columns hold the same
//! `snake_case` names the JSON API uses.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use cleanbot_core::{SessionLog, SessionLogError};
use cleanbot_types::{CleaningMode, SessionId, SessionOutcome, SessionRecord};
use uuid::Uuid;

use crate::error::DbError;
use crate::postgres::PostgresPool;

/// A row from the `cleaning_sessions` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct SessionRow {
    /// Session identifier.
    pub id: Uuid,
    /// When the session started.
    pub start_time: DateTime<Utc>,
    /// When the session ended.
    pub end_time: DateTime<Utc>,
    /// Whole seconds the session ran.
    pub duration_seconds: i64,
    /// Cleaning mode name.
    pub mode: String,
    /// Outcome name.
    pub outcome: String,
    /// Progress percent when the session ended.
    pub final_progress: i16,
}

impl TryFrom<SessionRow> for SessionRecord {
    type Error = DbError;

    fn try_from(row: SessionRow) -> Result<Self, Self::Error> {
        let mode = CleaningMode::from_wire(&row.mode)
            .ok_or_else(|| DbError::InvalidRow(format!("unknown mode `{}`", row.mode)))?;
        let outcome = SessionOutcome::from_wire(&row.outcome)
            .ok_or_else(|| DbError::InvalidRow(format!("unknown outcome `{}`", row.outcome)))?;
        let duration = u64::try_from(row.duration_seconds).map_err(|e| {
            DbError::InvalidRow(format!("duration {}: {e}", row.duration_seconds))
        })?;
        let final_progress = u8::try_from(row.final_progress)
            .ok()
            .filter(|p| *p <= 100)
            .ok_or_else(|| {
                DbError::InvalidRow(format!("progress {} out of range", row.final_progress))
            })?;

        Ok(Self {
            id: SessionId::from(row.id),
            start_time: row.start_time,
            end_time: row.end_time,
            duration,
            mode,
            outcome,
            final_progress,
        })
    }
}

/// [`SessionLog`] backed by `PostgreSQL`.
#[derive(Debug, Clone)]
pub struct PostgresSessionLog {
    pool: PostgresPool,
}

impl PostgresSessionLog {
    /// Store sessions through `pool`. Migrations must already have run.
    pub const fn new(pool: PostgresPool) -> Self {
        Self { pool }
    }

    /// Insert one record.
    pub async fn insert(&self, record: &SessionRecord) -> Result<(), DbError> {
        sqlx::query(
            r"INSERT INTO cleaning_sessions (id, start_time, end_time, duration_seconds, mode, outcome, final_progress)
              VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(record.id.into_inner())
        .bind(record.start_time)
        .bind(record.end_time)
        .bind(i64::try_from(record.duration).unwrap_or(i64::MAX))
        .bind(record.mode.as_str())
        .bind(record.outcome.as_str())
        .bind(i16::from(record.final_progress))
        .execute(self.pool.pool())
        .await?;

        tracing::debug!(session_id = %record.id, "Inserted cleaning session");
        Ok(())
    }

    /// Up to `limit` records, newest start time first.
    pub async fn recent(&self, limit: usize) -> Result<Vec<SessionRecord>, DbError> {
        let rows = sqlx::query_as::<_, SessionRow>(
            r"SELECT id, start_time, end_time, duration_seconds, mode, outcome, final_progress
              FROM cleaning_sessions
              ORDER BY start_time DESC
              LIMIT $1",
        )
        .bind(i64::try_from(limit).unwrap_or(i64::MAX))
        .fetch_all(self.pool.pool())
        .await?;

        rows.into_iter().map(SessionRecord::try_from).collect()
    }
}

#[async_trait]
impl SessionLog for PostgresSessionLog {
    async fn append(&self, record: &SessionRecord) -> Result<(), SessionLogError> {
        Ok(self.insert(record).await?)
    }

    async fn list_recent(&self, limit: usize) -> Result<Vec<SessionRecord>, SessionLogError> {
        Ok(self.recent(limit).await?)
    }

    async fn close(&self) {
        self.pool.close().await;
    }
}
