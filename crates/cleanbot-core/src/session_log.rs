//! Durable history of finished cleaning sessions.
//!
//! The [`SessionLog`] trait is the storage seam: the controller appends one
//! record per session end and the status surface lists the most recent
//! records. The production backend lives in `cleanbot-db`; an in-memory
//! log serves tests and database-less runs.

use std::cmp::Reverse;

use async_trait::async_trait;
use cleanbot_types::SessionRecord;
use tokio::sync::RwLock;

/// Largest page `list_recent` will return, and the default page size.
pub const MAX_PAGE_SIZE: usize = 100;

/// Normalize a requested page size to `1..=MAX_PAGE_SIZE`.
///
/// A missing limit means the maximum.
pub fn clamp_limit(requested: Option<usize>) -> usize {
    requested.map_or(MAX_PAGE_SIZE, |n| n.clamp(1, MAX_PAGE_SIZE))
}

/// Errors from a session log backend.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionLogError {
    /// The backing store could not be reached or rejected the operation.
    #[error("session storage unavailable: {0}")]
    StorageUnavailable(String),
}

/// Append-only store of session records.
#[async_trait]
pub trait SessionLog: Send + Sync {
    /// Persist one finished session.
    async fn append(&self, record: &SessionRecord) -> Result<(), SessionLogError>;

    /// Up to `limit` records, newest start time first.
    async fn list_recent(&self, limit: usize) -> Result<Vec<SessionRecord>, SessionLogError>;

    /// Release any held resources. Called once at shutdown.
    async fn close(&self) {}
}

/// A [`SessionLog`] kept in process memory.
#[derive(Debug, Default)]
pub struct InMemorySessionLog {
    records: RwLock<Vec<SessionRecord>>,
}

impl InMemorySessionLog {
    /// An empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records.
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    /// Whether no record has been stored.
    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl SessionLog for InMemorySessionLog {
    async fn append(&self, record: &SessionRecord) -> Result<(), SessionLogError> {
        self.records.write().await.push(record.clone());
        Ok(())
    }

    async fn list_recent(&self, limit: usize) -> Result<Vec<SessionRecord>, SessionLogError> {
        let mut records = self.records.read().await.clone();
        records.sort_by_key(|r| Reverse(r.start_time));
        records.truncate(limit);
        Ok(records)
    }
}
