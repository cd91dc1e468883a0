//! Storage errors and append-only history shared by the supplier and tender stores.

use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HistoryAction {
    Created,
    Updated,
    Deleted,
}

/// One immutable snapshot appended on every write.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryRecord {
    pub entity_id: u64,
    pub action: HistoryAction,
    pub recorded_at: DateTime<Utc>,
    pub snapshot: serde_json::Value,
}

impl HistoryRecord {
    pub(crate) fn capture<T: Serialize>(
        entity_id: u64,
        action: HistoryAction,
        entity: &T,
    ) -> Result<Self, RepositoryError> {
        let snapshot = serde_json::to_value(entity)
            .map_err(|err| RepositoryError::Unavailable(format!("history snapshot: {err}")))?;
        Ok(Self {
            entity_id,
            action,
            recorded_at: Utc::now(),
            snapshot,
        })
    }
}

pub(crate) fn lock<'a, T>(
    mutex: &'a Mutex<T>,
    store: &str,
) -> Result<MutexGuard<'a, T>, RepositoryError> {
    mutex
        .lock()
        .map_err(|_| RepositoryError::Unavailable(format!("{store} lock poisoned")))
}
