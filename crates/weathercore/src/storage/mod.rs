//! Chat state and statistics persistence.
//!
//! Two traits, two backends: `PgStore` for production and `InMemoryStore`
//! for tests and local runs without Postgres.

pub mod db;
pub mod memory;
pub mod query;
pub mod state;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::metrics;

pub use db::{create_pool, run_migrations, PgStore};
pub use memory::InMemoryStore;
pub use state::{ChatState, CitySlot, PendingInput, Slot};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),

    #[error(transparent)]
    Migrate(#[from] sqlx::migrate::MigrateError),
}

impl StoreError {
    /// Bumps the matching `database_*_errors` counter.
    pub fn record(&self) {
        let counter = match self {
            StoreError::Sqlx(
                sqlx::Error::Io(_)
                | sqlx::Error::Tls(_)
                | sqlx::Error::PoolTimedOut
                | sqlx::Error::PoolClosed
                | sqlx::Error::WorkerCrashed,
            ) => &*metrics::DATABASE_CONNECTION_ERRORS,
            StoreError::Sqlx(sqlx::Error::Database(_) | sqlx::Error::RowNotFound | sqlx::Error::ColumnDecode { .. }) => {
                &*metrics::DATABASE_QUERY_ERRORS
            }
            _ => &*metrics::DATABASE_OTHER_ERRORS,
        };
        metrics::inc(counter);
    }
}

/// One row of the `statistic` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct StatisticEntry {
    #[serde(default)]
    pub id: i64,
    /// Unix seconds
    pub ts: i64,
    pub user_name: String,
    pub chat_id: i64,
    pub action: String,
}

impl StatisticEntry {
    pub fn new(ts: i64, user_name: impl Into<String>, chat_id: i64, action: impl Into<String>) -> Self {
        Self {
            id: 0,
            ts,
            user_name: user_name.into(),
            chat_id,
            action: action.into(),
        }
    }
}

/// Filters of `GET /users_actions`; every field is optional and they combine.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ActionsFilter {
    pub chat_id: Option<i64>,
    /// Exclusive lower bound on `ts`
    pub from_ts: Option<i64>,
    /// Exclusive upper bound on `ts`
    pub until_ts: Option<i64>,
    pub limits: Option<i64>,
}

impl ActionsFilter {
    pub fn limit(&self) -> i64 {
        self.limits.unwrap_or(crate::core::config::analytics::DEFAULT_LIMIT)
    }

    pub fn matches(&self, entry: &StatisticEntry) -> bool {
        self.chat_id.is_none_or(|id| entry.chat_id == id)
            && self.from_ts.is_none_or(|ts| entry.ts > ts)
            && self.until_ts.is_none_or(|ts| entry.ts < ts)
    }
}

/// Actions of one chat in one calendar month (UTC).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct ActionsCount {
    pub chat_id: i64,
    pub month: DateTime<Utc>,
    pub actions_count: i64,
}

#[async_trait]
pub trait ChatStore: Send + Sync {
    /// Inserts the default row unless one exists, then returns the stored state.
    async fn ensure(&self, chat_id: i64) -> Result<ChatState, StoreError>;

    /// Overwrites the row of `state.chat_id`.
    async fn save(&self, state: &ChatState) -> Result<(), StoreError>;
}

#[async_trait]
pub trait StatisticStore: Send + Sync {
    async fn record(&self, entry: &StatisticEntry) -> Result<(), StoreError>;

    /// Matching rows, newest first.
    async fn users_actions(&self, filter: &ActionsFilter) -> Result<Vec<StatisticEntry>, StoreError>;

    async fn actions_count(&self, chat_id: i64) -> Result<Vec<ActionsCount>, StoreError>;
}
