use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::migrate::Migrator;
use sqlx::Row;
use std::time::Duration;

use crate::core::config;
use crate::core::retry::{retry, RetryConfig};
use crate::storage::{query, ActionsCount, ActionsFilter, ChatState, ChatStore, StatisticEntry, StatisticStore, StoreError};

static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Opens the connection pool.
pub async fn create_pool(database_url: &str) -> Result<PgPool, StoreError> {
    let pool = PgPoolOptions::new()
        .max_connections(*config::database::MAX_CONNECTIONS)
        .acquire_timeout(Duration::from_secs(config::database::ACQUIRE_TIMEOUT_SECS))
        .test_before_acquire(true)
        .connect(database_url)
        .await
        .map_err(|e| {
            let err = StoreError::from(e);
            err.record();
            err
        })?;

    log::info!("Database pool ready (max {} connections)", *config::database::MAX_CONNECTIONS);
    Ok(pool)
}

/// Applies the embedded migrations.
pub async fn run_migrations(pool: &PgPool) -> Result<(), StoreError> {
    MIGRATOR.run(pool).await?;
    log::info!("Database migrations applied");
    Ok(())
}

/// Postgres-backed chat state and statistics.
///
/// Every operation runs in its own transaction and is retried on transient
/// connection errors.
#[derive(Clone, Debug)]
pub struct PgStore {
    pool: PgPool,
    retry: RetryConfig,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            retry: RetryConfig::database(),
        }
    }

    async fn ensure_once(&self, chat_id: i64) -> Result<ChatState, sqlx::Error> {
        let defaults = ChatState::new(chat_id);
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "INSERT INTO user_state (chat_id, city, date_difference, qty_days) VALUES ($1, $2, $3, $4) \
             ON CONFLICT (chat_id) DO NOTHING",
        )
        .bind(chat_id)
        .bind(defaults.city.encode())
        .bind(defaults.date_difference.encode())
        .bind(defaults.qty_days.encode())
        .execute(&mut *tx)
        .await?;

        let row = sqlx::query("SELECT city, date_difference, qty_days FROM user_state WHERE chat_id = $1")
            .bind(chat_id)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(ChatState::from_columns(
            chat_id,
            row.try_get("city")?,
            row.try_get("date_difference")?,
            row.try_get("qty_days")?,
        ))
    }

    async fn save_once(&self, state: &ChatState) -> Result<(), sqlx::Error> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("UPDATE user_state SET city = $2, date_difference = $3, qty_days = $4 WHERE chat_id = $1")
            .bind(state.chat_id)
            .bind(state.city.encode())
            .bind(state.date_difference.encode())
            .bind(state.qty_days.encode())
            .execute(&mut *tx)
            .await?;
        tx.commit().await
    }

    async fn record_once(&self, entry: &StatisticEntry) -> Result<(), sqlx::Error> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("INSERT INTO statistic (ts, user_name, chat_id, action) VALUES ($1, $2, $3, $4)")
            .bind(entry.ts)
            .bind(&entry.user_name)
            .bind(entry.chat_id)
            .bind(&entry.action)
            .execute(&mut *tx)
            .await?;
        tx.commit().await
    }
}

/// Logs and counts a failed store call.
fn failed(operation: &str, e: sqlx::Error) -> StoreError {
    let err = StoreError::from(e);
    err.record();
    log::error!("Database {} failed: {}", operation, err);
    err
}

#[async_trait]
impl ChatStore for PgStore {
    async fn ensure(&self, chat_id: i64) -> Result<ChatState, StoreError> {
        retry(&self.retry, || self.ensure_once(chat_id))
            .await
            .into_result()
            .map_err(|e| failed("ensure user_state", e))
    }

    async fn save(&self, state: &ChatState) -> Result<(), StoreError> {
        retry(&self.retry, || self.save_once(state))
            .await
            .into_result()
            .map_err(|e| failed("update user_state", e))
    }
}

#[async_trait]
impl StatisticStore for PgStore {
    async fn record(&self, entry: &StatisticEntry) -> Result<(), StoreError> {
        retry(&self.retry, || self.record_once(entry))
            .await
            .into_result()
            .map_err(|e| failed("insert statistic", e))
    }

    async fn users_actions(&self, filter: &ActionsFilter) -> Result<Vec<StatisticEntry>, StoreError> {
        retry(&self.retry, || async {
            let mut qb = query::users_actions(filter);
            qb.build_query_as::<StatisticEntry>().fetch_all(&self.pool).await
        })
        .await
        .into_result()
        .map_err(|e| failed("select users_actions", e))
    }

    async fn actions_count(&self, chat_id: i64) -> Result<Vec<ActionsCount>, StoreError> {
        retry(&self.retry, || async {
            let mut qb = query::actions_count(chat_id);
            qb.build_query_as::<ActionsCount>().fetch_all(&self.pool).await
        })
        .await
        .into_result()
        .map_err(|e| failed("select actions_count", e))
    }
}
