use async_trait::async_trait;
use chrono::{DateTime, Datelike, TimeZone, Utc};
use dashmap::DashMap;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Mutex;

use crate::storage::{ActionsCount, ActionsFilter, ChatState, ChatStore, StatisticEntry, StatisticStore, StoreError};

/// Process-local store with the same semantics as `PgStore`.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    states: DashMap<i64, ChatState>,
    statistics: Mutex<Vec<StatisticEntry>>,
    next_id: AtomicI64,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stored state without inserting a default row.
    pub fn get(&self, chat_id: i64) -> Option<ChatState> {
        self.states.get(&chat_id).map(|s| s.clone())
    }

    /// Replaces a row, e.g. to seed a test.
    pub fn put(&self, state: ChatState) {
        self.states.insert(state.chat_id, state);
    }

    /// All recorded statistics, oldest first.
    pub fn statistics(&self) -> Vec<StatisticEntry> {
        self.statistics.lock().map(|s| s.clone()).unwrap_or_default()
    }
}

fn month_start(ts: i64) -> Option<DateTime<Utc>> {
    let at = Utc.timestamp_opt(ts, 0).single()?;
    Utc.with_ymd_and_hms(at.year(), at.month(), 1, 0, 0, 0).single()
}

#[async_trait]
impl ChatStore for InMemoryStore {
    async fn ensure(&self, chat_id: i64) -> Result<ChatState, StoreError> {
        Ok(self
            .states
            .entry(chat_id)
            .or_insert_with(|| ChatState::new(chat_id))
            .clone())
    }

    async fn save(&self, state: &ChatState) -> Result<(), StoreError> {
        // UPDATE semantics: rows are only created by `ensure`
        if let Some(mut row) = self.states.get_mut(&state.chat_id) {
            *row = state.clone();
        }
        Ok(())
    }
}

#[async_trait]
impl StatisticStore for InMemoryStore {
    async fn record(&self, entry: &StatisticEntry) -> Result<(), StoreError> {
        let mut entry = entry.clone();
        entry.id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        if let Ok(mut statistics) = self.statistics.lock() {
            statistics.push(entry);
        }
        Ok(())
    }

    async fn users_actions(&self, filter: &ActionsFilter) -> Result<Vec<StatisticEntry>, StoreError> {
        let mut rows: Vec<StatisticEntry> = self.statistics().into_iter().filter(|e| filter.matches(e)).collect();
        rows.sort_by(|a, b| b.ts.cmp(&a.ts));
        rows.truncate(usize::try_from(filter.limit()).unwrap_or(0));
        Ok(rows)
    }

    async fn actions_count(&self, chat_id: i64) -> Result<Vec<ActionsCount>, StoreError> {
        let mut months: BTreeMap<DateTime<Utc>, i64> = BTreeMap::new();
        for entry in self.statistics().iter().filter(|e| e.chat_id == chat_id) {
            if let Some(month) = month_start(entry.ts) {
                *months.entry(month).or_default() += 1;
            }
        }
        Ok(months
            .into_iter()
            .map(|(month, actions_count)| ActionsCount {
                chat_id,
                month,
                actions_count,
            })
            .collect())
    }
}
