//! Parameterized analytics queries.
//!
//! Values are always pushed as bind parameters, never spliced into SQL.

use sqlx::{Postgres, QueryBuilder};

use crate::storage::ActionsFilter;

/// `SELECT ... FROM statistic [WHERE ...] ORDER BY ts DESC LIMIT $n`
pub fn users_actions(filter: &ActionsFilter) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new("SELECT id, ts, user_name, chat_id, action FROM statistic");

    let mut conditions: Vec<(&str, i64)> = Vec::new();
    if let Some(chat_id) = filter.chat_id {
        conditions.push(("chat_id = ", chat_id));
    }
    if let Some(from_ts) = filter.from_ts {
        conditions.push(("ts > ", from_ts));
    }
    if let Some(until_ts) = filter.until_ts {
        conditions.push(("ts < ", until_ts));
    }

    for (i, (condition, value)) in conditions.into_iter().enumerate() {
        qb.push(if i == 0 { " WHERE " } else { " AND " });
        qb.push(condition);
        qb.push_bind(value);
    }

    qb.push(" ORDER BY ts DESC LIMIT ");
    qb.push_bind(filter.limit());
    qb
}

/// Monthly action counts of one chat.
pub fn actions_count(chat_id: i64) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new(
        "SELECT chat_id, DATE_TRUNC('month', to_timestamp(ts)) AS month, COUNT(*) AS actions_count \
         FROM statistic WHERE chat_id = ",
    );
    qb.push_bind(chat_id);
    qb.push(" GROUP BY chat_id, month ORDER BY month");
    qb
}
