use axum::{
    extract::{Query, State},
    http::HeaderMap,
    Json,
};
use serde::Deserialize;
use std::sync::Arc;

use weathercore::storage::{ActionsCount, ActionsFilter, StoreError};
use weathercore::StatisticEntry;

use super::auth::authorize;
use super::{ApiError, AppState};

#[derive(Debug, Deserialize)]
pub struct ChatQuery {
    pub chat_id: i64,
}

/// GET /users_actions - statistic rows, newest first
pub async fn users_actions(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(filter): Query<ActionsFilter>,
) -> Result<Json<Vec<StatisticEntry>>, ApiError> {
    authorize(&headers, state.analytics.as_ref()).map_err(|e| ApiError::Unauthorized(e.to_string()))?;

    if filter.limit() < 0 {
        return Err(ApiError::BadRequest("limits must not be negative".to_string()));
    }

    let rows = state.statistics.users_actions(&filter).await.map_err(internal)?;
    log::debug!("users_actions {:?}: {} rows", filter, rows.len());
    Ok(Json(rows))
}

/// GET /actions_count - actions of one chat per month
pub async fn actions_count(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<ChatQuery>,
) -> Result<Json<Vec<ActionsCount>>, ApiError> {
    authorize(&headers, state.analytics.as_ref()).map_err(|e| ApiError::Unauthorized(e.to_string()))?;

    let counts = state.statistics.actions_count(query.chat_id).await.map_err(internal)?;
    Ok(Json(counts))
}

fn internal(e: StoreError) -> ApiError {
    log::error!("Analytics query failed: {}", e);
    ApiError::Internal("Database error".to_string())
}
