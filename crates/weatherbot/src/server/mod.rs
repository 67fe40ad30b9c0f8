//! HTTP surface of the bot.
//!
//! - `POST /tg_webhooks`: Telegram update deliveries
//! - `GET /users_actions`, `GET /actions_count`: Basic-auth analytics
//! - metrics and health live on a separate port, see [`metrics`]

pub mod analytics;
pub mod auth;
pub mod error;
pub mod metrics;
pub mod webhook;

use axum::{
    routing::{get, post},
    Router,
};
use secrecy::SecretString;
use std::sync::Arc;
use teloxide::Bot;

use weathercore::{config, Dispatcher, StatisticStore};

pub use auth::Credentials;
pub use error::ApiError;

/// Shared state for all endpoints
#[derive(Clone)]
pub struct AppState {
    pub dispatcher: Dispatcher,
    pub statistics: Arc<dyn StatisticStore>,
    pub bot: Bot,
    pub webhook_secret: SecretString,
    /// `None` keeps the analytics endpoints closed
    pub analytics: Option<Credentials>,
}

/// Builds the public router: webhook plus analytics.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route(config::webhook::PATH, post(webhook::handle_update))
        .route("/users_actions", get(analytics::users_actions))
        .route("/actions_count", get(analytics::actions_count))
        .with_state(Arc::new(state))
}
