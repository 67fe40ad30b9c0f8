use axum::{body::Bytes, extract::State, http::HeaderMap, http::StatusCode};
use secrecy::ExposeSecret;
use std::sync::Arc;
use teloxide::types::Update;

use weathercore::config;
use weathercore::core::metrics;

use super::{ApiError, AppState};
use crate::telegram::{send_replies, to_inbound};

/// POST /tg_webhooks - one Telegram update
///
/// Anything that goes wrong after the update is accepted is reported to the
/// chat, never to Telegram, so deliveries are not retried.
pub async fn handle_update(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<StatusCode, ApiError> {
    let secret = headers
        .get(config::webhook::SECRET_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    if secret != state.webhook_secret.expose_secret() {
        log::warn!("Webhook delivery with a wrong secret token rejected");
        metrics::inc(&metrics::UNAUTHORIZED_ACCESS);
        return Err(ApiError::InvalidSecret("Invalid secret token".to_string()));
    }
    metrics::inc(&metrics::POST_REQUESTS);

    let update: Update = serde_json::from_slice(&body).map_err(|e| {
        log::warn!("Malformed update: {}", e);
        ApiError::BadRequest(format!("Invalid update: {}", e))
    })?;

    let Some(inbound) = to_inbound(&update) else {
        log::debug!("Update {} carries no text message, skipped", update.id.0);
        return Ok(StatusCode::OK);
    };

    let replies = state.dispatcher.dispatch(&inbound).await;
    if let Err(e) = send_replies(&state.bot, inbound.chat_id, &replies).await {
        log::error!("Chat {}: failed to send replies: {}", inbound.chat_id, e);
        metrics::inc(&metrics::INSTANCE_ERRORS);
    }

    Ok(StatusCode::OK)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server::router;
    use axum::body::Body;
    use axum::http::Request;
    use secrecy::SecretString;
    use teloxide::Bot;
    use tower::ServiceExt;
    use weathercore::storage::InMemoryStore;
    use weathercore::{Dispatcher, WeatherApiClient};

    fn state() -> AppState {
        let store = Arc::new(InMemoryStore::new());
        // Never reached: these deliveries do not dispatch
        let weather = WeatherApiClient::new("http://127.0.0.1:9/v1", SecretString::from("k")).unwrap();
        AppState {
            dispatcher: Dispatcher::new(store.clone(), store.clone(), Arc::new(weather)),
            statistics: store,
            bot: Bot::new("123:ABC"),
            webhook_secret: SecretString::from("s3cret"),
            analytics: None,
        }
    }

    fn post_requests() -> f64 {
        metrics::POST_REQUESTS
            .with_label_values(&[config::metrics::INSTANCE_ID.as_str()])
            .get()
    }

    async fn deliver(secret: &str) -> StatusCode {
        let request = Request::post(config::webhook::PATH)
            .header(config::webhook::SECRET_HEADER, secret)
            .body(Body::from(r#"{"update_id": 1}"#))
            .unwrap();
        router(state()).oneshot(request).await.unwrap().status()
    }

    #[tokio::test]
    async fn test_only_authenticated_deliveries_count_as_posts() {
        let before = post_requests();

        assert_eq!(deliver("guess").await, StatusCode::UNAUTHORIZED);
        assert_eq!(post_requests(), before);

        assert_eq!(deliver("s3cret").await, StatusCode::OK);
        assert_eq!(post_requests(), before + 1.0);
    }
}
