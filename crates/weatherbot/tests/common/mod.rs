//! Shared fixtures: an in-memory app wired to a mock Bot API.

#![allow(dead_code)]

use async_trait::async_trait;
use axum::Router;
use chrono::NaiveDate;
use secrecy::SecretString;
use serde_json::{json, Value};
use std::sync::Arc;
use teloxide::Bot;
use wiremock::matchers::{method, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

use weatherbot::server::{router, AppState, Credentials};
use weathercore::storage::InMemoryStore;
use weathercore::weather::WeatherSnapshot;
use weathercore::{Dispatcher, WeatherError, WeatherProvider};

pub const SECRET: &str = "webhook-secret";
pub const USER: &str = "analyst";
pub const PASSWORD: &str = "hunter2";

/// Weather provider that knows no city at all.
pub struct NoSuchCity;

#[async_trait]
impl WeatherProvider for NoSuchCity {
    async fn current(&self, _location: &str) -> Result<WeatherSnapshot, WeatherError> {
        Err(WeatherError::LocationNotFound)
    }

    async fn forecast(&self, _location: &str, _days: u32) -> Result<WeatherSnapshot, WeatherError> {
        Err(WeatherError::LocationNotFound)
    }

    async fn history(&self, _location: &str, _date: NaiveDate) -> Result<WeatherSnapshot, WeatherError> {
        Err(WeatherError::LocationNotFound)
    }
}

pub struct TestApp {
    pub router: Router,
    pub store: Arc<InMemoryStore>,
    pub telegram: MockServer,
}

impl TestApp {
    pub async fn new() -> Self {
        Self::with_analytics(Some(Credentials::new(USER, PASSWORD))).await
    }

    pub async fn with_analytics(analytics: Option<Credentials>) -> Self {
        let telegram = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path_regex(r"(?i)^/bot[^/]+/sendmessage$"))
            .respond_with(ResponseTemplate::new(200).set_body_json(sent_message()))
            .mount(&telegram)
            .await;

        let bot = Bot::new("123:ABC").set_api_url(url::Url::parse(&telegram.uri()).unwrap());
        let store = Arc::new(InMemoryStore::new());

        let state = AppState {
            dispatcher: Dispatcher::new(store.clone(), store.clone(), Arc::new(NoSuchCity)),
            statistics: store.clone(),
            bot,
            webhook_secret: SecretString::from(SECRET),
            analytics,
        };

        Self {
            router: router(state),
            store,
            telegram,
        }
    }

    /// Texts sent through the mock Bot API, in order.
    pub async fn sent_texts(&self) -> Vec<(i64, String)> {
        self.telegram
            .received_requests()
            .await
            .unwrap_or_default()
            .iter()
            .map(|request| {
                let body: Value = serde_json::from_slice(&request.body).unwrap();
                (
                    body["chat_id"].as_i64().unwrap(),
                    body["text"].as_str().unwrap().to_string(),
                )
            })
            .collect()
    }
}

/// A text message update from chat 42.
pub fn text_update(text: &str) -> Value {
    json!({
        "update_id": 1000,
        "message": {
            "message_id": 1,
            "from": {"id": 42, "is_bot": false, "first_name": "Ann", "username": "ann_k"},
            "chat": {"id": 42, "type": "private", "first_name": "Ann"},
            "date": 1_714_550_400,
            "text": text,
        }
    })
}

fn sent_message() -> Value {
    json!({
        "ok": true,
        "result": {
            "message_id": 2,
            "date": 1_714_550_401,
            "chat": {"id": 42, "type": "private", "first_name": "Ann"},
            "text": "ok",
        }
    })
}
