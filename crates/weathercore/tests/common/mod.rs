//! Common test utilities
//!
//! Weather payload fixtures and a scripted `WeatherProvider` shared by the
//! integration tests of this crate.

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{Duration, NaiveDate};
use serde_json::{json, Value};
use std::sync::Mutex;

use weathercore::storage::{
    ActionsCount, ActionsFilter, ChatState, ChatStore, InMemoryStore, StatisticEntry, StatisticStore, StoreError,
};
use weathercore::weather::{WeatherError, WeatherProvider, WeatherSnapshot};

pub fn day_json(date: NaiveDate, avg: f64) -> Value {
    json!({
        "date": date.format("%Y-%m-%d").to_string(),
        "date_epoch": 0,
        "day": {
            "maxtemp_c": avg + 3.0,
            "mintemp_c": avg - 3.0,
            "avgtemp_c": avg,
            "maxwind_kph": 18.0,
            "avghumidity": 70,
            "daily_chance_of_rain": 40,
            "daily_chance_of_snow": 0,
            "condition": {"text": "Partly cloudy", "icon": "", "code": 1003}
        }
    })
}

pub fn snapshot_json(city: &str, days: Vec<Value>) -> Value {
    json!({
        "location": {
            "name": city,
            "region": "Region",
            "country": "Country",
            "lat": 55.75,
            "lon": 37.61,
            "tz_id": "Europe/Moscow",
            "localtime_epoch": 0,
            "localtime": "2024-05-01 12:00"
        },
        "current": {
            "last_updated": "2024-05-01 12:00",
            "temp_c": 14.0,
            "feelslike_c": 12.0,
            "wind_kph": 18.0,
            "wind_dir": "N",
            "humidity": 60,
            "condition": {"text": "Sunny", "icon": "", "code": 1000}
        },
        "forecast": {"forecastday": days}
    })
}

/// Weather provider that builds answers locally and logs every call.
///
/// Forecast days are dated from `today`, with average temperature
/// `forecast_avg`; history days use `history_avg`.
pub struct FakeWeather {
    pub today: NaiveDate,
    pub known_cities: Vec<String>,
    pub forecast_avg: f64,
    pub history_avg: f64,
    pub fail_with_status: Option<u16>,
    pub calls: Mutex<Vec<String>>,
}

impl FakeWeather {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            today,
            known_cities: vec!["Moskva".to_string(), "Kazan".to_string()],
            forecast_avg: 15.0,
            history_avg: 10.0,
            fail_with_status: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn check(&self, call: String, location: &str) -> Result<(), WeatherError> {
        self.calls.lock().unwrap().push(call);
        if let Some(status) = self.fail_with_status {
            return Err(WeatherError::from_status(status, None));
        }
        if !self.known_cities.iter().any(|c| c == location) {
            return Err(WeatherError::from_status(400, Some((1006, "No matching location found.".into()))));
        }
        Ok(())
    }

    fn snapshot(location: &str, days: Vec<Value>) -> WeatherSnapshot {
        serde_json::from_value(snapshot_json(location, days)).unwrap()
    }
}

#[async_trait]
impl WeatherProvider for FakeWeather {
    async fn current(&self, location: &str) -> Result<WeatherSnapshot, WeatherError> {
        self.check(format!("current {}", location), location)?;
        Ok(Self::snapshot(location, vec![]))
    }

    async fn forecast(&self, location: &str, days: u32) -> Result<WeatherSnapshot, WeatherError> {
        self.check(format!("forecast {} {}", location, days), location)?;
        let days = (0..days as i64)
            .map(|i| day_json(self.today + Duration::days(i), self.forecast_avg))
            .collect();
        Ok(Self::snapshot(location, days))
    }

    async fn history(&self, location: &str, date: NaiveDate) -> Result<WeatherSnapshot, WeatherError> {
        self.check(format!("history {} {}", location, date), location)?;
        Ok(Self::snapshot(location, vec![day_json(date, self.history_avg)]))
    }
}

/// Store wrapper whose operations can be switched to fail with a pool timeout.
#[derive(Default)]
pub struct FailingStore {
    pub inner: InMemoryStore,
    pub fail_ensure: bool,
    pub fail_save: bool,
    pub fail_record: bool,
}

fn pool_timeout() -> StoreError {
    StoreError::Sqlx(sqlx::Error::PoolTimedOut)
}

#[async_trait]
impl ChatStore for FailingStore {
    async fn ensure(&self, chat_id: i64) -> Result<ChatState, StoreError> {
        if self.fail_ensure {
            return Err(pool_timeout());
        }
        self.inner.ensure(chat_id).await
    }

    async fn save(&self, state: &ChatState) -> Result<(), StoreError> {
        if self.fail_save {
            return Err(pool_timeout());
        }
        self.inner.save(state).await
    }
}

#[async_trait]
impl StatisticStore for FailingStore {
    async fn record(&self, entry: &StatisticEntry) -> Result<(), StoreError> {
        if self.fail_record {
            return Err(pool_timeout());
        }
        self.inner.record(entry).await
    }

    async fn users_actions(&self, filter: &ActionsFilter) -> Result<Vec<StatisticEntry>, StoreError> {
        self.inner.users_actions(filter).await
    }

    async fn actions_count(&self, chat_id: i64) -> Result<Vec<ActionsCount>, StoreError> {
        self.inner.actions_count(chat_id).await
    }
}
