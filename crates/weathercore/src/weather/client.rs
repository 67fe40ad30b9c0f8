use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use url::Url;

use crate::core::config;
use crate::core::error::{AppError, AppResult};
use crate::core::metrics;
use crate::weather::models::{ApiErrorBody, WeatherSnapshot};
use crate::weather::{WeatherError, WeatherProvider};

/// HTTP client for weatherapi.com.
///
/// Failures are never retried here; every error goes back to the caller
/// and ends up as a reply to the user.
#[derive(Clone)]
pub struct WeatherApiClient {
    http: Client,
    base_url: String,
    api_key: SecretString,
}

impl WeatherApiClient {
    /// Creates a client for `base_url` (e.g. `http://api.weatherapi.com/v1`).
    pub fn new(base_url: &str, api_key: SecretString) -> AppResult<Self> {
        Url::parse(base_url).map_err(|e| AppError::Validation(format!("weather API URL {}: {}", base_url, e)))?;

        let http = Client::builder().timeout(config::weather::timeout()).build()?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        })
    }

    /// Builds `<base>/<endpoint>?key=..&q=..&<extra>`.
    pub fn request_url(&self, endpoint: &str, location: &str, extra: &[(&str, String)]) -> Result<Url, WeatherError> {
        let mut params: Vec<(&str, &str)> = vec![("key", self.api_key.expose_secret()), ("q", location)];
        params.extend(extra.iter().map(|(k, v)| (*k, v.as_str())));

        let url = Url::parse_with_params(&format!("{}/{}", self.base_url, endpoint), params)?;
        Ok(url)
    }

    /// Requests `current.json` for a known city so a bad key fails at startup.
    pub async fn check_api_key(&self) -> Result<(), WeatherError> {
        self.current(config::weather::KEY_CHECK_CITY).await.map(|_| ())
    }

    async fn fetch(&self, endpoint: &str, location: &str, extra: &[(&str, String)]) -> Result<WeatherSnapshot, WeatherError> {
        let url = self.request_url(endpoint, location, extra)?;
        // The URL carries the key; log the endpoint and location only
        log::debug!("Weather API request: {} q={}", endpoint, location);

        let response = self.http.get(url).send().await.map_err(|e| {
            log::error!("Weather API {} transport error: {}", endpoint, e);
            WeatherError::Transport(e)
        })?;

        let status = response.status().as_u16();
        let body = response.bytes().await?;

        if status != 200 {
            metrics::record_external_api_error(status);
            let provider = serde_json::from_slice::<ApiErrorBody>(&body)
                .ok()
                .map(|b| (b.error.code, b.error.message));
            let err = WeatherError::from_status(status, provider);
            log::warn!("Weather API {} answered HTTP {}: {}", endpoint, status, err);
            return Err(err);
        }

        serde_json::from_slice::<WeatherSnapshot>(&body).map_err(|e| {
            metrics::inc(&metrics::EXTERNAL_API_VALIDATION_ERRORS);
            log::error!("Weather API {} payload did not match the model: {}", endpoint, e);
            WeatherError::Schema(e)
        })
    }
}

#[async_trait]
impl WeatherProvider for WeatherApiClient {
    async fn current(&self, location: &str) -> Result<WeatherSnapshot, WeatherError> {
        self.fetch("current.json", location, &[]).await
    }

    async fn forecast(&self, location: &str, days: u32) -> Result<WeatherSnapshot, WeatherError> {
        let extra = [
            ("days", days.to_string()),
            ("aqi", "no".to_string()),
            ("alerts", "no".to_string()),
        ];
        self.fetch("forecast.json", location, &extra).await
    }

    async fn history(&self, location: &str, date: NaiveDate) -> Result<WeatherSnapshot, WeatherError> {
        let extra = [("dt", date.format("%Y-%m-%d").to_string())];
        self.fetch("history.json", location, &extra).await
    }
}

impl std::fmt::Debug for WeatherApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WeatherApiClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}
