//! Weather provider access and reply formatting.
//!
//! The `WeatherProvider` trait is the seam between the dialog and the
//! network. `WeatherApiClient` talks to weatherapi.com; tests plug in canned
//! snapshots instead.

pub mod client;
pub mod error;
pub mod format;
pub mod models;
pub mod prediction;

use async_trait::async_trait;
use chrono::NaiveDate;

pub use client::WeatherApiClient;
pub use error::WeatherError;
pub use models::{ForecastDay, Location, WeatherSnapshot};
pub use prediction::{Prediction, Trend};

/// Source of weather snapshots for a location.
///
/// `location` is either a free-text city name or `"lat,lon"`.
#[async_trait]
pub trait WeatherProvider: Send + Sync {
    /// Current conditions (`current.json`).
    async fn current(&self, location: &str) -> Result<WeatherSnapshot, WeatherError>;

    /// Current conditions plus `days` forecast days starting today (`forecast.json`).
    async fn forecast(&self, location: &str, days: u32) -> Result<WeatherSnapshot, WeatherError>;

    /// Observed weather for one past date (`history.json`).
    async fn history(&self, location: &str, date: NaiveDate) -> Result<WeatherSnapshot, WeatherError>;
}
