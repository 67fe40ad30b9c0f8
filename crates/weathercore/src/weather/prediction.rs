//! `/prediction`: next few days against the past week.
//!
//! The past-week average comes from one `history.json` call per day. The
//! upcoming average covers forecast days 1..=3 (today excluded). Both are
//! rounded to whole degrees before comparing. Repeated daily values all
//! count towards the average.

use chrono::{Duration, NaiveDate};

use crate::core::config::chat::{HISTORY_DAYS, PREDICTION_DAYS};
use crate::weather::{WeatherError, WeatherProvider};

/// Direction of the change, in whole degrees.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trend {
    Warmer(i64),
    Colder(i64),
    Same,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Prediction {
    pub past_avg: i64,
    pub upcoming_avg: i64,
}

impl Prediction {
    /// `None` when either side has no data.
    pub fn from_temperatures(past: &[f64], upcoming: &[f64]) -> Option<Self> {
        Some(Self {
            past_avg: rounded_mean(past)?,
            upcoming_avg: rounded_mean(upcoming)?,
        })
    }

    pub fn trend(&self) -> Trend {
        match self.upcoming_avg - self.past_avg {
            0 => Trend::Same,
            d if d > 0 => Trend::Warmer(d),
            d => Trend::Colder(-d),
        }
    }

    pub fn message(&self) -> String {
        let head = format!(
            "The average temperature in the next {} days will be {}°C",
            PREDICTION_DAYS, self.upcoming_avg
        );
        match self.trend() {
            Trend::Warmer(d) => format!("{}, which is {}°C warmer than the last week", head, d),
            Trend::Colder(d) => format!("{}, which is {}°C colder than the last week", head, d),
            Trend::Same => format!(
                "{}, the temperature remains the same as in the last {} days",
                head, HISTORY_DAYS
            ),
        }
    }
}

fn rounded_mean(values: &[f64]) -> Option<i64> {
    if values.is_empty() {
        return None;
    }
    Some((values.iter().sum::<f64>() / values.len() as f64).round() as i64)
}

/// Fetches the past week and the next days for `location`.
///
/// Returns `Ok(None)` when the provider returned no usable days.
pub async fn predict(
    provider: &dyn WeatherProvider,
    location: &str,
    today: NaiveDate,
) -> Result<Option<Prediction>, WeatherError> {
    let mut past = Vec::with_capacity(HISTORY_DAYS as usize);
    for days_back in 1..=HISTORY_DAYS {
        let snapshot = provider.history(location, today - Duration::days(days_back)).await?;
        if let Some(day) = snapshot.day(0) {
            past.push(day.day.avgtemp_c);
        }
    }

    let snapshot = provider.forecast(location, PREDICTION_DAYS as u32 + 1).await?;
    let upcoming: Vec<f64> = snapshot
        .forecast
        .forecastday
        .iter()
        .skip(1)
        .take(PREDICTION_DAYS)
        .map(|d| d.day.avgtemp_c)
        .collect();

    log::debug!("Prediction for {}: past {:?}, upcoming {:?}", location, past, upcoming);
    Ok(Prediction::from_temperatures(&past, &upcoming))
}
