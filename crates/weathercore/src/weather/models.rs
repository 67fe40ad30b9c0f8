//! weatherapi.com response models
//!
//! Only the fields the bot renders are modelled; serde ignores the rest.

use chrono::NaiveDate;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Condition {
    pub text: String,
    #[serde(default)]
    pub code: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Location {
    pub name: String,
    pub region: String,
    pub country: String,
    #[serde(default)]
    pub lat: f64,
    #[serde(default)]
    pub lon: f64,
    pub localtime: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Current {
    pub temp_c: f64,
    pub feelslike_c: f64,
    pub wind_kph: f64,
    pub wind_dir: String,
    #[serde(default)]
    pub gust_kph: f64,
    pub humidity: f64,
    pub condition: Condition,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DayDetails {
    pub maxtemp_c: f64,
    pub mintemp_c: f64,
    pub avgtemp_c: f64,
    pub maxwind_kph: f64,
    pub avghumidity: f64,
    #[serde(default)]
    pub daily_chance_of_rain: i64,
    #[serde(default)]
    pub daily_chance_of_snow: i64,
    pub condition: Condition,
}

impl DayDetails {
    /// Rain chance when the reference temperature is above zero, snow otherwise.
    pub fn precipitation_chance(&self, reference_temp_c: f64) -> i64 {
        if reference_temp_c > 0.0 {
            self.daily_chance_of_rain
        } else {
            self.daily_chance_of_snow
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ForecastDay {
    pub date: NaiveDate,
    pub day: DayDetails,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Forecast {
    #[serde(default)]
    pub forecastday: Vec<ForecastDay>,
}

/// Parsed answer of `current.json`, `forecast.json` or `history.json`.
///
/// `history.json` carries no `current` block, hence the `Option`.
#[derive(Debug, Clone, Deserialize)]
pub struct WeatherSnapshot {
    pub location: Location,
    #[serde(default)]
    pub current: Option<Current>,
    #[serde(default)]
    pub forecast: Forecast,
}

impl WeatherSnapshot {
    pub fn day(&self, index: usize) -> Option<&ForecastDay> {
        self.forecast.forecastday.get(index)
    }
}

/// Error body of a non-200 response: `{"error": {"code": 1006, "message": "..."}}`
#[derive(Debug, Deserialize)]
pub(crate) struct ApiErrorBody {
    pub error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiErrorDetail {
    pub code: i64,
    #[serde(default)]
    pub message: String,
}

#[cfg(test)]
pub(crate) mod fixtures {
    use serde_json::{json, Value};

    pub fn day(date: &str, avg: f64) -> Value {
        json!({
            "date": date,
            "date_epoch": 0,
            "day": {
                "maxtemp_c": avg + 3.0,
                "mintemp_c": avg - 3.0,
                "avgtemp_c": avg,
                "maxwind_kph": 18.0,
                "avghumidity": 71,
                "daily_chance_of_rain": 40,
                "daily_chance_of_snow": 5,
                "condition": {"text": "Partly cloudy", "icon": "", "code": 1003}
            }
        })
    }

    pub fn snapshot(days: Vec<Value>) -> Value {
        json!({
            "location": {
                "name": "Kazan",
                "region": "Tatarstan",
                "country": "Russia",
                "lat": 55.75,
                "lon": 49.13,
                "tz_id": "Europe/Moscow",
                "localtime_epoch": 0,
                "localtime": "2024-05-01 12:00"
            },
            "current": {
                "last_updated": "2024-05-01 12:00",
                "temp_c": 14.0,
                "feelslike_c": 12.5,
                "wind_kph": 18.0,
                "wind_dir": "NW",
                "gust_kph": 25.2,
                "humidity": 60,
                "condition": {"text": "Sunny", "icon": "", "code": 1000}
            },
            "forecast": {"forecastday": days}
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_forecast_snapshot() {
        let value = fixtures::snapshot(vec![fixtures::day("2024-05-01", 10.0), fixtures::day("2024-05-02", 12.0)]);
        let snapshot: WeatherSnapshot = serde_json::from_value(value).unwrap();

        assert_eq!(snapshot.location.name, "Kazan");
        assert_eq!(snapshot.forecast.forecastday.len(), 2);
        assert_eq!(snapshot.day(1).unwrap().date, NaiveDate::from_ymd_opt(2024, 5, 2).unwrap());
        assert_eq!(snapshot.current.unwrap().wind_dir, "NW");
    }

    #[test]
    fn test_history_snapshot_without_current() {
        let mut value = fixtures::snapshot(vec![fixtures::day("2024-04-30", 8.0)]);
        value.as_object_mut().unwrap().remove("current");
        let snapshot: WeatherSnapshot = serde_json::from_value(value).unwrap();
        assert!(snapshot.current.is_none());
    }

    #[test]
    fn test_precipitation_chance_depends_on_temperature() {
        let value = fixtures::day("2024-05-01", 10.0);
        let day: ForecastDay = serde_json::from_value(value).unwrap();
        assert_eq!(day.day.precipitation_chance(5.0), 40);
        assert_eq!(day.day.precipitation_chance(-1.0), 5);
    }

    #[test]
    fn test_missing_location_is_schema_error() {
        let result: Result<WeatherSnapshot, _> = serde_json::from_value(serde_json::json!({"forecast": {}}));
        assert!(result.is_err());
    }
}
