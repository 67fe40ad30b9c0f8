use thiserror::Error;

use crate::core::config::ConfigError;
use crate::storage::StoreError;
use crate::weather::WeatherError;

/// Centralized error types for the application
///
/// Layer-specific errors (`WeatherError`, `StoreError`, `ConfigError`) convert
/// into this enum so callers at the edges can propagate everything with `?`.
///
/// # Example
///
/// ```no_run
/// use weathercore::core::error::AppError;
///
/// fn handle_error(err: AppError) {
///     eprintln!("Error: {}", err);
/// }
/// ```
#[derive(Error, Debug)]
pub enum AppError {
    /// Database-related errors
    #[error("Database error: {0}")]
    Database(#[from] StoreError),

    /// Weather provider errors
    #[error("Weather API error: {0}")]
    Weather(#[from] WeatherError),

    /// Startup configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// HTTP client errors outside the weather client
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),
}

/// Type alias for Result with AppError
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_display() {
        let err: AppError = ConfigError::Missing("BOT_TOKEN").into();
        assert_eq!(
            err.to_string(),
            "Configuration error: BOT_TOKEN environment variable not set"
        );
    }

    #[test]
    fn test_weather_error_converts() {
        let err: AppError = WeatherError::LocationNotFound.into();
        assert!(matches!(err, AppError::Weather(WeatherError::LocationNotFound)));
    }
}
