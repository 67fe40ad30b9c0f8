use once_cell::sync::Lazy;
use secrecy::SecretString;
use std::env;
use std::time::Duration;
use thiserror::Error;

/// Configuration constants for the bot.
///
/// Every value is read once, on first access, from the environment. `main`
/// loads `.env` with `dotenvy` before anything here is touched.

/// Telegram bot token
/// Read from BOT_TOKEN or TELOXIDE_TOKEN environment variable
pub static BOT_TOKEN: Lazy<String> = Lazy::new(|| {
    env::var("BOT_TOKEN")
        .or_else(|_| env::var("TELOXIDE_TOKEN"))
        .unwrap_or_else(|_| String::new())
});

/// Log level: error, warn, info, debug, trace
/// Read from LOG_LEVEL environment variable
/// Default: info
pub static LOG_LEVEL: Lazy<String> =
    Lazy::new(|| env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()));

/// Optional log file path
/// Read from LOG_FILE_PATH environment variable; unset means console only
pub static LOG_FILE_PATH: Lazy<Option<String>> = Lazy::new(|| non_empty_var("LOG_FILE_PATH"));

/// Weather provider configuration
pub mod weather {
    use once_cell::sync::Lazy;
    use std::env;
    use std::time::Duration;

    /// API key for weatherapi.com
    /// Read from WEATHER_API_KEY, falling back to API_KEY
    pub static API_KEY: Lazy<String> = Lazy::new(|| {
        env::var("WEATHER_API_KEY")
            .or_else(|_| env::var("API_KEY"))
            .unwrap_or_else(|_| String::new())
    });

    /// Base URL of the provider
    /// Read from WEATHER_API_URL environment variable
    /// Default: http://api.weatherapi.com/v1
    pub static API_URL: Lazy<String> =
        Lazy::new(|| env::var("WEATHER_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string()));

    pub const DEFAULT_API_URL: &str = "http://api.weatherapi.com/v1";

    /// City requested to check the API key at startup
    pub const KEY_CHECK_CITY: &str = "Kazan";

    /// Request timeout for provider calls (in seconds)
    pub const REQUEST_TIMEOUT_SECS: u64 = 15;

    pub fn timeout() -> Duration {
        Duration::from_secs(REQUEST_TIMEOUT_SECS)
    }
}

/// Webhook configuration
pub mod webhook {
    use once_cell::sync::Lazy;
    use std::env;

    /// Public domain Telegram pushes updates to (without scheme)
    /// Read from APP_DOMAIN environment variable
    pub static APP_DOMAIN: Lazy<Option<String>> = Lazy::new(|| super::non_empty_var("APP_DOMAIN"));

    /// Shared secret Telegram echoes in X-Telegram-Bot-Api-Secret-Token
    /// Read from SECRET_TOKEN_TG_WEBHOOK environment variable
    pub static SECRET_TOKEN: Lazy<String> =
        Lazy::new(|| env::var("SECRET_TOKEN_TG_WEBHOOK").unwrap_or_else(|_| String::new()));

    /// Path of the webhook endpoint
    pub const PATH: &str = "/tg_webhooks";

    /// Header carrying the shared secret
    pub const SECRET_HEADER: &str = "X-Telegram-Bot-Api-Secret-Token";

    /// Port the HTTP server listens on
    /// Read from HTTP_PORT environment variable
    /// Default: 8888
    pub static HTTP_PORT: Lazy<u16> = Lazy::new(|| {
        env::var("HTTP_PORT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(8888)
    });
}

/// Database configuration
pub mod database {
    use once_cell::sync::Lazy;
    use std::env;

    /// Postgres connection string
    /// Read from DATABASE_URL environment variable
    pub static URL: Lazy<String> = Lazy::new(|| env::var("DATABASE_URL").unwrap_or_else(|_| String::new()));

    /// Maximum pooled connections
    /// Read from DATABASE_MAX_CONNECTIONS environment variable
    /// Default: 10
    pub static MAX_CONNECTIONS: Lazy<u32> = Lazy::new(|| {
        env::var("DATABASE_MAX_CONNECTIONS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(10)
    });

    /// Seconds to wait for a free connection
    pub const ACQUIRE_TIMEOUT_SECS: u64 = 10;

    /// Number of retries for a failed database operation
    pub const MAX_RETRIES: u32 = 3;
}

/// Chat defaults
pub mod chat {
    use once_cell::sync::Lazy;
    use std::env;

    /// City assigned to a chat on first contact
    /// Read from DEFAULT_CITY environment variable
    /// Default: Moskva
    pub static DEFAULT_CITY: Lazy<String> =
        Lazy::new(|| env::var("DEFAULT_CITY").unwrap_or_else(|_| "Moskva".to_string()));

    /// How many days ahead /weather_forecast accepts
    pub const MAX_FORECAST_DAYS_AHEAD: i64 = 10;

    /// Bounds for /forecast_for_several_days
    pub const MIN_DAY_COUNT: u32 = 1;
    pub const MAX_DAY_COUNT: u32 = 10;

    /// Number of past days covered by /weather_statistic and /prediction
    pub const HISTORY_DAYS: i64 = 7;

    /// Number of upcoming days averaged by /prediction
    pub const PREDICTION_DAYS: usize = 3;
}

/// Read-only analytics API configuration
pub mod analytics {
    use once_cell::sync::Lazy;

    /// Basic auth user name
    /// Read from ANALYTICS_USER (or legacy GET_USER)
    pub static USER: Lazy<Option<String>> =
        Lazy::new(|| super::non_empty_var("ANALYTICS_USER").or_else(|| super::non_empty_var("GET_USER")));

    /// Basic auth password
    /// Read from ANALYTICS_PASSWORD (or legacy GET_PASSWORD)
    pub static PASSWORD: Lazy<Option<String>> = Lazy::new(|| {
        super::non_empty_var("ANALYTICS_PASSWORD").or_else(|| super::non_empty_var("GET_PASSWORD"))
    });

    /// Default row limit for /users_actions
    pub const DEFAULT_LIMIT: i64 = 1000;
}

/// Metrics configuration
pub mod metrics {
    use once_cell::sync::Lazy;
    use std::env;

    /// Enable the Prometheus metrics server
    /// Read from METRICS_ENABLED environment variable
    /// Default: true
    pub static ENABLED: Lazy<bool> = Lazy::new(|| {
        env::var("METRICS_ENABLED")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(true)
    });

    /// Port of the metrics server
    /// Read from METRICS_PORT environment variable
    /// Default: 9090
    pub static PORT: Lazy<u16> = Lazy::new(|| {
        env::var("METRICS_PORT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(9090)
    });

    /// Value of the `instance` label on every series
    /// Read from HOSTNAME environment variable
    pub static INSTANCE_ID: Lazy<String> =
        Lazy::new(|| super::non_empty_var("HOSTNAME").unwrap_or_else(|| "weatherbot".to_string()));
}

/// Network configuration
pub mod network {
    use super::Duration;

    /// Request timeout for Telegram Bot API calls (in seconds)
    pub const REQUEST_TIMEOUT_SECS: u64 = 30;

    pub fn timeout() -> Duration {
        Duration::from_secs(REQUEST_TIMEOUT_SECS)
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .and_then(|s| if s.trim().is_empty() { None } else { Some(s) })
}

/// Missing or invalid startup configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} environment variable not set")]
    Missing(&'static str),

    #[error("{name} is invalid: {reason}")]
    Invalid { name: &'static str, reason: String },
}

/// Values needed to talk to Telegram and the weather provider.
///
/// Enough for `check`; `run` needs the full [`Settings`].
#[derive(Debug, Clone)]
pub struct ApiSettings {
    pub bot_token: SecretString,
    pub weather_api_key: SecretString,
    pub weather_api_url: String,
}

impl ApiSettings {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_values(&BOT_TOKEN, &weather::API_KEY, &weather::API_URL)
    }

    pub fn from_values(bot_token: &str, weather_api_key: &str, weather_api_url: &str) -> Result<Self, ConfigError> {
        let bot_token = required("BOT_TOKEN", bot_token)?;
        let weather_api_key = required("WEATHER_API_KEY", weather_api_key)?;

        url::Url::parse(weather_api_url).map_err(|e| ConfigError::Invalid {
            name: "WEATHER_API_URL",
            reason: e.to_string(),
        })?;

        Ok(Self {
            bot_token,
            weather_api_key,
            weather_api_url: weather_api_url.to_string(),
        })
    }
}

/// `DATABASE_URL`, the only value `migrate` needs.
pub fn database_url() -> Result<SecretString, ConfigError> {
    required("DATABASE_URL", &database::URL)
}

/// Validated snapshot of everything the service needs to start.
#[derive(Debug, Clone)]
pub struct Settings {
    pub api: ApiSettings,
    pub app_domain: Option<String>,
    pub webhook_secret: SecretString,
    pub database_url: SecretString,
    pub http_port: u16,
    pub analytics_user: Option<String>,
    pub analytics_password: Option<SecretString>,
}

impl Settings {
    /// Reads the statics above and fails on the first missing required value.
    pub fn from_env() -> Result<Self, ConfigError> {
        let api = ApiSettings::from_env()?;
        let webhook_secret = required("SECRET_TOKEN_TG_WEBHOOK", &webhook::SECRET_TOKEN)?;
        let database_url = database_url()?;

        Ok(Self {
            api,
            app_domain: webhook::APP_DOMAIN.clone(),
            webhook_secret,
            database_url,
            http_port: *webhook::HTTP_PORT,
            analytics_user: analytics::USER.clone(),
            analytics_password: analytics::PASSWORD.clone().map(SecretString::from),
        })
    }

    /// Public URL Telegram should push updates to, if a domain is configured.
    pub fn webhook_url(&self) -> Option<String> {
        self.app_domain.as_deref().map(webhook_url_for)
    }
}

/// Builds `https://<domain>/tg_webhooks`, tolerating a scheme or trailing slash.
pub fn webhook_url_for(domain: &str) -> String {
    let host = domain
        .trim()
        .trim_start_matches("https://")
        .trim_start_matches("http://")
        .trim_end_matches('/');
    format!("https://{}{}", host, webhook::PATH)
}

fn required(name: &'static str, value: &str) -> Result<SecretString, ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::Missing(name));
    }
    Ok(SecretString::from(value.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_webhook_url_for_plain_domain() {
        assert_eq!(webhook_url_for("bot.example.com"), "https://bot.example.com/tg_webhooks");
    }

    #[test]
    fn test_webhook_url_for_strips_scheme_and_slash() {
        assert_eq!(
            webhook_url_for("https://bot.example.com/"),
            "https://bot.example.com/tg_webhooks"
        );
        assert_eq!(webhook_url_for("http://bot.example.com"), "https://bot.example.com/tg_webhooks");
    }

    #[test]
    fn test_required_rejects_blank() {
        assert!(matches!(required("X", "  "), Err(ConfigError::Missing("X"))));
        assert!(required("X", "value").is_ok());
    }

    #[test]
    fn test_api_settings_need_no_database() {
        let api = ApiSettings::from_values("123:ABC", "key", weather::DEFAULT_API_URL).unwrap();
        assert_eq!(api.weather_api_url, "http://api.weatherapi.com/v1");

        assert!(matches!(
            ApiSettings::from_values("", "key", weather::DEFAULT_API_URL),
            Err(ConfigError::Missing("BOT_TOKEN"))
        ));
        assert!(matches!(
            ApiSettings::from_values("123:ABC", "key", "not a url"),
            Err(ConfigError::Invalid {
                name: "WEATHER_API_URL",
                ..
            })
        ));
    }

    #[test]
    fn test_chat_limits() {
        assert_eq!(chat::MIN_DAY_COUNT, 1);
        assert_eq!(chat::MAX_DAY_COUNT, 10);
        assert_eq!(chat::MAX_FORECAST_DAYS_AHEAD, 10);
    }
}
