use thiserror::Error;

/// Provider error codes embedded in a 400 response body.
pub mod provider_code {
    pub const LOCATION_NOT_FOUND: i64 = 1006;
    pub const INTERNAL: i64 = 9999;
    pub const MALFORMED: [i64; 3] = [1003, 1005, 9000];
}

/// Failure of one weather API call.
///
/// The first group comes from the HTTP status (and, for 400, the provider
/// code in the body). `Transport` and `Schema` are kept apart so logs and
/// metrics can tell "could not talk to the provider" from "it answered
/// something we cannot read".
#[derive(Debug, Error)]
pub enum WeatherError {
    /// 400 / 1006
    #[error("location not found")]
    LocationNotFound,

    /// 400 / 9999
    #[error("provider temporarily unavailable")]
    ProviderUnavailable,

    /// 400 / 1003, 1005, 9000
    #[error("malformed request (provider code {0})")]
    MalformedRequest(i64),

    /// 400 with any other provider code
    #[error("provider rejected request (code {code}): {message}")]
    Other { code: i64, message: String },

    /// 401
    #[error("API key is invalid")]
    Unauthorized,

    /// 403
    #[error("API key quota exceeded or key disabled")]
    QuotaExceeded,

    /// 404, 500, 502
    #[error("weather service unavailable (HTTP {0})")]
    ServiceUnavailable(u16),

    /// Any other non-200 status
    #[error("unexpected HTTP status {0}")]
    UnexpectedStatus(u16),

    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("unexpected response payload: {0}")]
    Schema(#[from] serde_json::Error),

    #[error("invalid request URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The payload parsed but lacks the entry a handler asked for
    #[error("response is missing forecast day {0}")]
    MissingForecastDay(usize),

    #[error("response has no current conditions")]
    MissingCurrent,
}

impl WeatherError {
    /// Maps a non-200 status plus the (already decoded) provider error code.
    pub fn from_status(status: u16, provider: Option<(i64, String)>) -> Self {
        match status {
            400 => match provider {
                Some((provider_code::LOCATION_NOT_FOUND, _)) => WeatherError::LocationNotFound,
                Some((provider_code::INTERNAL, _)) => WeatherError::ProviderUnavailable,
                Some((code, _)) if provider_code::MALFORMED.contains(&code) => WeatherError::MalformedRequest(code),
                Some((code, message)) => WeatherError::Other { code, message },
                None => WeatherError::Other {
                    code: 0,
                    message: String::from("no provider error in body"),
                },
            },
            401 => WeatherError::Unauthorized,
            403 => WeatherError::QuotaExceeded,
            404 | 500 | 502 => WeatherError::ServiceUnavailable(status),
            other => WeatherError::UnexpectedStatus(other),
        }
    }

    /// Text sent to the chat for this error.
    pub fn user_message(&self) -> &'static str {
        match self {
            WeatherError::LocationNotFound => "City not found. Please try again",
            WeatherError::ProviderUnavailable => "The weather service is temporarily unavailable. Please try again later.",
            WeatherError::MalformedRequest(_) => "The request could not be processed. Please check your input.",
            WeatherError::Unauthorized => "The weather service rejected our API key. Please try again later.",
            WeatherError::QuotaExceeded => "The weather service limit is exhausted. Please try again later.",
            WeatherError::ServiceUnavailable(_) => "The weather service is not responding. Please try again later.",
            WeatherError::Other { .. }
            | WeatherError::UnexpectedStatus(_)
            | WeatherError::Transport(_)
            | WeatherError::Schema(_)
            | WeatherError::InvalidUrl(_)
            | WeatherError::MissingForecastDay(_)
            | WeatherError::MissingCurrent => "An error occurred. Please try again later.",
        }
    }
}
