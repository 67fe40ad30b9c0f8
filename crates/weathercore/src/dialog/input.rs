//! Validation of answers to the date and day-count prompts.

use chrono::{Duration, NaiveDate};
use thiserror::Error;

use crate::core::config::chat::{MAX_DAY_COUNT, MAX_FORECAST_DAYS_AHEAD, MIN_DAY_COUNT};

/// Rejected prompt answer. The display text is the reply sent to the chat.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    #[error("Date must be in the format YYYY-MM-DD.")]
    MalformedDate,

    #[error("The entered date must be no later than {max}.")]
    DateTooLate { max: NaiveDate },

    #[error("The entered date must be no earlier than {today}.")]
    DateInPast { today: NaiveDate },

    #[error("Invalid input format")]
    NotANumber,

    #[error("Number of days must be from {} to {}", MIN_DAY_COUNT, MAX_DAY_COUNT)]
    DayCountOutOfRange,
}

/// An accepted `/weather_forecast` date.
///
/// `offset` is the day difference plus two: the provider counts `days`
/// from today inclusive, and the wanted day sits at index `offset - 2`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ForecastDate {
    pub date: NaiveDate,
    pub offset: i64,
}

impl ForecastDate {
    /// `days` parameter of the forecast request.
    pub fn days(&self) -> u32 {
        self.offset as u32
    }

    /// Index of the wanted day in the forecast response.
    pub fn index(&self) -> usize {
        (self.offset - 2) as usize
    }
}

/// Last date `/weather_forecast` accepts.
pub fn max_forecast_date(today: NaiveDate) -> NaiveDate {
    today + Duration::days(MAX_FORECAST_DAYS_AHEAD)
}

pub fn parse_forecast_date(input: &str, today: NaiveDate) -> Result<ForecastDate, InputError> {
    let date = NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d").map_err(|_| InputError::MalformedDate)?;
    let difference = (date - today).num_days();

    if difference > MAX_FORECAST_DAYS_AHEAD {
        return Err(InputError::DateTooLate {
            max: max_forecast_date(today),
        });
    }
    if difference < 0 {
        return Err(InputError::DateInPast { today });
    }

    Ok(ForecastDate {
        date,
        offset: difference + 2,
    })
}

pub fn parse_day_count(input: &str) -> Result<u32, InputError> {
    let count: i64 = input.trim().parse().map_err(|_| InputError::NotANumber)?;
    if !(i64::from(MIN_DAY_COUNT)..=i64::from(MAX_DAY_COUNT)).contains(&count) {
        return Err(InputError::DayCountOutOfRange);
    }
    Ok(count as u32)
}
