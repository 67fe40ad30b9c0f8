use chrono::{Duration, Local, NaiveDate};
use std::sync::Arc;

use crate::core::config::chat::{DEFAULT_CITY, HISTORY_DAYS};
use crate::core::metrics;
use crate::dialog::command::{help_text, start_text, Command};
use crate::dialog::input::{max_forecast_date, parse_day_count, parse_forecast_date, InputError};
use crate::storage::{ChatState, ChatStore, CitySlot, PendingInput, Slot, StatisticEntry, StatisticStore};
use crate::weather::{format, prediction, WeatherError, WeatherProvider};

pub const UNKNOWN_COMMAND: &str = "Unknown command. Please try again\n/help";
pub const GENERIC_ERROR: &str = "An error occurred. Please try again later.";
pub const PREDICTION_ERROR: &str = "Error, please try again";
pub const CITY_PROMPT: &str = "Please enter the new city";
pub const CITY_ADDED: &str = "City added successfully. Select the next command.";
pub const DAY_COUNT_PROMPT: &str =
    "In this section, you can get the weather forecast for several days.\nEnter the number of days (from 1 to 10):";

/// One inbound text message, stripped of everything Telegram-specific.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Inbound {
    pub chat_id: i64,
    pub text: String,
    /// Sender's first name, used in the greeting and the statistics log
    pub first_name: String,
    /// Message time, unix seconds
    pub date: i64,
}

/// Routes a message to a prompt answer or a command and collects the replies.
///
/// A message never fails: every error ends up as a reply text. Replies are
/// returned in the order they should be sent.
#[derive(Clone)]
pub struct Dispatcher {
    chats: Arc<dyn ChatStore>,
    statistics: Arc<dyn StatisticStore>,
    weather: Arc<dyn WeatherProvider>,
}

impl Dispatcher {
    pub fn new(chats: Arc<dyn ChatStore>, statistics: Arc<dyn StatisticStore>, weather: Arc<dyn WeatherProvider>) -> Self {
        Self {
            chats,
            statistics,
            weather,
        }
    }

    /// Dispatches with today's local date.
    pub async fn dispatch(&self, msg: &Inbound) -> Vec<String> {
        self.dispatch_on(msg, Local::now().date_naive()).await
    }

    pub async fn dispatch_on(&self, msg: &Inbound, today: NaiveDate) -> Vec<String> {
        let mut state = match self.chats.ensure(msg.chat_id).await {
            Ok(state) => state,
            Err(e) => {
                log::error!("Chat {}: failed to load state: {}", msg.chat_id, e);
                metrics::inc(&metrics::INSTANCE_ERRORS);
                return vec![GENERIC_ERROR.to_string()];
            }
        };
        let before = state.clone();

        let replies = match state.pending() {
            Some(input) => {
                log::debug!("Chat {}: answer to pending {:?}", msg.chat_id, input);
                self.answer(input, &mut state, msg, today).await
            }
            None => match Command::parse(&msg.text) {
                Some(command) => {
                    log::info!("Chat {}: {}", msg.chat_id, command.as_str());
                    metrics::record_command(command.name());
                    self.record(command, msg).await;
                    self.run(command, &mut state, msg, today).await
                }
                None => {
                    log::debug!("Chat {}: unknown command {:?}", msg.chat_id, msg.text);
                    metrics::inc(&metrics::UNKNOWN_COMMANDS);
                    vec![UNKNOWN_COMMAND.to_string()]
                }
            },
        };

        if state != before {
            if let Err(e) = self.chats.save(&state).await {
                log::error!("Chat {}: failed to save state: {}", msg.chat_id, e);
                metrics::inc(&metrics::INSTANCE_ERRORS);
                return vec![GENERIC_ERROR.to_string()];
            }
        }

        replies
    }

    /// Best effort: a failed insert is logged and counted, never surfaced.
    async fn record(&self, command: Command, msg: &Inbound) {
        let entry = StatisticEntry::new(msg.date, msg.first_name.clone(), msg.chat_id, command.as_str());
        if let Err(e) = self.statistics.record(&entry).await {
            log::warn!("Chat {}: statistic not recorded: {}", msg.chat_id, e);
        }
    }

    async fn run(&self, command: Command, state: &mut ChatState, msg: &Inbound, today: NaiveDate) -> Vec<String> {
        let city = city_of(state);
        match command {
            Command::Start => {
                state.date_difference = Slot::Empty;
                state.qty_days = Slot::Empty;
                vec![start_text(&msg.first_name)]
            }
            Command::Help => vec![help_text()],
            Command::ChangeCity => {
                state.await_input(PendingInput::City);
                vec![CITY_PROMPT.to_string()]
            }
            Command::CurrentWeather => {
                let reply = match self.weather.forecast(&city, 1).await {
                    Ok(snapshot) => format::current_weather(&snapshot),
                    Err(e) => Err(e),
                };
                vec![reply.unwrap_or_else(|e| weather_failure("current_weather", &e))]
            }
            Command::WeatherForecast => {
                state.await_input(PendingInput::Date);
                vec![format!("Input the date from {} to {}:", today, max_forecast_date(today))]
            }
            Command::ForecastForSeveralDays => {
                state.await_input(PendingInput::DayCount);
                vec![DAY_COUNT_PROMPT.to_string()]
            }
            Command::WeatherStatistic => self.statistic(&city, today).await,
            Command::Prediction => match prediction::predict(self.weather.as_ref(), &city, today).await {
                Ok(Some(prediction)) => vec![prediction.message()],
                Ok(None) => {
                    log::warn!("Prediction for {}: no temperatures returned", city);
                    vec![PREDICTION_ERROR.to_string()]
                }
                Err(e) => {
                    log::error!("Prediction for {} failed: {}", city, e);
                    vec![PREDICTION_ERROR.to_string()]
                }
            },
        }
    }

    async fn answer(&self, input: PendingInput, state: &mut ChatState, msg: &Inbound, today: NaiveDate) -> Vec<String> {
        match input {
            PendingInput::City => self.answer_city(state, msg).await,
            PendingInput::Date => match parse_forecast_date(&msg.text, today) {
                Ok(date) => {
                    state.date_difference = Slot::Empty;
                    let city = city_of(state);
                    let reply = match self.weather.forecast(&city, date.days()).await {
                        Ok(snapshot) => snapshot
                            .day(date.index())
                            .map(|day| format::forecast_day(&snapshot.location, day))
                            .ok_or(WeatherError::MissingForecastDay(date.index())),
                        Err(e) => Err(e),
                    };
                    vec![reply.unwrap_or_else(|e| weather_failure("weather_forecast", &e))]
                }
                Err(e) => vec![rejected(msg.chat_id, &e)],
            },
            PendingInput::DayCount => match parse_day_count(&msg.text) {
                Ok(count) => {
                    state.qty_days = Slot::Empty;
                    let city = city_of(state);
                    match self.weather.forecast(&city, count + 1).await {
                        Ok(snapshot) => snapshot
                            .forecast
                            .forecastday
                            .iter()
                            .skip(1)
                            .take(count as usize)
                            .map(|day| format::forecast_day(&snapshot.location, day))
                            .collect(),
                        Err(e) => vec![weather_failure("forecast_for_several_days", &e)],
                    }
                }
                Err(e) => vec![rejected(msg.chat_id, &e)],
            },
        }
    }

    /// The city stays pending until the provider knows the name.
    async fn answer_city(&self, state: &mut ChatState, msg: &Inbound) -> Vec<String> {
        let candidate = msg.text.trim();
        if candidate.is_empty() {
            metrics::inc(&metrics::USER_ERRORS);
            return vec![WeatherError::LocationNotFound.user_message().to_string()];
        }

        match self.weather.current(candidate).await {
            Ok(_) => {
                log::info!("Chat {}: city set to {}", msg.chat_id, candidate);
                state.city = CitySlot::Named(candidate.to_string());
                vec![CITY_ADDED.to_string()]
            }
            Err(WeatherError::LocationNotFound) => {
                metrics::inc(&metrics::USER_ERRORS);
                vec![WeatherError::LocationNotFound.user_message().to_string()]
            }
            Err(e) => vec![weather_failure("change_city", &e)],
        }
    }

    async fn statistic(&self, city: &str, today: NaiveDate) -> Vec<String> {
        let mut replies = Vec::with_capacity(HISTORY_DAYS as usize);
        for days_back in 1..=HISTORY_DAYS {
            let reply = match self.weather.history(city, today - Duration::days(days_back)).await {
                Ok(snapshot) => snapshot
                    .day(0)
                    .map(|day| format::statistic_day(&snapshot.location, day))
                    .ok_or(WeatherError::MissingForecastDay(0)),
                Err(e) => Err(e),
            };
            match reply {
                Ok(text) => replies.push(text),
                Err(e) => {
                    replies.push(weather_failure("weather_statistic", &e));
                    break;
                }
            }
        }
        replies
    }
}

fn city_of(state: &ChatState) -> String {
    state.city_name().unwrap_or(DEFAULT_CITY.as_str()).to_string()
}

fn rejected(chat_id: i64, e: &InputError) -> String {
    log::debug!("Chat {}: input rejected: {}", chat_id, e);
    metrics::inc(&metrics::USER_ERRORS);
    e.to_string()
}

fn weather_failure(handler: &str, e: &WeatherError) -> String {
    match e {
        WeatherError::LocationNotFound => log::info!("{}: {}", handler, e),
        _ => log::error!("{}: {}", handler, e),
    }
    e.user_message().to_string()
}
