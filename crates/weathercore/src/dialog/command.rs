use indoc::formatdoc;
use std::str::FromStr;
use strum::{EnumIter, EnumMessage, EnumString, IntoEnumIterator, IntoStaticStr};

/// Bot commands, matched exactly and case-sensitively against the message text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumString, EnumIter, EnumMessage, IntoStaticStr)]
pub enum Command {
    #[strum(serialize = "/start", message = "start the bot")]
    Start,
    #[strum(serialize = "/help", message = "help")]
    Help,
    #[strum(serialize = "/change_city", message = "change city")]
    ChangeCity,
    #[strum(serialize = "/current_weather", message = "current weather")]
    CurrentWeather,
    #[strum(serialize = "/weather_forecast", message = "weather forecast for a specific date")]
    WeatherForecast,
    #[strum(serialize = "/forecast_for_several_days", message = "weather forecast for multiple days")]
    ForecastForSeveralDays,
    #[strum(serialize = "/weather_statistic", message = "weather statistics for the last 7 days")]
    WeatherStatistic,
    #[strum(serialize = "/prediction", message = "prediction for 3 days")]
    Prediction,
}

impl Command {
    pub fn parse(text: &str) -> Option<Self> {
        Self::from_str(text).ok()
    }

    /// The command as typed, e.g. `/help`.
    pub fn as_str(&self) -> &'static str {
        self.into()
    }

    /// The command without its slash, used as a metrics label.
    pub fn name(&self) -> &'static str {
        self.as_str().trim_start_matches('/')
    }

    pub fn description(&self) -> &'static str {
        self.get_message().unwrap_or_default()
    }

    /// Every command in menu order.
    pub fn all() -> impl Iterator<Item = Command> {
        Self::iter()
    }
}

/// `/<cmd> - <description>` for every command except `/start`.
pub fn help_text() -> String {
    Command::iter()
        .filter(|c| *c != Command::Start)
        .map(|c| format!("{} - {}", c.as_str(), c.description()))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn start_text(first_name: &str) -> String {
    formatdoc! {"
        Hello {first_name}! {intro}
        Here are the commands I know:
        {commands}
        or simply press the menu to display all commands",
        first_name = first_name,
        intro = INTRO,
        commands = help_text(),
    }
}

const INTRO: &str = "I am WeatherForecastBot, your personal assistant for getting an accurate weather forecast. \
    I can provide you with weather information for any city. Pick your city with /change_city \
    and I will tell you what to expect! Shall we begin?";
