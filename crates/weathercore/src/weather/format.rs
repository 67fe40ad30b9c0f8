//! Reply texts built from weather snapshots.

use indoc::formatdoc;

use crate::weather::models::{ForecastDay, Location, WeatherSnapshot};
use crate::weather::WeatherError;

/// km/h to m/s, rounded to whole metres per second.
pub fn kph_to_ms(kph: f64) -> i64 {
    (kph / 3.6).round() as i64
}

/// Spells out a 16-point compass abbreviation as a wind name.
pub fn wind_direction_name(abbreviation: &str) -> Option<&'static str> {
    let name = match abbreviation {
        "N" => "northerly",
        "NNE" => "north-northeasterly",
        "NE" => "northeasterly",
        "ENE" => "east-northeasterly",
        "E" => "easterly",
        "ESE" => "east-southeasterly",
        "SE" => "southeasterly",
        "SSE" => "south-southeasterly",
        "S" => "southerly",
        "SSW" => "south-southwesterly",
        "SW" => "southwesterly",
        "WSW" => "west-southwesterly",
        "W" => "westerly",
        "WNW" => "west-northwesterly",
        "NW" => "northwesterly",
        "NNW" => "north-northwesterly",
        _ => return None,
    };
    Some(name)
}

/// Wind line of the current-weather reply.
pub fn wind(direction: &str, wind_kph: f64, max_wind_kph: f64) -> String {
    match wind_direction_name(direction) {
        Some(name) => format!(
            "Wind {} {} m/s (with maximum wind speed of {} m/s)",
            name,
            kph_to_ms(wind_kph),
            kph_to_ms(max_wind_kph)
        ),
        None => {
            log::debug!("Wind direction is unknown: {}", direction);
            "Wind direction is unknown.".to_string()
        }
    }
}

/// Reply to `/current_weather`; needs the `current` block and today's forecast.
pub fn current_weather(snapshot: &WeatherSnapshot) -> Result<String, WeatherError> {
    let today = snapshot.day(0).ok_or(WeatherError::MissingForecastDay(0))?;
    let current = snapshot.current.as_ref().ok_or(WeatherError::MissingCurrent)?;
    let location = &snapshot.location;

    Ok(formatdoc! {"
        {name} ({region}): {localtime}
        Temperature: {temp}°C (feels like {feels}°C)
        Maximum temperature: {max}°C
        Minimum temperature: {min}°C
        {wind}
        Humidity: {humidity}%
        Precipitation: {precipitation}%
        {condition}",
        name = location.name,
        region = location.region,
        localtime = location.localtime,
        temp = current.temp_c,
        feels = current.feelslike_c,
        max = today.day.maxtemp_c,
        min = today.day.mintemp_c,
        wind = wind(&current.wind_dir, current.wind_kph, today.day.maxwind_kph),
        humidity = current.humidity,
        precipitation = today.day.precipitation_chance(current.temp_c),
        condition = today.day.condition.text,
    })
}

/// One forecast day, used by `/weather_forecast` and `/forecast_for_several_days`.
pub fn forecast_day(location: &Location, forecast: &ForecastDay) -> String {
    let day = &forecast.day;
    formatdoc! {"
        {name} ({region}): {date}
        Maximum temperature: {max}°C
        Minimum temperature: {min}°C
        Wind up to {wind} m/s
        Humidity: {humidity}%
        Precipitation probability: {precipitation}%
        {condition}",
        name = location.name,
        region = location.region,
        date = forecast.date,
        max = day.maxtemp_c,
        min = day.mintemp_c,
        wind = kph_to_ms(day.maxwind_kph),
        humidity = day.avghumidity,
        precipitation = day.precipitation_chance(day.avgtemp_c),
        condition = day.condition.text,
    }
}

/// One past day of `/weather_statistic`.
pub fn statistic_day(location: &Location, forecast: &ForecastDay) -> String {
    format!(
        "{} ({}): {}\nTemperature: Max: {}°C, Min: {}°C, {}",
        location.name, location.region, forecast.date, forecast.day.maxtemp_c, forecast.day.mintemp_c, forecast.day.condition.text
    )
}
