use chrono::{Datelike, NaiveDate, NaiveTime, Weekday};

use crate::condition::{self, Condition, RawCondition};
use crate::forecast::daily::{group_by_date, DatedReading};
use crate::forecast::types::{PayloadCondition, PayloadForecastDay, WeatherPayload};
use crate::snapshot::{
    humidity_pct, wind_kph, DayPoint, HourPoint, WeatherSnapshot, MAX_DAILY_POINTS,
    MAX_HOURLY_POINTS, TODAY_LABEL,
};
use crate::utils::validate_coordinates;

pub const DEFAULT_CITY: &str = "Unknown City";
// New York, the dashboard's default location.
pub const DEFAULT_LAT: f64 = 40.7128;
pub const DEFAULT_LON: f64 = -74.0060;
pub const STANDARD_PRESSURE_MB: f64 = 1013.0;

/// Convert an upstream payload into a snapshot. Never fails: absent fields
/// fall back to defaults and an absent forecast yields empty series.
pub fn transform(payload: &WeatherPayload) -> WeatherSnapshot {
    let location = &payload.location;
    let current = &payload.current;

    let (lat, lon) = match (location.lat, location.lon) {
        (Some(lat), Some(lon)) if validate_coordinates(lat, lon).is_ok() => (lat, lon),
        _ => (DEFAULT_LAT, DEFAULT_LON),
    };

    let city = if location.name.trim().is_empty() {
        DEFAULT_CITY.to_string()
    } else {
        location.name.trim().to_string()
    };

    let temperature_c = current.temp_c.unwrap_or(0.0);

    WeatherSnapshot {
        city,
        country: location.country.clone(),
        lat,
        lon,
        temperature_c,
        condition: normalize_condition(&current.condition),
        feels_like_c: current.feelslike_c.unwrap_or(temperature_c),
        humidity_pct: humidity_pct(current.humidity.unwrap_or(0.0)),
        wind_kph: wind_kph(current.wind_kph.unwrap_or(0.0)),
        pressure_mb: current.pressure_mb.unwrap_or(STANDARD_PRESSURE_MB),
        hourly: extract_hourly(&payload.forecast.forecastday),
        daily: extract_daily(&payload.forecast.forecastday),
    }
}

/// Numeric codes are preferred over text when the upstream supplies both.
pub fn normalize_condition(raw: &PayloadCondition) -> Condition {
    match raw.code {
        Some(code) => condition::normalize(RawCondition::Code(code)),
        None => condition::normalize(RawCondition::Text(&raw.text)),
    }
}

/// Hourly points come from the first forecast day only.
fn extract_hourly(days: &[PayloadForecastDay]) -> Vec<HourPoint> {
    let Some(today) = days.first() else {
        return Vec::new();
    };

    today
        .hour
        .iter()
        .take(MAX_HOURLY_POINTS)
        .map(|hour| HourPoint {
            time: clock_label(&hour.time),
            temp_c: hour.temp_c.unwrap_or(0.0),
            condition: normalize_condition(&hour.condition),
            humidity_pct: humidity_pct(hour.humidity.unwrap_or(0.0)),
            wind_kph: wind_kph(hour.wind_kph.unwrap_or(0.0)),
        })
        .collect()
}

fn extract_daily(days: &[PayloadForecastDay]) -> Vec<DayPoint> {
    let mut readings = Vec::new();

    for day in days {
        let summary = &day.day;
        let has_hours = !day.hour.is_empty();

        for hour in &day.hour {
            if let Some(temp_c) = hour.temp_c {
                readings.push(DatedReading::point(
                    day.date.clone(),
                    temp_c,
                    normalize_condition(&hour.condition),
                    (),
                ));
            } else {
                readings.push(DatedReading {
                    date: day.date.clone(),
                    high_c: f64::NAN,
                    low_c: f64::NAN,
                    condition: Some(normalize_condition(&hour.condition)),
                    item: (),
                });
            }
        }

        // The summary only votes when there are no hours to vote.
        readings.push(DatedReading {
            date: day.date.clone(),
            high_c: summary.maxtemp_c.unwrap_or(f64::NAN),
            low_c: summary.mintemp_c.unwrap_or(f64::NAN),
            condition: (!has_hours).then(|| normalize_condition(&summary.condition)),
            item: (),
        });
    }

    group_by_date(readings)
        .into_iter()
        .take(MAX_DAILY_POINTS)
        .enumerate()
        .map(|(index, group)| DayPoint {
            label: if index == 0 {
                TODAY_LABEL.to_string()
            } else {
                day_label(&group.date)
            },
            high_c: group.high_c,
            low_c: group.low_c,
            condition: group.condition,
        })
        .collect()
}

/// Normalize `2024-05-01 09:00:00`, `09:00` or `9:00` to `HH:MM`.
pub fn clock_label(raw: &str) -> String {
    let time_part = raw.trim().rsplit(' ').next().unwrap_or_default();

    NaiveTime::parse_from_str(time_part, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(time_part, "%H:%M"))
        .map(|t| t.format("%H:%M").to_string())
        .unwrap_or_else(|_| time_part.chars().take(5).collect())
}

/// Weekday abbreviation for an ISO date; unparsable dates are shown as-is.
pub fn day_label(date: &str) -> String {
    match NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d") {
        Ok(date) => weekday_abbrev(date.weekday()).to_string(),
        Err(_) => date.to_string(),
    }
}

fn weekday_abbrev(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Mon",
        Weekday::Tue => "Tue",
        Weekday::Wed => "Wed",
        Weekday::Thu => "Thu",
        Weekday::Fri => "Fri",
        Weekday::Sat => "Sat",
        Weekday::Sun => "Sun",
    }
}
