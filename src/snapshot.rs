use serde::{Deserialize, Serialize};

use crate::condition::Condition;

pub const MAX_HOURLY_POINTS: usize = 8;
pub const MAX_DAILY_POINTS: usize = 7;
pub const TODAY_LABEL: &str = "Today";

/// One fully-resolved weather reading, immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    pub city: String,
    pub country: String,
    pub lat: f64,
    pub lon: f64,
    pub temperature_c: f64,
    pub condition: Condition,
    pub feels_like_c: f64,
    pub humidity_pct: u8,
    pub wind_kph: f64,
    pub pressure_mb: f64,
    pub hourly: Vec<HourPoint>,
    pub daily: Vec<DayPoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HourPoint {
    /// Always formatted as `HH:MM`.
    pub time: String,
    pub temp_c: f64,
    pub condition: Condition,
    pub humidity_pct: u8,
    pub wind_kph: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayPoint {
    pub label: String,
    pub high_c: f64,
    pub low_c: f64,
    pub condition: Condition,
}

/// Clamp an upstream humidity reading into a whole percentage.
pub fn humidity_pct(raw: f64) -> u8 {
    if raw.is_nan() {
        return 0;
    }
    raw.round().clamp(0.0, 100.0) as u8
}

/// Wind speeds are never negative once inside a snapshot.
pub fn wind_kph(raw: f64) -> f64 {
    if raw.is_nan() {
        0.0
    } else {
        raw.max(0.0)
    }
}
