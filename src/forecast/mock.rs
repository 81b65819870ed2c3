use std::sync::Mutex;

use chrono::{Duration, NaiveDate, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::types::*;
use crate::condition::Condition;
use crate::snapshot::WeatherSnapshot;
use crate::transform::{transform, DEFAULT_CITY, DEFAULT_LAT, DEFAULT_LON};
use crate::utils::{celsius_to_fahrenheit, round_whole};

const MOCK_DAYS: i64 = 7;
const MOCK_HOURS: u32 = 24;
const FORECAST_CONDITIONS: [Condition; 3] = [Condition::Sunny, Condition::Cloudy, Condition::Rainy];

// (name, country, lat, lon)
const KNOWN_CITIES: &[(&str, &str, f64, f64)] = &[
    ("New York", "US", 40.7128, -74.0060),
    ("London", "GB", 51.5074, -0.1278),
    ("Tokyo", "JP", 35.6762, 139.6503),
    ("Sydney", "AU", -33.8688, 151.2093),
    ("Dubai", "AE", 25.2048, 55.2708),
    ("Moscow", "RU", 55.7558, 37.6173),
    ("Paris", "FR", 48.8566, 2.3522),
    ("Berlin", "DE", 52.5200, 13.4050),
    ("Rome", "IT", 41.9028, 12.4964),
    ("Madrid", "ES", 40.4168, -3.7038),
    ("Cairo", "EG", 30.0444, 31.2357),
    ("Mumbai", "IN", 19.0760, 72.8777),
    ("Singapore", "SG", 1.3521, 103.8198),
    ("Bangkok", "TH", 13.7563, 100.5018),
    ("Toronto", "CA", 43.6532, -79.3832),
    ("Los Angeles", "US", 34.0522, -118.2437),
    ("Rio de Janeiro", "BR", -22.9068, -43.1729),
];

/// Country code and coordinates for a city name, ignoring case.
pub fn known_location(city: &str) -> Option<(&'static str, f64, f64)> {
    let wanted = city.trim().to_lowercase();
    KNOWN_CITIES
        .iter()
        .find(|(name, ..)| name.to_lowercase() == wanted)
        .map(|(_, country, lat, lon)| (*country, *lat, *lon))
}

fn text_condition(condition: Condition) -> PayloadCondition {
    PayloadCondition {
        text: condition.as_str().to_string(),
        ..Default::default()
    }
}

fn pick<R: Rng>(rng: &mut R, choices: &[Condition]) -> Condition {
    choices[rng.gen_range(0..choices.len())]
}

/// Build a plausible payload for `city`: 7 days of 24 hourly readings.
pub fn generate_payload<R: Rng>(city: &str, rng: &mut R, today: NaiveDate) -> WeatherPayload {
    let name = match city.trim() {
        "" => DEFAULT_CITY.to_string(),
        trimmed => trimmed.to_string(),
    };
    let (country, lat, lon) = known_location(&name).unwrap_or(("US", DEFAULT_LAT, DEFAULT_LON));

    let condition = pick(rng, &Condition::ALL);
    let base_temp: f64 = rng.gen_range(15.0..35.0);

    let current = PayloadCurrent {
        temp_c: Some(round_whole(base_temp) as f64),
        temp_f: Some(round_whole(celsius_to_fahrenheit(base_temp)) as f64),
        condition: PayloadCondition {
            text: condition.as_str().to_string(),
            icon: Some(condition.glyph().to_string()),
            ..Default::default()
        },
        feelslike_c: Some(round_whole(base_temp + rng.gen_range(-2.0..2.0)) as f64),
        humidity: Some(round_whole(rng.gen_range(30.0..90.0)) as f64),
        wind_kph: Some(round_whole(rng.gen_range(5.0..30.0)) as f64),
        pressure_mb: Some(round_whole(rng.gen_range(1000.0..1030.0)) as f64),
        visibility: None,
        uv: Some(round_whole(rng.gen_range(0.0..10.0)) as f64),
    };

    let forecastday = (0..MOCK_DAYS)
        .map(|offset| {
            let date = today + Duration::days(offset);
            let day = PayloadDaySummary {
                maxtemp_c: Some(round_whole(rng.gen_range(20.0..35.0)) as f64),
                mintemp_c: Some(round_whole(rng.gen_range(10.0..20.0)) as f64),
                condition: text_condition(pick(rng, &FORECAST_CONDITIONS)),
            };
            let hour = (0..MOCK_HOURS)
                .map(|h| PayloadHour {
                    time: format!("{:02}:00", h),
                    temp_c: Some(round_whole(rng.gen_range(15.0..25.0)) as f64),
                    condition: text_condition(pick(rng, &FORECAST_CONDITIONS)),
                    humidity: None,
                    wind_kph: None,
                })
                .collect();

            PayloadForecastDay {
                date: date.format("%Y-%m-%d").to_string(),
                day,
                hour,
            }
        })
        .collect();

    WeatherPayload {
        location: PayloadLocation {
            name,
            country: country.to_string(),
            lat: Some(lat),
            lon: Some(lon),
        },
        current,
        forecast: PayloadForecast { forecastday },
    }
}

/// Snapshot shown when the real fetch fails.
pub fn fallback_snapshot<R: Rng>(city: &str, rng: &mut R, today: NaiveDate) -> WeatherSnapshot {
    transform(&generate_payload(city, rng, today))
}

/// Server-side mock source, seeded once at startup.
pub struct MockWeatherClient {
    rng: Mutex<StdRng>,
}

impl MockWeatherClient {
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self { rng: Mutex::new(rng) }
    }

    pub fn payload_for(&self, city: &str) -> WeatherPayload {
        let today = Utc::now().date_naive();
        match self.rng.lock() {
            Ok(mut rng) => generate_payload(city, &mut *rng, today),
            // A poisoned lock only means another request panicked mid-draw.
            Err(poisoned) => generate_payload(city, &mut *poisoned.into_inner(), today),
        }
    }
}
