use super::daily::{group_by_date, DatedReading};
use super::types::*;
use crate::condition::from_code;
use crate::config::Config;
use crate::utils::{celsius_to_fahrenheit, ms_to_kmh, round_whole, truncate_body};
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;
use tokio::time::sleep;

/// Hours kept per forecast day in the proxied payload.
const HOURS_PER_DAY: usize = 8;
const DEFAULT_VISIBILITY_KM: f64 = 10.0;

#[derive(Error, Debug)]
pub enum OpenWeatherError {
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),
    #[error("JSON parsing failed: {0}")]
    JsonParsing(#[from] serde_json::Error),
    #[error("Rate limited, retry after: {0}s")]
    RateLimited(u64),
    #[error("API error: {0}")]
    ApiError(String),
    #[error("Weather API key not configured")]
    MissingApiKey,
}

pub struct OpenWeatherClient {
    client: Client,
    config: Config,
}

impl OpenWeatherClient {
    pub fn new(config: Config) -> Result<Self, OpenWeatherError> {
        let client = Client::builder()
            .user_agent("SkyPulse/1.0")
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self { client, config })
    }

    fn api_key(&self) -> Result<&str, OpenWeatherError> {
        self.config
            .weather_api_key()
            .ok_or(OpenWeatherError::MissingApiKey)
    }

    pub async fn get_current(&self, city: &str) -> Result<CurrentResponse, OpenWeatherError> {
        let url = format!(
            "{}{}",
            self.config.openweather_base_url, self.config.openweather_current_path
        );

        let response = self
            .make_request_with_retry(&url, &[
                ("q", city),
                ("units", "metric"),
                ("appid", self.api_key()?),
            ])
            .await?;

        let current: CurrentResponse = serde_json::from_value(response)?;
        Ok(current)
    }

    pub async fn get_forecast(&self, city: &str) -> Result<Forecast3hResponse, OpenWeatherError> {
        let url = format!(
            "{}{}",
            self.config.openweather_base_url, self.config.openweather_forecast_path
        );

        let response = self
            .make_request_with_retry(&url, &[
                ("q", city),
                ("units", "metric"),
                ("appid", self.api_key()?),
            ])
            .await?;

        let forecast: Forecast3hResponse = serde_json::from_value(response)?;
        Ok(forecast)
    }

    /// Current conditions plus the 3-hour forecast, shaped as a proxy payload.
    /// Only the current-weather call is required to succeed.
    pub async fn fetch_payload(&self, city: &str) -> Result<WeatherPayload, OpenWeatherError> {
        let (current, forecast) = tokio::join!(self.get_current(city), self.get_forecast(city));
        let current = current?;

        let forecast = match forecast {
            Ok(forecast) => Some(forecast),
            Err(e) => {
                tracing::warn!("Forecast unavailable for {}: {}", city, e);
                None
            }
        };

        Ok(payload_from_openweather(&current, forecast.as_ref()))
    }

    async fn make_request_with_retry(
        &self,
        url: &str,
        params: &[(&str, &str)],
    ) -> Result<Value, OpenWeatherError> {
        let mut retry_count = 0;
        let max_retries = 3;
        let mut delay = Duration::from_millis(1000);

        loop {
            let response = self.client.get(url).query(params).send().await?;

            match response.status() {
                reqwest::StatusCode::OK => {
                    let json: Value = response.json().await?;
                    return Ok(json);
                }
                reqwest::StatusCode::TOO_MANY_REQUESTS => {
                    if retry_count >= max_retries {
                        return Err(OpenWeatherError::RateLimited(delay.as_secs()));
                    }

                    tracing::warn!(
                        "Rate limited by OpenWeather API, retrying in {}ms",
                        delay.as_millis()
                    );

                    sleep(delay).await;
                    delay = delay.mul_f32(2.0 + fastrand::f32() * 0.5);
                    retry_count += 1;
                }
                status => {
                    let error_text = response.text().await.unwrap_or_default();
                    return Err(OpenWeatherError::ApiError(format!(
                        "HTTP {}: {}",
                        status,
                        truncate_body(&error_text)
                    )));
                }
            }
        }
    }
}

fn icon_url(icon: &str, large: bool) -> String {
    if large {
        format!("https://openweathermap.org/img/wn/{}@2x.png", icon)
    } else {
        format!("https://openweathermap.org/img/wn/{}.png", icon)
    }
}

fn whole(value: f64) -> Option<f64> {
    Some(round_whole(value) as f64)
}

/// Build the proxy payload from OpenWeather responses. Codes are normalized
/// here so clients see condition names, with the raw code kept alongside.
pub fn payload_from_openweather(
    current: &CurrentResponse,
    forecast: Option<&Forecast3hResponse>,
) -> WeatherPayload {
    let descriptor = current.weather.first();
    let code = descriptor.map(|w| w.id);

    let condition = PayloadCondition {
        text: code.map(from_code).unwrap_or_default().as_str().to_string(),
        code,
        description: descriptor.map(|w| w.description.clone()),
        icon: descriptor.map(|w| icon_url(&w.icon, true)),
    };

    let current_block = PayloadCurrent {
        temp_c: whole(current.main.temp),
        temp_f: whole(celsius_to_fahrenheit(current.main.temp)),
        condition,
        feelslike_c: whole(current.main.feels_like),
        humidity: Some(current.main.humidity),
        wind_kph: whole(ms_to_kmh(current.wind.speed)),
        pressure_mb: Some(current.main.pressure),
        visibility: Some(
            current
                .visibility
                .map(|meters| meters / 1000.0)
                .unwrap_or(DEFAULT_VISIBILITY_KM),
        ),
        uv: None,
    };

    WeatherPayload {
        location: PayloadLocation {
            name: current.name.clone(),
            country: current.sys.country.clone().unwrap_or_default(),
            lat: Some(current.coord.lat),
            lon: Some(current.coord.lon),
        },
        current: current_block,
        forecast: PayloadForecast {
            forecastday: forecast.map(forecast_days).unwrap_or_default(),
        },
    }
}

fn forecast_days(forecast: &Forecast3hResponse) -> Vec<PayloadForecastDay> {
    let readings = forecast.list.iter().map(|item| {
        let (date, clock) = item
            .dt_txt
            .split_once(' ')
            .unwrap_or((item.dt_txt.as_str(), ""));
        let descriptor = item.weather.first();
        let code = descriptor.map(|w| w.id);
        let condition = code.map(from_code).unwrap_or_default();

        let hour = PayloadHour {
            time: clock.chars().take(5).collect(),
            temp_c: whole(item.main.temp),
            condition: PayloadCondition {
                text: condition.as_str().to_string(),
                code,
                description: None,
                icon: descriptor.map(|w| icon_url(&w.icon, false)),
            },
            humidity: Some(item.main.humidity),
            wind_kph: whole(ms_to_kmh(item.wind.speed)),
        };

        DatedReading::point(date, item.main.temp, condition, hour)
    });

    group_by_date(readings)
        .into_iter()
        .map(|group| {
            let icon = group
                .items
                .get(group.items.len() / 2)
                .and_then(|h| h.condition.icon.clone());

            PayloadForecastDay {
                date: group.date,
                day: PayloadDaySummary {
                    maxtemp_c: whole(group.high_c),
                    mintemp_c: whole(group.low_c),
                    condition: PayloadCondition {
                        text: group.condition.as_str().to_string(),
                        icon,
                        ..Default::default()
                    },
                },
                hour: group.items.into_iter().take(HOURS_PER_DAY).collect(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn current_fixture(id: u16) -> CurrentResponse {
        serde_json::from_value(json!({
            "name": "Tokyo",
            "coord": {"lat": 35.6895, "lon": 139.6917},
            "weather": [{"id": id, "main": "Clear", "description": "clear sky", "icon": "01d"}],
            "main": {"temp": 23.6, "feels_like": 24.2, "pressure": 1012.0, "humidity": 58.0},
            "wind": {"speed": 4.0},
            "visibility": 8000.0,
            "sys": {"country": "JP"}
        }))
        .unwrap()
    }

    fn item(dt_txt: &str, temp: f64, id: u16) -> Value {
        json!({
            "dt": 0,
            "main": {"temp": temp, "feels_like": temp, "pressure": 1010.0, "humidity": 70.0},
            "weather": [{"id": id, "main": "x", "description": "x", "icon": "10d"}],
            "wind": {"speed": 2.5},
            "dt_txt": dt_txt
        })
    }

    fn forecast_fixture(items: Vec<Value>) -> Forecast3hResponse {
        let count = items.len();
        serde_json::from_value(json!({
            "cod": "200",
            "cnt": count,
            "list": items,
            "city": {"name": "Tokyo", "coord": {"lat": 35.6895, "lon": 139.6917}, "country": "JP"}
        }))
        .unwrap()
    }

    #[test]
    fn test_current_block_conversion() {
        let payload = payload_from_openweather(&current_fixture(800), None);

        assert_eq!(payload.location.name, "Tokyo");
        assert_eq!(payload.location.country, "JP");
        assert_eq!(payload.current.temp_c, Some(24.0));
        assert_eq!(payload.current.temp_f, Some(74.0));
        assert_eq!(payload.current.wind_kph, Some(14.0));
        assert_eq!(payload.current.visibility, Some(8.0));
        assert_eq!(payload.current.condition.text, "Sunny");
        assert_eq!(payload.current.condition.code, Some(800));
        assert_eq!(
            payload.current.condition.icon.as_deref(),
            Some("https://openweathermap.org/img/wn/01d@2x.png")
        );
        assert!(payload.forecast.forecastday.is_empty());
    }

    #[test]
    fn test_forecast_grouped_by_date() {
        let forecast = forecast_fixture(vec![
            item("2024-05-01 18:00:00", 20.4, 500),
            item("2024-05-01 21:00:00", 17.6, 501),
            item("2024-05-02 00:00:00", 15.0, 800),
            item("2024-05-02 03:00:00", 16.0, 211),
            item("2024-05-02 06:00:00", 19.0, 800),
        ]);

        let payload = payload_from_openweather(&current_fixture(800), Some(&forecast));
        let days = &payload.forecast.forecastday;

        assert_eq!(days.len(), 2);
        assert_eq!(days[0].date, "2024-05-01");
        assert_eq!(days[0].day.maxtemp_c, Some(20.0));
        assert_eq!(days[0].day.mintemp_c, Some(18.0));
        assert_eq!(days[0].day.condition.text, "Rainy");
        assert_eq!(days[0].hour[0].time, "18:00");
        assert_eq!(days[0].hour[0].wind_kph, Some(9.0));

        assert_eq!(days[1].day.condition.text, "Sunny");
        assert_eq!(days[1].hour[1].condition.text, "Stormy");
    }

    #[test]
    fn test_forecast_keeps_eight_hours_per_day() {
        let items = (0..8)
            .map(|i| item(&format!("2024-05-01 {:02}:00:00", i * 3), 10.0, 803))
            .chain((0..2).map(|i| item(&format!("2024-05-02 {:02}:00:00", i * 3), 10.0, 803)))
            .collect();
        let forecast = forecast_fixture(items);

        let payload = payload_from_openweather(&current_fixture(801), Some(&forecast));

        assert_eq!(payload.forecast.forecastday[0].hour.len(), HOURS_PER_DAY);
        assert_eq!(payload.forecast.forecastday[1].hour.len(), 2);
        assert_eq!(payload.current.condition.text, "Cloudy");
    }

    #[test]
    fn test_freezing_rain_code() {
        let payload = payload_from_openweather(&current_fixture(511), None);
        assert_eq!(payload.current.condition.text, "Snowy");
    }
}
