use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Proxy payload, shared by the server and the dashboard client
// ---------------------------------------------------------------------------

/// Where a proxied payload came from. Consumers treat all three the same.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PayloadSource {
    Api,
    Mock,
    MockFallback,
}

impl PayloadSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            PayloadSource::Api => "api",
            PayloadSource::Mock => "mock",
            PayloadSource::MockFallback => "mock-fallback",
        }
    }
}

/// Response body of `GET /api/weather`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherEnvelope {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<WeatherPayload>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<chrono::DateTime<chrono::Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<PayloadSource>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WeatherPayload {
    #[serde(default)]
    pub location: PayloadLocation,
    #[serde(default)]
    pub current: PayloadCurrent,
    #[serde(default)]
    pub forecast: PayloadForecast,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PayloadLocation {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub country: String,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PayloadCondition {
    #[serde(default)]
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PayloadCurrent {
    pub temp_c: Option<f64>,
    pub temp_f: Option<f64>,
    #[serde(default)]
    pub condition: PayloadCondition,
    pub feelslike_c: Option<f64>,
    pub humidity: Option<f64>,
    pub wind_kph: Option<f64>,
    pub pressure_mb: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visibility: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uv: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PayloadForecast {
    #[serde(default)]
    pub forecastday: Vec<PayloadForecastDay>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PayloadForecastDay {
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub day: PayloadDaySummary,
    #[serde(default)]
    pub hour: Vec<PayloadHour>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PayloadDaySummary {
    pub maxtemp_c: Option<f64>,
    pub mintemp_c: Option<f64>,
    #[serde(default)]
    pub condition: PayloadCondition,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PayloadHour {
    #[serde(default)]
    pub time: String,
    pub temp_c: Option<f64>,
    #[serde(default)]
    pub condition: PayloadCondition,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub humidity: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wind_kph: Option<f64>,
}

// ---------------------------------------------------------------------------
// OpenWeather 2.5 responses
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentResponse {
    pub name: String,
    pub coord: Coord,
    pub weather: Vec<WeatherDescriptor>,
    pub main: MainReadings,
    pub wind: Wind,
    pub visibility: Option<f64>,
    pub sys: CurrentSys,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentSys {
    pub country: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Forecast3hResponse {
    pub cod: String,
    pub cnt: i32,
    pub list: Vec<Forecast3hItem>,
    pub city: Forecast3hCity,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Forecast3hItem {
    pub dt: i64,
    pub main: MainReadings,
    pub weather: Vec<WeatherDescriptor>,
    pub wind: Wind,
    pub dt_txt: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MainReadings {
    pub temp: f64,
    pub feels_like: f64,
    pub pressure: f64,
    pub humidity: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherDescriptor {
    pub id: u16,
    pub main: String,
    pub description: String,
    pub icon: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Wind {
    pub speed: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Forecast3hCity {
    pub name: String,
    pub coord: Coord,
    pub country: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Coord {
    pub lat: f64,
    pub lon: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_serializes_kebab_case() {
        let json = serde_json::to_string(&PayloadSource::MockFallback).unwrap();
        assert_eq!(json, "\"mock-fallback\"");
        let parsed: PayloadSource = serde_json::from_str("\"api\"").unwrap();
        assert_eq!(parsed, PayloadSource::Api);
    }

    #[test]
    fn test_sparse_payload_deserializes() {
        let payload: WeatherPayload =
            serde_json::from_str(r#"{"location":{"name":"Oslo"},"current":{}}"#).unwrap();
        assert_eq!(payload.location.name, "Oslo");
        assert!(payload.location.lat.is_none());
        assert!(payload.forecast.forecastday.is_empty());
    }
}
