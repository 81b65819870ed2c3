//! Dashboard-side client for the proxy's `/api/weather` endpoint.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use thiserror::Error;

use crate::forecast::types::{WeatherEnvelope, WeatherPayload};
use crate::utils::truncate_body;

#[derive(Error, Debug)]
pub enum UpstreamError {
    #[error("Weather request failed: {0}")]
    Transport(String),

    #[error("Weather service returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Weather service rejected the request: {0}")]
    Rejected(String),

    #[error("Malformed weather response: {0}")]
    Malformed(String),
}

impl From<reqwest::Error> for UpstreamError {
    fn from(err: reqwest::Error) -> Self {
        UpstreamError::Transport(err.to_string())
    }
}

/// Anything that can produce a raw weather payload for a city.
#[async_trait]
pub trait WeatherSource: Send + Sync {
    async fn fetch(&self, city: &str) -> Result<WeatherPayload, UpstreamError>;
}

#[derive(Debug, Clone)]
pub struct HttpWeatherSource {
    http: Client,
    base_url: String,
}

impl HttpWeatherSource {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn weather_url(&self, city: &str) -> String {
        format!(
            "{}/api/weather?city={}",
            self.base_url,
            urlencoding::encode(city)
        )
    }
}

#[async_trait]
impl WeatherSource for HttpWeatherSource {
    async fn fetch(&self, city: &str) -> Result<WeatherPayload, UpstreamError> {
        let url = self.weather_url(city);
        tracing::debug!("Fetching weather from {}", url);

        let response = self.http.get(&url).send().await?;
        let status = response.status();
        let body = response.text().await?;

        payload_from_envelope(status, &body)
    }
}

/// Validate a proxy response and pull out its payload.
pub fn payload_from_envelope(status: StatusCode, body: &str) -> Result<WeatherPayload, UpstreamError> {
    if !status.is_success() {
        return Err(UpstreamError::Status {
            status: status.as_u16(),
            body: truncate_body(body),
        });
    }

    let envelope: WeatherEnvelope =
        serde_json::from_str(body).map_err(|e| UpstreamError::Malformed(e.to_string()))?;

    if !envelope.success {
        return Err(UpstreamError::Rejected(
            envelope
                .error
                .unwrap_or_else(|| "Failed to fetch weather data".to_string()),
        ));
    }

    if let Some(note) = envelope.note.as_deref() {
        tracing::info!("Weather service note: {}", note);
    }

    envelope
        .data
        .ok_or_else(|| UpstreamError::Malformed("response has no data".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_encodes_city() {
        let source = HttpWeatherSource::new("http://localhost:3000/");
        assert_eq!(
            source.weather_url("São Paulo"),
            "http://localhost:3000/api/weather?city=S%C3%A3o%20Paulo"
        );
    }

    #[test]
    fn test_success_envelope() {
        let body = r#"{
            "success": true,
            "source": "mock",
            "data": {
                "location": {"name": "Tokyo", "country": "JP", "lat": 35.68, "lon": 139.65},
                "current": {"temp_c": 24.0, "condition": {"text": "Clear", "code": 800}},
                "forecast": {"forecastday": []}
            }
        }"#;

        let payload = payload_from_envelope(StatusCode::OK, body).unwrap();
        assert_eq!(payload.location.name, "Tokyo");
        assert_eq!(payload.current.condition.code, Some(800));
    }

    #[test]
    fn test_rejected_envelope() {
        let body = r#"{"success": false, "error": "City not found"}"#;
        let err = payload_from_envelope(StatusCode::OK, body).unwrap_err();
        assert!(matches!(err, UpstreamError::Rejected(ref m) if m == "City not found"));
    }

    #[test]
    fn test_http_error_status() {
        let err = payload_from_envelope(StatusCode::BAD_REQUEST, "{}").unwrap_err();
        assert!(matches!(err, UpstreamError::Status { status: 400, .. }));
    }

    #[test]
    fn test_malformed_bodies() {
        assert!(matches!(
            payload_from_envelope(StatusCode::OK, "<html>").unwrap_err(),
            UpstreamError::Malformed(_)
        ));
        assert!(matches!(
            payload_from_envelope(StatusCode::OK, r#"{"success": true}"#).unwrap_err(),
            UpstreamError::Malformed(_)
        ));
    }
}
