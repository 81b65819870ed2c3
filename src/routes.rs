use axum::{
    extract::{Query, State},
    http::{StatusCode, Uri},
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::{
    config::Config,
    forecast::{
        cache_key, init_cache,
        mock::MockWeatherClient,
        openweather::{OpenWeatherClient, OpenWeatherError},
        types::{PayloadSource, WeatherEnvelope, WeatherPayload},
        PayloadCache,
    },
    utils::{sanitize_string, ErrorResponse},
};

const MAX_CITY_LENGTH: usize = 100;
pub const FALLBACK_NOTE: &str = "Using fallback data";

// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub weather_client: Option<Arc<OpenWeatherClient>>,
    pub mock: Arc<MockWeatherClient>,
    pub cache: PayloadCache,
}

impl AppState {
    /// Without a usable API key the state serves generated data only.
    pub fn new(config: Config) -> Result<Self, OpenWeatherError> {
        let weather_client = if config.has_weather_api() {
            Some(Arc::new(OpenWeatherClient::new(config.clone())?))
        } else {
            None
        };

        Ok(Self {
            cache: init_cache(config.cache_ttl_secs),
            mock: Arc::new(MockWeatherClient::new(config.mock_seed)),
            weather_client,
            config: Arc::new(config),
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct WeatherQuery {
    pub city: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub message: String,
    #[serde(rename = "weatherAPI")]
    pub weather_api: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub version: String,
}

pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let weather_api = if state.config.has_weather_api() {
        "Configured"
    } else {
        "Not configured"
    };

    Json(HealthResponse {
        status: "OK".to_string(),
        message: "SkyPulse server is running".to_string(),
        weather_api: weather_api.to_string(),
        timestamp: chrono::Utc::now(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

pub async fn get_weather(
    State(state): State<AppState>,
    Query(params): Query<WeatherQuery>,
) -> Response {
    let city = params
        .city
        .as_deref()
        .map(|raw| sanitize_string(raw, MAX_CITY_LENGTH))
        .unwrap_or_default();

    if city.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::new("City parameter is required")),
        )
            .into_response();
    }

    tracing::info!("Fetching weather for: {}", city);

    let (payload, source) = resolve_payload(&state, &city).await;
    let note = (source == PayloadSource::MockFallback).then(|| FALLBACK_NOTE.to_string());
    tracing::debug!("Serving {} data for {}", source.as_str(), city);

    Json(WeatherEnvelope {
        success: true,
        data: Some(payload),
        timestamp: Some(chrono::Utc::now()),
        source: Some(source),
        error: None,
        note,
    })
    .into_response()
}

async fn resolve_payload(state: &AppState, city: &str) -> (WeatherPayload, PayloadSource) {
    let Some(client) = state.weather_client.as_ref() else {
        tracing::debug!("Weather API not configured; generating data for {}", city);
        return (state.mock.payload_for(city), PayloadSource::Mock);
    };

    let key = cache_key(city);
    if let Some(cached) = state.cache.get(&key).await {
        tracing::debug!("Cache hit for {}", key);
        return (cached, PayloadSource::Api);
    }

    match client.fetch_payload(city).await {
        Ok(payload) => {
            state.cache.insert(key, payload.clone()).await;
            tracing::info!("Real weather data fetched for {}", city);
            (payload, PayloadSource::Api)
        }
        Err(e) => {
            tracing::warn!("Weather API failed for {}, using generated data: {}", city, e);
            (state.mock.payload_for(city), PayloadSource::MockFallback)
        }
    }
}

pub async fn not_found(uri: Uri) -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse::new("Not found").with_message(format!("No route for {}", uri.path()))),
    )
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/weather", get(get_weather))
        .fallback(not_found)
        .with_state(state)
}
