//! Router tests for the SkyPulse proxy, run in generated-data mode.

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use skypulse::config::Config;
use skypulse::forecast::types::WeatherEnvelope;
use skypulse::routes::{create_router, AppState};
use skypulse::transform::transform;
use skypulse::Condition;

fn mock_router() -> Router {
    let config = Config {
        mock_seed: Some(2024),
        ..Config::default()
    };
    let state = AppState::new(config).expect("Failed to create app state");
    create_router(state)
}

async fn get_json(app: Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json: Value = serde_json::from_slice(&body).unwrap();
    (status, json)
}

#[tokio::test]
async fn test_health_reports_mock_mode() {
    let (status, body) = get_json(mock_router(), "/api/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "OK");
    assert_eq!(body["weatherAPI"], "Not configured");
}

#[tokio::test]
async fn test_weather_requires_city() {
    let (status, body) = get_json(mock_router(), "/api/weather").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "City parameter is required");

    let (status, _) = get_json(mock_router(), "/api/weather?city=%20%20").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_weather_returns_generated_payload() {
    let (status, body) = get_json(mock_router(), "/api/weather?city=Tokyo").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["source"], "mock");
    assert!(body.get("note").is_none());

    let envelope: WeatherEnvelope = serde_json::from_value(body).unwrap();
    let payload = envelope.data.expect("payload present");
    assert_eq!(payload.location.name, "Tokyo");
    assert_eq!(payload.forecast.forecastday.len(), 7);

    let snapshot = transform(&payload);
    assert_eq!(snapshot.city, "Tokyo");
    assert_eq!(snapshot.hourly.len(), 8);
    assert_eq!(snapshot.daily[0].label, "Today");
    assert!(Condition::ALL.contains(&snapshot.condition));
}

#[tokio::test]
async fn test_city_is_trimmed_not_rewritten() {
    let (status, body) = get_json(mock_router(), "/api/weather?city=%3Cb%3EParis%3C%2Fb%3E").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["location"]["name"], "<b>Paris</b>");

    let (status, body) = get_json(mock_router(), "/api/weather?city=%20%20Rio%20de%20Janeiro%20").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["location"]["name"], "Rio de Janeiro");
}

#[tokio::test]
async fn test_unknown_route_is_json_404() {
    let (status, body) = get_json(mock_router(), "/api/nope").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Not found");
}
