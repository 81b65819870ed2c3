use chrono::{DateTime, Utc};
use serde::Serialize;

/// Validate latitude and longitude coordinates
pub fn validate_coordinates(lat: f64, lon: f64) -> Result<(), String> {
    if !(-90.0..=90.0).contains(&lat) {
        return Err(format!("Invalid latitude: {}. Must be between -90 and 90", lat));
    }
    if !(-180.0..=180.0).contains(&lon) {
        return Err(format!("Invalid longitude: {}. Must be between -180 and 180", lon));
    }
    Ok(())
}

/// Convert temperature between Celsius and Fahrenheit
pub fn celsius_to_fahrenheit(celsius: f64) -> f64 {
    celsius * 9.0 / 5.0 + 32.0
}

/// Convert wind speed from m/s to km/h
pub fn ms_to_kmh(ms: f64) -> f64 {
    ms * 3.6
}

/// Round a reading to the nearest whole unit for display
pub fn round_whole(value: f64) -> i64 {
    if value.is_finite() {
        value.round() as i64
    } else {
        0
    }
}

/// Trim user input and cap its length; the text itself is left as typed.
pub fn sanitize_string(input: &str, max_length: usize) -> String {
    input.trim().chars().take(max_length).collect::<String>().trim_end().to_string()
}

/// Shorten an upstream body before it lands in an error message
pub fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.chars().count() > MAX {
        format!("{}...", body.chars().take(MAX).collect::<String>())
    } else {
        body.to_string()
    }
}

/// Error response helper
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ErrorResponse {
    pub fn new(error: &str) -> Self {
        Self {
            success: false,
            error: error.to_string(),
            timestamp: Utc::now(),
            message: None,
        }
    }

    pub fn with_message(mut self, message: String) -> Self {
        self.message = Some(message);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_coordinates() {
        assert!(validate_coordinates(0.0, 0.0).is_ok());
        assert!(validate_coordinates(90.0, 180.0).is_ok());
        assert!(validate_coordinates(-90.0, -180.0).is_ok());
        assert!(validate_coordinates(91.0, 0.0).is_err());
        assert!(validate_coordinates(0.0, 181.0).is_err());
        assert!(validate_coordinates(f64::NAN, 0.0).is_err());
    }

    #[test]
    fn test_unit_conversion() {
        assert!((celsius_to_fahrenheit(0.0) - 32.0).abs() < 0.01);
        assert!((celsius_to_fahrenheit(100.0) - 212.0).abs() < 0.01);
        assert!((ms_to_kmh(10.0) - 36.0).abs() < 0.01);
    }

    #[test]
    fn test_round_whole() {
        assert_eq!(round_whole(21.5), 22);
        assert_eq!(round_whole(-0.4), 0);
        assert_eq!(round_whole(f64::NAN), 0);
    }

    #[test]
    fn test_sanitize_string() {
        assert_eq!(sanitize_string("  São Paulo ", 20), "São Paulo");
        assert_eq!(sanitize_string("<b>Paris</b>", 40), "<b>Paris</b>");
        assert_eq!(sanitize_string("St. John's", 40), "St. John's");
        assert_eq!(sanitize_string("Very long city name", 10), "Very long");
    }

    #[test]
    fn test_truncate_body() {
        assert_eq!(truncate_body("short"), "short");
        let long = "x".repeat(300);
        assert_eq!(truncate_body(&long).len(), 203);
    }
}
