use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

/// Value shipped in the sample `.env`; treated the same as no key at all.
pub const PLACEHOLDER_API_KEY: &str = "your_actual_api_key_here";

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    pub openweather_api_key: Option<String>,
    pub openweather_base_url: String,
    pub openweather_current_path: String,
    pub openweather_forecast_path: String,
    pub host: String,
    pub port: u16,
    pub cache_ttl_secs: u64,
    pub mock_seed: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            openweather_api_key: None,
            openweather_base_url: "https://api.openweathermap.org".to_string(),
            openweather_current_path: "/data/2.5/weather".to_string(),
            openweather_forecast_path: "/data/2.5/forecast".to_string(),
            host: "0.0.0.0".to_string(),
            port: 3000,
            cache_ttl_secs: 600,
            mock_seed: None,
        }
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Config::default();

        Ok(Config {
            openweather_api_key: lookup("OPENWEATHER_API_KEY"),
            openweather_base_url: lookup("OPENWEATHER_BASE_URL")
                .unwrap_or(defaults.openweather_base_url),
            openweather_current_path: lookup("OPENWEATHER_CURRENT_PATH")
                .unwrap_or(defaults.openweather_current_path),
            openweather_forecast_path: lookup("OPENWEATHER_FORECAST_PATH")
                .unwrap_or(defaults.openweather_forecast_path),
            host: lookup("HOST").unwrap_or(defaults.host),
            port: match lookup("PORT") {
                Some(raw) => raw.parse().with_context(|| format!("PORT is not a valid port: {raw}"))?,
                None => defaults.port,
            },
            cache_ttl_secs: match lookup("CACHE_TTL_SECS") {
                Some(raw) => raw
                    .parse()
                    .with_context(|| format!("CACHE_TTL_SECS is not a number: {raw}"))?,
                None => defaults.cache_ttl_secs,
            },
            mock_seed: lookup("MOCK_SEED")
                .map(|raw| {
                    raw.parse()
                        .with_context(|| format!("MOCK_SEED is not a number: {raw}"))
                })
                .transpose()?,
        })
    }

    /// The API key, unless it is missing, blank or still the placeholder.
    pub fn weather_api_key(&self) -> Option<&str> {
        self.openweather_api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty() && *key != PLACEHOLDER_API_KEY)
    }

    pub fn has_weather_api(&self) -> bool {
        self.weather_api_key().is_some()
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Settings for the terminal dashboard.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ClientConfig {
    pub api_url: String,
    pub history_file: PathBuf,
}

impl ClientConfig {
    pub fn from_env() -> Self {
        Self {
            api_url: env::var("SKYPULSE_API_URL")
                .unwrap_or_else(|_| "http://localhost:3000".to_string()),
            history_file: env::var("SKYPULSE_HISTORY_FILE")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("./skypulse_history.json")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_without_env() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.port, 3000);
        assert_eq!(config.cache_ttl_secs, 600);
        assert_eq!(config.openweather_current_path, "/data/2.5/weather");
        assert_eq!(config.bind_address(), "0.0.0.0:3000");
        assert!(!config.has_weather_api());
    }

    #[test]
    fn test_placeholder_key_means_mock_mode() {
        let config = Config::from_lookup(lookup(&[("OPENWEATHER_API_KEY", PLACEHOLDER_API_KEY)])).unwrap();
        assert!(!config.has_weather_api());

        let config = Config::from_lookup(lookup(&[("OPENWEATHER_API_KEY", "  ")])).unwrap();
        assert!(!config.has_weather_api());

        let config = Config::from_lookup(lookup(&[("OPENWEATHER_API_KEY", "abc123")])).unwrap();
        assert_eq!(config.weather_api_key(), Some("abc123"));
    }

    #[test]
    fn test_overrides_and_bad_numbers() {
        let config = Config::from_lookup(lookup(&[
            ("PORT", "8080"),
            ("HOST", "127.0.0.1"),
            ("MOCK_SEED", "42"),
        ]))
        .unwrap();
        assert_eq!(config.bind_address(), "127.0.0.1:8080");
        assert_eq!(config.mock_seed, Some(42));

        assert!(Config::from_lookup(lookup(&[("PORT", "http")])).is_err());
        assert!(Config::from_lookup(lookup(&[("CACHE_TTL_SECS", "-1")])).is_err());
    }
}
