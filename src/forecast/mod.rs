pub mod daily;
pub mod mock;
pub mod openweather;
pub mod types;

use moka::future::Cache;
use std::time::Duration;
use types::WeatherPayload;

/// Upstream payloads keyed by lower-cased city name.
pub type PayloadCache = Cache<String, WeatherPayload>;

pub fn init_cache(ttl_secs: u64) -> PayloadCache {
    Cache::builder()
        .max_capacity(1000)
        .time_to_live(Duration::from_secs(ttl_secs))
        .build()
}

pub fn cache_key(city: &str) -> String {
    city.trim().to_lowercase()
}
