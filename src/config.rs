//! Run configuration, built once at startup and passed by reference to every component.

use crate::error::ConfigError;
use bon::Builder;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Environment variable holding the OpenWeatherMap API key.
pub const API_KEY_VAR: &str = "OPENWEATHER_API_KEY";

/// Immutable settings for one collection run.
///
/// # Examples
///
/// ```
/// use meteolog::Config;
/// use std::time::Duration;
///
/// let config = Config::builder()
///     .api_key("secret")
///     .data_dir("/tmp/meteolog")
///     .min_records(14)
///     .build();
///
/// assert_eq!(config.min_records, 14);
/// assert_eq!(config.request_delay, Duration::from_millis(1100));
/// assert_eq!(config.locations_file.to_str(), Some("locations.txt"));
/// ```
#[derive(Debug, Clone, Builder)]
pub struct Config {
    #[builder(into)]
    pub api_key: String,

    /// Directory holding one CSV log per location.
    #[builder(into, default = PathBuf::from("data"))]
    pub data_dir: PathBuf,

    /// Line-oriented list of locations (`name,region[,lat,lon]`).
    #[builder(into, default = PathBuf::from("locations.txt"))]
    pub locations_file: PathBuf,

    #[builder(into, default = PathBuf::from("forecasts.json"))]
    pub forecast_output: PathBuf,

    #[builder(into, default = PathBuf::from("city_locations.json"))]
    pub map_output: PathBuf,

    /// Minimum number of clean lag-1 rows needed before a model is trained.
    #[builder(default = 10)]
    pub min_records: usize,

    /// Fixed pause between consecutive calls to the weather service.
    #[builder(default = Duration::from_millis(1100))]
    pub request_delay: Duration,

    /// Language of the free-text weather description.
    #[builder(into, default = String::from("es"))]
    pub language: String,

    /// Move an unreadable stale log aside and start a new one instead of
    /// skipping the append. Off by default since it loses the old rows.
    #[builder(default = false)]
    pub discard_unreadable_logs: bool,

    /// Log a hold-out error report for every location with enough history.
    #[builder(default = false)]
    pub evaluate: bool,

    #[builder(default = 0.2)]
    pub holdout_ratio: f64,

    #[builder(default = 42)]
    pub holdout_seed: u64,
}

impl Config {
    /// Reads the API key from [`API_KEY_VAR`]. A missing or blank key is fatal.
    pub fn api_key_from_env() -> Result<String, ConfigError> {
        match env::var(API_KEY_VAR) {
            Ok(key) if !key.trim().is_empty() => Ok(key),
            _ => Err(ConfigError::MissingApiKey(API_KEY_VAR)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::builder().api_key("k").build();
        assert_eq!(config.data_dir, PathBuf::from("data"));
        assert_eq!(config.forecast_output, PathBuf::from("forecasts.json"));
        assert_eq!(config.map_output, PathBuf::from("city_locations.json"));
        assert_eq!(config.min_records, 10);
        assert!(!config.discard_unreadable_logs);
        assert_eq!(config.holdout_seed, 42);
    }

    #[test]
    fn test_missing_api_key_names_variable() {
        let err = ConfigError::MissingApiKey(API_KEY_VAR);
        assert_eq!(err.to_string(), "Environment variable OPENWEATHER_API_KEY is not set");
    }
}
