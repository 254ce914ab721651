//! [`WeatherSource`] backed by the OpenWeatherMap 2.5 REST API.

use crate::clients::error::FetchError;
use crate::clients::weather_source::WeatherSource;
use crate::config::Config;
use crate::types::forecast::DailyForecast;
use crate::types::location::Location;
use crate::utils::round_to_tenth;
use chrono::{Local, NaiveDate};
use log::{debug, info, warn};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::{sleep, Instant};

pub const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org/data/2.5";

/// 3-hourly forecast document, reduced to the fields that are used.
#[derive(Debug, Deserialize)]
pub struct ForecastResponse {
    #[serde(default)]
    pub list: Vec<ForecastItem>,
}

#[derive(Debug, Deserialize)]
pub struct ForecastItem {
    /// `YYYY-MM-DD HH:MM:SS`, UTC.
    pub dt_txt: String,
    pub main: ForecastMain,
}

#[derive(Debug, Deserialize)]
pub struct ForecastMain {
    pub temp: f64,
}

pub struct OpenWeatherClient {
    http: Client,
    base_url: String,
    api_key: String,
    language: String,
    request_delay: Duration,
    last_request: Mutex<Option<Instant>>,
}

impl OpenWeatherClient {
    pub fn new(config: &Config) -> Self {
        Self::with_base_url(config, DEFAULT_BASE_URL)
    }

    pub fn with_base_url(config: &Config, base_url: &str) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            language: config.language.clone(),
            request_delay: config.request_delay,
            last_request: Mutex::new(None),
        }
    }

    /// Query parameters for `location`, without the API key.
    fn query(&self, location: &Location) -> Vec<(&'static str, String)> {
        let mut params = match location.coordinates {
            Some(coords) => vec![("lat", coords.0.to_string()), ("lon", coords.1.to_string())],
            None => vec![("q", location.query_name.clone())],
        };
        params.push(("units", "metric".to_string()));
        params.push(("lang", self.language.clone()));
        params
    }

    /// Waits until at least `request_delay` has passed since the previous call.
    async fn throttle(&self) {
        let mut last = self.last_request.lock().await;
        if let Some(previous) = *last {
            let elapsed = previous.elapsed();
            if elapsed < self.request_delay {
                sleep(self.request_delay - elapsed).await;
            }
        }
        *last = Some(Instant::now());
    }

    async fn get_json<T: DeserializeOwned>(&self, endpoint: &str, location: &Location) -> Result<T, FetchError> {
        self.throttle().await;
        let url = format!("{}/{}", self.base_url, endpoint);
        // The key is left out of every string that can end up in a log line.
        let target = format!("{} ({})", endpoint, location.query_name);
        debug!("Requesting {}", target);

        let response = self
            .http
            .get(&url)
            .query(&self.query(location))
            .query(&[("appid", self.api_key.as_str())])
            .send()
            .await
            .map_err(|e| FetchError::Network(target.clone(), e.without_url()))?;

        let response = match response.error_for_status() {
            Ok(resp) => resp,
            Err(e) => return Err(status_error(e.without_url(), target, location)),
        };

        response
            .json::<T>()
            .await
            .map_err(|e| FetchError::Decode(target, e.without_url()))
    }
}

fn status_error(error: reqwest::Error, target: String, location: &Location) -> FetchError {
    match error.status() {
        Some(StatusCode::NOT_FOUND) => FetchError::NotFound(location.query_name.clone()),
        Some(StatusCode::UNAUTHORIZED) => FetchError::Unauthorized,
        Some(status) => FetchError::HttpStatus {
            target,
            status,
            source: error,
        },
        None => FetchError::Network(target, error),
    }
}

/// Collapses 3-hourly forecast items into one entry per future calendar day.
///
/// Items dated `today` are ignored. Each remaining day gets the max, min and
/// mean of its temperatures, rounded to one decimal, in ascending date order.
pub fn summarize_forecast(items: &[ForecastItem], today: NaiveDate) -> Vec<DailyForecast> {
    let mut per_day: BTreeMap<NaiveDate, Vec<f64>> = BTreeMap::new();
    for item in items {
        let Some(date) = item
            .dt_txt
            .split_whitespace()
            .next()
            .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok())
        else {
            continue;
        };
        if date == today || !item.main.temp.is_finite() {
            continue;
        }
        per_day.entry(date).or_default().push(item.main.temp);
    }

    per_day
        .into_iter()
        .map(|(date, temps)| {
            let max = temps.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
            let min = temps.iter().cloned().fold(f64::INFINITY, f64::min);
            let mean = temps.iter().sum::<f64>() / temps.len() as f64;
            DailyForecast {
                date,
                max: round_to_tenth(max),
                min: round_to_tenth(min),
                mean: round_to_tenth(mean),
            }
        })
        .collect()
}

impl WeatherSource for OpenWeatherClient {
    async fn current(&self, location: &Location) -> Result<Value, FetchError> {
        let payload = self.get_json::<Value>("weather", location).await?;
        info!("Fetched current weather for {}", location.display_name);
        Ok(payload)
    }

    async fn forecast(&self, location: &Location) -> Vec<DailyForecast> {
        match self.get_json::<ForecastResponse>("forecast", location).await {
            Ok(response) => {
                let days = summarize_forecast(&response.list, Local::now().date_naive());
                if days.is_empty() {
                    info!("No future days in the forecast for {}", location.display_name);
                } else {
                    info!("Forecast for {} covers {} days", location.display_name, days.len());
                }
                days
            }
            Err(e) => {
                warn!("Forecast unavailable for {}: {}", location.display_name, e);
                Vec::new()
            }
        }
    }
}
