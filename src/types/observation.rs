//! Extraction of one weather sample from a current-conditions payload and its
//! single-row frame representation in the historical log.

use crate::types::log_schema::LogSchema;
use chrono::NaiveDateTime;
use polars::prelude::*;
use serde_json::Value;
use thiserror::Error;

/// Format of the timestamp cell written to the log.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6f";

const METERS_PER_SECOND_TO_KMH: f64 = 3.6;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum PayloadError {
    #[error("Payload is empty")]
    NoData,

    #[error("Required field '{0}' is missing from the payload")]
    MissingField(String),
}

/// One fetched weather sample, timestamped at fetch time.
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    pub timestamp: NaiveDateTime,
    /// Location name as reported by the weather service.
    pub reported_name: String,
    pub description: String,
    pub temperature: f64,
    pub feels_like: f64,
    pub temp_min: f64,
    pub temp_max: f64,
    pub humidity: i64,
    /// Wind speed in km/h.
    pub wind_speed: f64,
    pub latitude: f64,
    pub longitude: f64,
    pub cloudiness: i64,
    /// Visibility in meters.
    pub visibility: i64,
    pub rain_1h: f64,
    pub snow_1h: f64,
}

impl Observation {
    /// Extracts an observation from an OpenWeatherMap current weather document.
    ///
    /// Missing required keys are reported by their dotted path (`main.temp`).
    /// Cloudiness, visibility, rain and snow are optional and default to
    /// `0`, `10000`, `0.0` and `0.0`.
    pub fn from_payload(payload: &Value, timestamp: NaiveDateTime) -> Result<Self, PayloadError> {
        match payload {
            Value::Null => return Err(PayloadError::NoData),
            Value::Object(map) if map.is_empty() => return Err(PayloadError::NoData),
            Value::Object(_) => {}
            _ => return Err(PayloadError::NoData),
        }

        Ok(Observation {
            timestamp,
            reported_name: required_str(payload, "name")?,
            description: required_str(payload, "weather.0.description")?,
            temperature: required_f64(payload, "main.temp")?,
            feels_like: required_f64(payload, "main.feels_like")?,
            temp_min: required_f64(payload, "main.temp_min")?,
            temp_max: required_f64(payload, "main.temp_max")?,
            humidity: required_i64(payload, "main.humidity")?,
            wind_speed: required_f64(payload, "wind.speed")? * METERS_PER_SECOND_TO_KMH,
            latitude: required_f64(payload, "coord.lat")?,
            longitude: required_f64(payload, "coord.lon")?,
            cloudiness: lookup(payload, "clouds.all").and_then(as_i64).unwrap_or(0),
            visibility: lookup(payload, "visibility").and_then(as_i64).unwrap_or(10_000),
            rain_1h: lookup(payload, "rain.1h").and_then(Value::as_f64).unwrap_or(0.0),
            snow_1h: lookup(payload, "snow.1h").and_then(Value::as_f64).unwrap_or(0.0),
        })
    }

    pub fn timestamp_text(&self) -> String {
        self.timestamp.format(TIMESTAMP_FORMAT).to_string()
    }

    /// Builds a one-row frame in the current log layout.
    pub fn to_frame(&self) -> PolarsResult<DataFrame> {
        df!(
            LogSchema::TIMESTAMP => [self.timestamp_text()],
            LogSchema::LOCATION => [self.reported_name.as_str()],
            LogSchema::TEMPERATURE => [self.temperature],
            LogSchema::FEELS_LIKE => [self.feels_like],
            LogSchema::TEMP_MIN => [self.temp_min],
            LogSchema::TEMP_MAX => [self.temp_max],
            LogSchema::HUMIDITY => [self.humidity],
            LogSchema::WIND => [self.wind_speed],
            LogSchema::DESCRIPTION => [self.description.as_str()],
            LogSchema::LAT => [self.latitude],
            LogSchema::LON => [self.longitude],
            LogSchema::CLOUDINESS => [self.cloudiness],
            LogSchema::VISIBILITY => [self.visibility],
            LogSchema::RAIN_1H => [self.rain_1h],
            LogSchema::SNOW_1H => [self.snow_1h],
        )
    }
}

/// Walks a dotted path through objects and arrays (`weather.0.description`).
fn lookup<'a>(payload: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.').try_fold(payload, |node, key| match node {
        Value::Array(items) => key.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => node.get(key),
    })
    .filter(|v| !v.is_null())
}

fn as_i64(value: &Value) -> Option<i64> {
    value
        .as_i64()
        .or_else(|| value.as_f64().map(|v| v.round() as i64))
}

fn required_f64(payload: &Value, path: &str) -> Result<f64, PayloadError> {
    lookup(payload, path)
        .and_then(Value::as_f64)
        .ok_or_else(|| PayloadError::MissingField(path.to_string()))
}

fn required_i64(payload: &Value, path: &str) -> Result<i64, PayloadError> {
    lookup(payload, path)
        .and_then(as_i64)
        .ok_or_else(|| PayloadError::MissingField(path.to_string()))
}

fn required_str(payload: &Value, path: &str) -> Result<String, PayloadError> {
    lookup(payload, path)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| PayloadError::MissingField(path.to_string()))
}
