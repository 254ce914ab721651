//! Result types produced per location: the external multi-day forecast, the
//! locally trained prediction for tomorrow and the compact map entry.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Temperature extremes and mean for one calendar day of an external forecast.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyForecast {
    pub date: NaiveDate,
    pub max: f64,
    pub min: f64,
    pub mean: f64,
}

/// Locally trained next-day prediction.
///
/// The three temperatures are either all present or all absent; absence means
/// the location does not have enough history yet. `sample_count` is the number
/// of clean training rows that were available either way.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LocalForecast {
    max: Option<f64>,
    min: Option<f64>,
    mean: Option<f64>,
    sample_count: usize,
}

impl LocalForecast {
    pub fn predicted(max: f64, min: f64, mean: f64, sample_count: usize) -> Self {
        Self {
            max: Some(max),
            min: Some(min),
            mean: Some(mean),
            sample_count,
        }
    }

    pub fn insufficient(sample_count: usize) -> Self {
        Self {
            max: None,
            min: None,
            mean: None,
            sample_count,
        }
    }

    pub fn max(&self) -> Option<f64> {
        self.max
    }

    pub fn min(&self) -> Option<f64> {
        self.min
    }

    pub fn mean(&self) -> Option<f64> {
        self.mean
    }

    pub fn sample_count(&self) -> usize {
        self.sample_count
    }

    pub fn is_available(&self) -> bool {
        self.max.is_some()
    }
}

impl Default for LocalForecast {
    fn default() -> Self {
        Self::insufficient(0)
    }
}

/// Everything forecast for one location during a run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ForecastResult {
    pub external_forecast: Vec<DailyForecast>,
    pub local_forecast: LocalForecast,
}

/// Compact per-location entry of the map summary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocationSummary {
    pub location: String,
    pub latitude: f64,
    pub longitude: f64,
    pub temperature: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_insufficient_serializes_nulls() {
        let value = serde_json::to_value(LocalForecast::insufficient(9)).unwrap();
        assert_eq!(
            value,
            json!({ "max": null, "min": null, "mean": null, "sample_count": 9 })
        );
    }

    #[test]
    fn test_default_result_keeps_every_key() {
        let value = serde_json::to_value(ForecastResult::default()).unwrap();
        assert_eq!(value["external_forecast"], json!([]));
        assert_eq!(value["local_forecast"]["sample_count"], json!(0));
        assert!(value["local_forecast"]["max"].is_null());
    }

    #[test]
    fn test_daily_forecast_date_format() {
        let day = DailyForecast {
            date: NaiveDate::from_ymd_opt(2025, 6, 2).unwrap(),
            max: 30.1,
            min: 18.4,
            mean: 24.0,
        };
        let value = serde_json::to_value(&day).unwrap();
        assert_eq!(value["date"], json!("2025-06-02"));
    }
}
