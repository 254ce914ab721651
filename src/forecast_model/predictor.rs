use crate::aggregation::daily_aggregate::DailyAggregate;
use crate::forecast_model::error::RegressionError;
use crate::forecast_model::features::{lag_rows, tomorrow_features, Features, TrainingRow, FEATURE_NAMES};
use crate::forecast_model::regression::LinearRegression;
use crate::types::forecast::LocalForecast;
use crate::utils::round_to_tenth;
use log::{debug, info};

/// Default number of clean lag-1 rows required before a prediction is made.
pub const DEFAULT_MIN_RECORDS: usize = 10;

/// Three independent regressions sharing the same lag-1 features, one per
/// temperature target.
#[derive(Debug, Clone, PartialEq)]
pub struct TemperatureModel {
    max: LinearRegression,
    min: LinearRegression,
    mean: LinearRegression,
}

/// Point prediction of the three targets.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TemperaturePrediction {
    pub max: f64,
    pub min: f64,
    pub mean: f64,
}

impl TemperatureModel {
    pub fn fit(rows: &[TrainingRow]) -> Result<Self, RegressionError> {
        let features: Vec<Features> = rows.iter().map(|row| row.features).collect();
        let targets = |pick: fn(&TrainingRow) -> f64| rows.iter().map(pick).collect::<Vec<f64>>();

        Ok(Self {
            max: LinearRegression::fit(&features, &targets(|r| r.temp_max))?,
            min: LinearRegression::fit(&features, &targets(|r| r.temp_min))?,
            mean: LinearRegression::fit(&features, &targets(|r| r.temp_mean))?,
        })
    }

    /// Per-feature weights of the maximum temperature model, in [`FEATURE_NAMES`] order.
    pub fn max_weights(&self) -> impl Iterator<Item = (&'static str, f64)> + '_ {
        FEATURE_NAMES
            .iter()
            .copied()
            .zip(self.max.coefficients().iter().copied())
    }

    pub fn predict(&self, features: &Features) -> TemperaturePrediction {
        TemperaturePrediction {
            max: self.max.predict(features),
            min: self.min.predict(features),
            mean: self.mean.predict(features),
        }
    }
}

/// Trains on the lag-1 rows of `days` and predicts the day after the last one.
///
/// With fewer than `min_records` clean rows the result carries no temperatures,
/// only the row count. Predictions are rounded to one decimal.
pub fn predict_tomorrow(days: &[DailyAggregate], min_records: usize) -> Result<LocalForecast, RegressionError> {
    let rows = lag_rows(days);
    let sample_count = rows.len();
    let Some(features) = tomorrow_features(days) else {
        return Ok(LocalForecast::insufficient(sample_count));
    };
    if sample_count == 0 || sample_count < min_records {
        debug!("Only {} clean rows, {} required", sample_count, min_records);
        return Ok(LocalForecast::insufficient(sample_count));
    }

    let model = TemperatureModel::fit(&rows)?;
    for (name, weight) in model.max_weights() {
        debug!("max model weight {}: {:.4}", name, weight);
    }
    let prediction = model.predict(&features);
    let forecast = LocalForecast::predicted(
        round_to_tenth(prediction.max),
        round_to_tenth(prediction.min),
        round_to_tenth(prediction.mean),
        sample_count,
    );
    info!(
        "Trained on {} rows, tomorrow max {:.1} / min {:.1} / mean {:.1}",
        sample_count, prediction.max, prediction.min, prediction.mean
    );
    Ok(forecast)
}
