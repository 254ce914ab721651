//! Lag-1 feature rows built from daily aggregates.

use crate::aggregation::daily_aggregate::DailyAggregate;
use chrono::{Datelike, Duration};

pub const FEATURE_COUNT: usize = 6;

/// Column order of a feature vector.
pub const FEATURE_NAMES: [&str; FEATURE_COUNT] = [
    "temp_max_lag1",
    "temp_min_lag1",
    "temp_mean_lag1",
    "humidity_mean_lag1",
    "wind_mean_lag1",
    "day_of_year",
];

pub type Features = [f64; FEATURE_COUNT];

/// One training example: the previous day's statistics plus this day's
/// day-of-year, and this day's temperatures as targets.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrainingRow {
    pub features: Features,
    pub temp_max: f64,
    pub temp_min: f64,
    pub temp_mean: f64,
}

fn features_from(previous: &DailyAggregate, day_of_year: u32) -> Features {
    [
        previous.temp_max,
        previous.temp_min,
        previous.temp_mean,
        previous.humidity_mean,
        previous.wind_mean,
        day_of_year as f64,
    ]
}

/// Pairs every day with the day immediately before it. Days whose previous
/// calendar day is not present (the first day, or after a gap) are dropped.
pub fn lag_rows(days: &[DailyAggregate]) -> Vec<TrainingRow> {
    days.windows(2)
        .filter(|pair| pair[0].date + Duration::days(1) == pair[1].date)
        .map(|pair| TrainingRow {
            features: features_from(&pair[0], pair[1].day_of_year()),
            temp_max: pair[1].temp_max,
            temp_min: pair[1].temp_min,
            temp_mean: pair[1].temp_mean,
        })
        .filter(|row| {
            row.features.iter().all(|v| v.is_finite())
                && row.temp_max.is_finite()
                && row.temp_min.is_finite()
                && row.temp_mean.is_finite()
        })
        .collect()
}

/// Features for predicting the day after the most recent aggregate.
pub fn tomorrow_features(days: &[DailyAggregate]) -> Option<Features> {
    let today = days.last()?;
    let tomorrow = today.date + Duration::days(1);
    Some(features_from(today, tomorrow.ordinal()))
}
