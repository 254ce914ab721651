//! Offline error report: hold out a seeded random share of the lag-1 rows,
//! train on the rest and measure mean absolute error on the held-out part.

use crate::aggregation::daily_aggregate::DailyAggregate;
use crate::forecast_model::error::RegressionError;
use crate::forecast_model::features::lag_rows;
use crate::forecast_model::predictor::TemperatureModel;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HoldoutReport {
    pub mae_max: f64,
    pub mae_min: f64,
    pub mae_mean: f64,
    pub train_rows: usize,
    pub test_rows: usize,
}

/// Returns `Ok(None)` when there are fewer than `min_records` rows or when the
/// split leaves either side empty. The same `seed` always gives the same split.
pub fn evaluate_holdout(
    days: &[DailyAggregate],
    ratio: f64,
    seed: u64,
    min_records: usize,
) -> Result<Option<HoldoutReport>, RegressionError> {
    let mut rows = lag_rows(days);
    if rows.is_empty() || rows.len() < min_records || !(0.0..1.0).contains(&ratio) {
        return Ok(None);
    }

    let test_rows = (rows.len() as f64 * ratio).ceil() as usize;
    if test_rows == 0 || test_rows >= rows.len() {
        return Ok(None);
    }

    let mut rng = StdRng::seed_from_u64(seed);
    rows.shuffle(&mut rng);
    let (test, train) = rows.split_at(test_rows);

    let model = TemperatureModel::fit(train)?;
    let mut errors = [0.0_f64; 3];
    for row in test {
        let prediction = model.predict(&row.features);
        errors[0] += (prediction.max - row.temp_max).abs();
        errors[1] += (prediction.min - row.temp_min).abs();
        errors[2] += (prediction.mean - row.temp_mean).abs();
    }
    let count = test.len() as f64;

    Ok(Some(HoldoutReport {
        mae_max: errors[0] / count,
        mae_min: errors[1] / count,
        mae_mean: errors[2] / count,
        train_rows: train.len(),
        test_rows: test.len(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn days(count: u32, wobble: bool) -> Vec<DailyAggregate> {
        (0..count)
            .map(|i| {
                let noise = if wobble && i % 3 == 0 { 1.5 } else { 0.0 };
                DailyAggregate {
                    date: NaiveDate::from_ymd_opt(2025, 5, 1 + i).unwrap(),
                    temp_max: 22.0 + 0.5 * i as f64 + noise,
                    temp_min: 12.0 + 0.5 * i as f64,
                    temp_mean: 17.0 + 0.5 * i as f64,
                    humidity_mean: 55.0 + (i % 4) as f64,
                    wind_mean: 8.0,
                    observed: true,
                }
            })
            .collect()
    }

    #[test]
    fn test_split_sizes() {
        let report = evaluate_holdout(&days(21, false), 0.2, 42, 10).unwrap().unwrap();
        assert_eq!(report.test_rows, 4);
        assert_eq!(report.train_rows, 16);
    }

    #[test]
    fn test_linear_history_has_no_error() {
        let report = evaluate_holdout(&days(25, false), 0.2, 7, 10).unwrap().unwrap();
        assert!(report.mae_max < 1e-6);
        assert!(report.mae_min < 1e-6);
        assert!(report.mae_mean < 1e-6);
    }

    #[test]
    fn test_same_seed_same_report() {
        let history = days(30, true);
        let first = evaluate_holdout(&history, 0.25, 42, 10).unwrap();
        let second = evaluate_holdout(&history, 0.25, 42, 10).unwrap();
        assert!(first.is_some());
        assert_eq!(first, second);
    }

    #[test]
    fn test_too_little_history() {
        assert_eq!(evaluate_holdout(&days(8, false), 0.2, 42, 10), Ok(None));
        assert_eq!(evaluate_holdout(&days(20, false), 0.0, 42, 10), Ok(None));
    }
}
