//! Collapses irregular intraday samples of a log into one row per calendar day.

use crate::aggregation::error::AggregationError;
use crate::record_store::read_log_as_text;
use crate::types::log_schema::LogSchema;
use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};
use polars::prelude::*;
use std::collections::BTreeMap;
use std::path::Path;

/// Humidity used for samples whose humidity cell is empty or not a number.
pub const DEFAULT_HUMIDITY: f64 = 60.0;
/// Wind speed used for samples whose wind cell is empty or not a number.
pub const DEFAULT_WIND: f64 = 0.0;

const DAY: &str = "day";
const TEMP_MAX: &str = "temp_max";
const TEMP_MIN: &str = "temp_min";
const TEMP_MEAN: &str = "temp_mean";
const HUMIDITY_MEAN: &str = "humidity_mean";
const WIND_MEAN: &str = "wind_mean";

/// Statistics of one calendar day.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DailyAggregate {
    pub date: NaiveDate,
    pub temp_max: f64,
    pub temp_min: f64,
    pub temp_mean: f64,
    pub humidity_mean: f64,
    pub wind_mean: f64,
    /// `false` when the values were carried forward from the previous day.
    pub observed: bool,
}

impl DailyAggregate {
    pub fn day_of_year(&self) -> u32 {
        self.date.ordinal()
    }

    /// The same statistics, dated `date` and marked as carried forward.
    fn carried_to(&self, date: NaiveDate) -> Self {
        Self {
            date,
            observed: false,
            ..*self
        }
    }
}

/// Reads a log file and aggregates it per day. See [`aggregate_frame`].
pub fn aggregate_log(path: &Path) -> Result<Vec<DailyAggregate>, AggregationError> {
    let frame = read_log_as_text(path).map_err(|e| AggregationError::LogRead(path.to_path_buf(), e))?;
    aggregate_frame(&frame)
}

/// Groups rows by the calendar date of their timestamp, computes max/min/mean
/// temperature and mean humidity and wind per day, and returns one entry per
/// day between the first and last day with a valid temperature, ascending.
///
/// Cells that are not numbers count as missing: missing humidity and wind are
/// replaced by [`DEFAULT_HUMIDITY`] and [`DEFAULT_WIND`], missing temperatures
/// are ignored. Rows with an unparseable timestamp are skipped. Days without
/// any valid temperature repeat the previous day's values.
pub fn aggregate_frame(frame: &DataFrame) -> Result<Vec<DailyAggregate>, AggregationError> {
    let required = [
        LogSchema::TIMESTAMP,
        LogSchema::TEMPERATURE,
        LogSchema::HUMIDITY,
        LogSchema::WIND,
    ];
    for name in required {
        if frame.column(name).is_err() {
            return Err(AggregationError::MissingColumn(name.to_string()));
        }
    }

    let timestamps = frame.column(LogSchema::TIMESTAMP)?.cast(&DataType::String)?;
    let days: Vec<Option<String>> = timestamps
        .str()?
        .into_iter()
        .map(|ts| ts.and_then(parse_day).map(|d| d.format("%Y-%m-%d").to_string()))
        .collect();

    let mut samples = frame.select(required)?;
    samples.with_column(Series::new(DAY.into(), days))?;

    let daily = samples
        .lazy()
        .filter(col(DAY).is_not_null())
        .with_columns([
            col(LogSchema::TEMPERATURE).cast(DataType::Float64),
            col(LogSchema::HUMIDITY)
                .cast(DataType::Float64)
                .fill_null(lit(DEFAULT_HUMIDITY)),
            col(LogSchema::WIND)
                .cast(DataType::Float64)
                .fill_null(lit(DEFAULT_WIND)),
        ])
        .group_by([col(DAY)])
        .agg([
            col(LogSchema::TEMPERATURE).max().alias(TEMP_MAX),
            col(LogSchema::TEMPERATURE).min().alias(TEMP_MIN),
            col(LogSchema::TEMPERATURE).mean().alias(TEMP_MEAN),
            col(LogSchema::HUMIDITY).mean().alias(HUMIDITY_MEAN),
            col(LogSchema::WIND).mean().alias(WIND_MEAN),
        ])
        .collect()?;

    let day_col = daily.column(DAY)?.str()?;
    let max_col = daily.column(TEMP_MAX)?.f64()?;
    let min_col = daily.column(TEMP_MIN)?.f64()?;
    let mean_col = daily.column(TEMP_MEAN)?.f64()?;
    let hum_col = daily.column(HUMIDITY_MEAN)?.f64()?;
    let wind_col = daily.column(WIND_MEAN)?.f64()?;

    let mut observed = BTreeMap::new();
    for i in 0..daily.height() {
        let Some(date) = day_col.get(i).and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok()) else {
            continue;
        };
        // A day whose temperatures were all unreadable has no statistics of its own.
        let (Some(temp_max), Some(temp_min), Some(temp_mean)) = (max_col.get(i), min_col.get(i), mean_col.get(i)) else {
            continue;
        };
        observed.insert(
            date,
            DailyAggregate {
                date,
                temp_max,
                temp_min,
                temp_mean,
                humidity_mean: hum_col.get(i).unwrap_or(DEFAULT_HUMIDITY),
                wind_mean: wind_col.get(i).unwrap_or(DEFAULT_WIND),
                observed: true,
            },
        );
    }

    Ok(forward_fill(observed))
}

/// Emits every calendar day from the first to the last observed day, reusing
/// the most recent observed statistics for days without data.
fn forward_fill(observed: BTreeMap<NaiveDate, DailyAggregate>) -> Vec<DailyAggregate> {
    let (Some(first), Some(last)) = (observed.keys().next().copied(), observed.keys().next_back().copied()) else {
        return Vec::new();
    };

    let mut filled = Vec::with_capacity(observed.len());
    let mut previous: Option<DailyAggregate> = None;
    for date in first.iter_days().take_while(|d| *d <= last) {
        let today = match observed.get(&date) {
            Some(day) => *day,
            None => match previous {
                Some(prev) => prev.carried_to(date),
                None => continue,
            },
        };
        filled.push(today);
        previous = Some(today);
    }
    filled
}

fn parse_day(timestamp: &str) -> Option<NaiveDate> {
    let ts = timestamp.trim();
    NaiveDateTime::parse_from_str(ts, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(ts, "%Y-%m-%d %H:%M:%S%.f"))
        .map(|dt| dt.date())
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(ts).ok().map(|dt| dt.date_naive()))
        .or_else(|| NaiveDate::parse_from_str(ts, "%Y-%m-%d").ok())
}
