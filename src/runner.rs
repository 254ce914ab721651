//! One collection run: every configured location is observed, stored and
//! forecast in turn, then the forecast and map documents are written.

use crate::aggregation::daily_aggregate::aggregate_log;
use crate::clients::weather_source::WeatherSource;
use crate::config::Config;
use crate::error::MeteologError;
use crate::forecast_model::evaluation::evaluate_holdout;
use crate::forecast_model::predictor::predict_tomorrow;
use crate::locations::location_directory::load_locations;
use crate::record_store::log_store::{AppendOutcome, LogChange, RecordStore};
use crate::summary::forecast_summary::{write_forecast_summary, write_map_summary, ForecastSummary};
use crate::types::forecast::{ForecastResult, LocalForecast, LocationSummary};
use crate::types::location::Location;
use log::{error, info, warn};
use std::path::PathBuf;
use tokio::task;

/// Counters describing what a run did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunReport {
    /// Locations taken from the locations file.
    pub processed: usize,
    /// Locations whose current observation was appended to their log.
    pub stored: usize,
    /// Logs rewritten to the current layout before appending.
    pub migrated: usize,
    /// Logs moved aside because they could not be migrated.
    pub discarded: usize,
    /// Locations whose observation could not be fetched or stored.
    pub skipped: usize,
    /// Output documents that could not be written.
    pub persist_failures: usize,
}

/// Processes all locations sequentially.
///
/// A failure for one location is logged and counted, never aborts the run.
/// Only an unreadable locations file is fatal. Failing to write an output
/// document is counted in [`RunReport::persist_failures`].
pub async fn run<S: WeatherSource>(config: &Config, source: &S) -> Result<RunReport, MeteologError> {
    let locations = load_locations(&config.locations_file).await?;
    info!("--- Processing {} locations ---", locations.len());

    let store = RecordStore::new(config);
    let mut report = RunReport::default();
    let mut summary = ForecastSummary::new();
    let mut map_entries: Vec<LocationSummary> = Vec::new();

    for location in &locations {
        report.processed += 1;
        info!("Processing {}", location.display_name);

        match observe(source, &store, location).await {
            Ok(outcome) => {
                report.stored += 1;
                match &outcome.change {
                    LogChange::Migrated(migration) => {
                        report.migrated += 1;
                        info!(
                            "{}: migrated {} rows, added {:?}",
                            location.display_name, migration.rows, migration.added_columns
                        );
                    }
                    LogChange::Discarded { backup } => {
                        report.discarded += 1;
                        error!(
                            "{}: history could not be migrated and was moved to {}, it is no longer used",
                            location.display_name,
                            backup.display()
                        );
                    }
                    LogChange::Created | LogChange::Appended => {}
                }
                map_entries.push(outcome.summary);
            }
            Err(e) => {
                report.skipped += 1;
                warn!("{}: observation not stored: {}", location.display_name, e);
            }
        }

        let external_forecast = source.forecast(location).await;
        let local_forecast = match forecast_locally(config, store.log_path(location)).await {
            Ok(forecast) => forecast,
            Err(e) => {
                warn!("{}: local forecast unavailable: {}", location.display_name, e);
                LocalForecast::default()
            }
        };

        summary.insert(
            location.display_name.clone(),
            ForecastResult {
                external_forecast,
                local_forecast,
            },
        );
    }

    if let Err(e) = write_map_summary(&config.map_output, &map_entries) {
        report.persist_failures += 1;
        error!("Map summary not saved: {}", e);
    }
    if let Err(e) = write_forecast_summary(&config.forecast_output, &summary) {
        report.persist_failures += 1;
        error!("Forecasts not saved: {}", e);
    }

    info!(
        "--- Run finished: {} processed, {} stored, {} migrated, {} skipped ---",
        report.processed, report.stored, report.migrated, report.skipped
    );
    Ok(report)
}

async fn observe<S: WeatherSource>(
    source: &S,
    store: &RecordStore,
    location: &Location,
) -> Result<AppendOutcome, MeteologError> {
    let payload = source.current(location).await?;
    let store = store.clone();
    let location = location.clone();
    let outcome = task::spawn_blocking(move || store.append(&location, &payload)).await??;
    Ok(outcome)
}

/// Aggregates the log at `path` and predicts tomorrow. A location without a
/// log yet has no history.
async fn forecast_locally(config: &Config, path: PathBuf) -> Result<LocalForecast, MeteologError> {
    let min_records = config.min_records;
    let holdout = config
        .evaluate
        .then_some((config.holdout_ratio, config.holdout_seed));

    task::spawn_blocking(move || -> Result<LocalForecast, MeteologError> {
        if !path.exists() {
            return Ok(LocalForecast::insufficient(0));
        }
        let days = aggregate_log(&path)?;
        if let Some((ratio, seed)) = holdout {
            match evaluate_holdout(&days, ratio, seed, min_records)? {
                Some(r) => info!(
                    "Hold-out error for {}: max {:.2}, min {:.2}, mean {:.2} ({} train / {} test rows)",
                    path.display(),
                    r.mae_max,
                    r.mae_min,
                    r.mae_mean,
                    r.train_rows,
                    r.test_rows
                ),
                None => info!("Not enough history in {} for a hold-out report", path.display()),
            }
        }
        Ok(predict_tomorrow(&days, min_records)?)
    })
    .await?
}
