//! Append-only per-location historical logs.

use crate::config::Config;
use crate::record_store::error::RecordStoreError;
use crate::record_store::migration::{migrate_log, MigrationReport};
use crate::types::forecast::LocationSummary;
use crate::types::location::Location;
use crate::types::log_schema::LogSchema;
use crate::types::observation::Observation;
use chrono::{Local, NaiveDateTime};
use log::{error, info, warn};
use polars::prelude::*;
use serde_json::Value;
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufRead, BufReader, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

/// What happened to the log file while appending.
#[derive(Debug, Clone, PartialEq)]
pub enum LogChange {
    /// Log did not exist and was created with the current header.
    Created,
    /// Log already had the current header; the row was appended directly.
    Appended,
    /// Log was stale and rewritten in the current layout before appending.
    Migrated(MigrationReport),
    /// Log was stale and unreadable; it was moved to `backup` and a new log
    /// was started. The rows in `backup` are no longer part of the history.
    Discarded { backup: PathBuf },
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppendOutcome {
    pub path: PathBuf,
    pub summary: LocationSummary,
    pub change: LogChange,
}

/// Writes observations to `<data_dir>/<file stem>.csv`, one file per location.
#[derive(Debug, Clone)]
pub struct RecordStore {
    data_dir: PathBuf,
    discard_unreadable_logs: bool,
}

impl RecordStore {
    pub fn new(config: &Config) -> Self {
        Self {
            data_dir: config.data_dir.clone(),
            discard_unreadable_logs: config.discard_unreadable_logs,
        }
    }

    pub fn log_path(&self, location: &Location) -> PathBuf {
        self.data_dir.join(format!("{}.csv", location.file_stem()))
    }

    /// Extracts an observation from a current-conditions payload, timestamps it
    /// now and appends it to the location's log.
    pub fn append(&self, location: &Location, payload: &Value) -> Result<AppendOutcome, RecordStoreError> {
        self.append_at(location, payload, Local::now().naive_local())
    }

    pub fn append_at(
        &self,
        location: &Location,
        payload: &Value,
        fetched_at: NaiveDateTime,
    ) -> Result<AppendOutcome, RecordStoreError> {
        let observation = Observation::from_payload(payload, fetched_at)
            .map_err(|e| RecordStoreError::from_payload(&location.display_name, e))?;
        self.append_observation(location, &observation)
    }

    /// Appends one observation, migrating the log first when its header is stale.
    ///
    /// Only this location's log is touched. If migration fails the log is left
    /// exactly as it was and the error is returned, unless discarding unreadable
    /// logs was enabled in the [`Config`].
    pub fn append_observation(
        &self,
        location: &Location,
        observation: &Observation,
    ) -> Result<AppendOutcome, RecordStoreError> {
        fs::create_dir_all(&self.data_dir)
            .map_err(|e| RecordStoreError::DataDirCreation(self.data_dir.clone(), e))?;
        let path = self.log_path(location);

        let change = match read_header(&path)? {
            None => LogChange::Created,
            Some(header) if LogSchema::detect(&header) == Some(LogSchema::Current) => LogChange::Appended,
            Some(header) => {
                warn!(
                    "Log {} has a stale header ({} columns, current layout has {}), migrating",
                    path.display(),
                    header.len(),
                    LogSchema::Current.width()
                );
                match migrate_log(&path) {
                    Ok(report) => LogChange::Migrated(report),
                    Err(source) if self.discard_unreadable_logs => {
                        error!(
                            "Migration of {} failed ({}), moving it aside and starting a new log",
                            path.display(),
                            source
                        );
                        let backup = discard_log(&path)?;
                        LogChange::Discarded { backup }
                    }
                    Err(source) => return Err(RecordStoreError::Migration { path, source }),
                }
            }
        };

        let write_header = matches!(change, LogChange::Created | LogChange::Discarded { .. });
        append_row(&path, observation, write_header)?;
        info!(
            "Stored observation for {} in {} ({:.1}°C)",
            location.display_name,
            path.display(),
            observation.temperature
        );

        Ok(AppendOutcome {
            path,
            summary: LocationSummary {
                location: location.display_name.clone(),
                latitude: observation.latitude,
                longitude: observation.longitude,
                temperature: observation.temperature,
            },
            change,
        })
    }
}

/// Reads only the first line of a log. `None` when the file does not exist or is empty.
fn read_header(path: &Path) -> Result<Option<Vec<String>>, RecordStoreError> {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(RecordStoreError::HeaderRead(path.to_path_buf(), e)),
    };
    let mut line = String::new();
    BufReader::new(file)
        .read_line(&mut line)
        .map_err(|e| RecordStoreError::HeaderRead(path.to_path_buf(), e))?;
    let line = line.trim_end_matches(['\r', '\n']).trim_start_matches('\u{feff}');
    if line.trim().is_empty() {
        return Ok(None);
    }
    Ok(Some(
        line.split(',')
            .map(|name| name.trim().trim_matches('"').to_string())
            .collect(),
    ))
}

fn append_row(path: &Path, observation: &Observation, write_header: bool) -> Result<(), RecordStoreError> {
    let mut frame = observation
        .to_frame()
        .map_err(|e| RecordStoreError::AppendEncode(path.to_path_buf(), e))?;
    let mut file = OpenOptions::new()
        .create(true)
        .read(true)
        .append(true)
        .open(path)
        .map_err(|e| RecordStoreError::AppendIo(path.to_path_buf(), e))?;
    let prepared = if write_header {
        file.set_len(0)
    } else {
        terminate_last_line(&mut file)
    };
    prepared.map_err(|e| RecordStoreError::AppendIo(path.to_path_buf(), e))?;
    CsvWriter::new(&mut file)
        .include_header(write_header)
        .finish(&mut frame)
        .map_err(|e| RecordStoreError::AppendEncode(path.to_path_buf(), e))
}

/// Ends a partially written last row so the next row starts on its own line.
fn terminate_last_line(file: &mut File) -> io::Result<()> {
    if file.metadata()?.len() == 0 {
        return Ok(());
    }
    file.seek(SeekFrom::End(-1))?;
    let mut last = [0u8; 1];
    file.read_exact(&mut last)?;
    if last[0] != b'\n' {
        file.write_all(b"\n")?;
    }
    Ok(())
}

fn discard_log(path: &Path) -> Result<PathBuf, RecordStoreError> {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let backup = path.with_file_name(format!(
        "{}.unreadable-{}.csv",
        stem,
        Local::now().format("%Y%m%d%H%M%S")
    ));
    fs::rename(path, &backup).map_err(|e| RecordStoreError::Discard(path.to_path_buf(), e))?;
    Ok(backup)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record_store::error::MigrationError;
    use crate::record_store::migration::read_log_as_text;
    use crate::types::observation::tests::sample_payload;
    use chrono::NaiveDate;

    fn at(day: u32, hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 3, day)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    fn store_in(dir: &Path) -> RecordStore {
        RecordStore::new(&Config::builder().api_key("k").data_dir(dir).build())
    }

    fn row_count(path: &Path) -> usize {
        read_log_as_text(path).unwrap().height()
    }

    const LEGACY_HEADER: &str = "timestamp,location,temperature_c,feels_like_c,temp_min_c,temp_max_c,humidity_pct,wind_kmh,description,lat,lon";

    #[test]
    fn test_first_append_creates_log() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let store = store_in(dir.path());
        let madrid = Location::new("Madrid", Some("ES"), None);

        let outcome = store.append_at(&madrid, &sample_payload(18.0), at(1, 12))?;
        assert_eq!(outcome.change, LogChange::Created);
        assert_eq!(outcome.path, dir.path().join("Madrid.csv"));
        assert_eq!(outcome.summary.location, "Madrid");
        assert_eq!(outcome.summary.temperature, 18.0);
        assert_eq!(outcome.summary.latitude, 40.4165);

        let text = fs::read_to_string(&outcome.path)?;
        assert_eq!(text.lines().next(), Some(LogSchema::Current.column_names().join(",").as_str()));
        assert_eq!(row_count(&outcome.path), 1);
        Ok(())
    }

    #[test]
    fn test_each_append_adds_one_row_without_migration() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let store = store_in(dir.path());
        let madrid = Location::new("Madrid", Some("ES"), None);

        store.append_at(&madrid, &sample_payload(18.0), at(1, 9))?;
        for hour in 10..13 {
            let path = store.log_path(&madrid);
            let before = row_count(&path);
            let outcome = store.append_at(&madrid, &sample_payload(18.0), at(1, hour))?;
            assert_eq!(outcome.change, LogChange::Appended);
            assert_eq!(row_count(&path), before + 1);
        }
        Ok(())
    }

    #[test]
    fn test_stale_log_is_migrated_then_appended() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let store = store_in(dir.path());
        let madrid = Location::new("Madrid", Some("ES"), None);
        let path = store.log_path(&madrid);
        fs::write(
            &path,
            format!(
                "{}\n2025-02-27T12:00:00,Madrid,11.0,10.0,9.0,12.0,55,3.6,sol,40.4165,-3.7026\n\
                 2025-02-28T12:00:00,Madrid,12.5,11.0,10.0,14.0,50,7.2,sol,40.4165,-3.7026\n\
                 2025-03-01T12:00:00,Madrid,13.0,12.0,11.0,15.0,45,0.0,sol,40.4165,-3.7026\n",
                LEGACY_HEADER
            ),
        )?;

        let outcome = store.append_at(&madrid, &sample_payload(19.0), at(2, 12))?;
        match &outcome.change {
            LogChange::Migrated(report) => {
                assert_eq!(report.rows, 3);
                assert_eq!(report.from, Some(LogSchema::Legacy));
            }
            other => panic!("expected migration, got {:?}", other),
        }

        let frame = read_log_as_text(&path)?;
        assert_eq!(frame.height(), 4);
        assert_eq!(frame.width(), LogSchema::Current.width());
        let temps: Vec<Option<&str>> = frame.column(LogSchema::TEMPERATURE)?.str()?.into_iter().collect();
        assert_eq!(&temps[..3], &[Some("11.0"), Some("12.5"), Some("13.0")]);
        let visibility: Vec<Option<&str>> = frame.column(LogSchema::VISIBILITY)?.str()?.into_iter().collect();
        assert_eq!(&visibility[..3], &[Some("10000"), Some("10000"), Some("10000")]);
        assert_eq!(visibility[3], Some("8000"));
        let snow: Vec<Option<&str>> = frame.column(LogSchema::SNOW_1H)?.str()?.into_iter().collect();
        assert!(snow[..3].iter().all(|s| *s == Some("0.0")));

        // Second append on the now-current log must not migrate again.
        let outcome = store.append_at(&madrid, &sample_payload(20.0), at(3, 12))?;
        assert_eq!(outcome.change, LogChange::Appended);
        assert_eq!(row_count(&path), 5);
        Ok(())
    }

    #[test]
    fn test_append_after_unterminated_row_keeps_rows_apart() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let store = store_in(dir.path());
        let madrid = Location::new("Madrid", Some("ES"), None);
        let path = store.log_path(&madrid);
        fs::write(
            &path,
            format!(
                "{}\n2025-02-28T12:00:00.000000,Madrid,12.5,11.0,10.0,14.0,50,7.2,sol,40.4165,-3.7026,0,10000,0.0,0.0",
                LogSchema::Current.column_names().join(",")
            ),
        )?;

        let outcome = store.append_at(&madrid, &sample_payload(19.0), at(1, 12))?;
        assert_eq!(outcome.change, LogChange::Appended);

        let text = fs::read_to_string(&path)?;
        assert_eq!(text.lines().count(), 3);
        assert!(text.lines().all(|line| line.split(',').count() == LogSchema::Current.width()));
        let frame = read_log_as_text(&path)?;
        assert_eq!(frame.column(LogSchema::TEMPERATURE)?.str()?.get(0), Some("12.5"));
        assert_eq!(frame.column(LogSchema::TEMPERATURE)?.str()?.get(1), Some("19.0"));
        assert_eq!(crate::aggregation::daily_aggregate::aggregate_log(&path)?.len(), 2);
        Ok(())
    }

    #[test]
    fn test_missing_rain_and_snow_are_stored_as_zero() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let store = store_in(dir.path());
        let madrid = Location::new("Madrid", Some("ES"), None);
        let mut payload = sample_payload(15.0);
        payload.as_object_mut().unwrap().remove("rain");

        let outcome = store.append_at(&madrid, &payload, at(1, 12))?;
        let frame = read_log_as_text(&outcome.path)?;
        assert_eq!(frame.column(LogSchema::RAIN_1H)?.str()?.get(0), Some("0.0"));
        assert_eq!(frame.column(LogSchema::SNOW_1H)?.str()?.get(0), Some("0.0"));
        Ok(())
    }

    #[test]
    fn test_failed_migration_keeps_history() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let store = store_in(dir.path());
        let madrid = Location::new("Madrid", Some("ES"), None);
        let path = store.log_path(&madrid);
        let original = "timestamp,location\n2025-01-01T00:00:00,Madrid\n";
        fs::write(&path, original)?;

        let err = store.append_at(&madrid, &sample_payload(19.0), at(2, 12)).unwrap_err();
        assert!(matches!(
            err,
            RecordStoreError::Migration { source: MigrationError::MissingColumn(_), .. }
        ));
        assert_eq!(fs::read_to_string(&path)?, original);
        Ok(())
    }

    #[test]
    fn test_discard_moves_unreadable_log_aside() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let store = RecordStore::new(
            &Config::builder()
                .api_key("k")
                .data_dir(dir.path())
                .discard_unreadable_logs(true)
                .build(),
        );
        let madrid = Location::new("Madrid", Some("ES"), None);
        let path = store.log_path(&madrid);
        let original = "timestamp,location\n2025-01-01T00:00:00,Madrid\n";
        fs::write(&path, original)?;

        let outcome = store.append_at(&madrid, &sample_payload(19.0), at(2, 12))?;
        let LogChange::Discarded { backup } = outcome.change else {
            panic!("expected discarded log");
        };
        assert_eq!(fs::read_to_string(&backup)?, original);
        assert_eq!(row_count(&path), 1);
        Ok(())
    }

    #[test]
    fn test_partial_payload_is_rejected() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let store = store_in(dir.path());
        let madrid = Location::new("Madrid", Some("ES"), None);
        let mut payload = sample_payload(15.0);
        payload.as_object_mut().unwrap().remove("coord");

        let err = store.append_at(&madrid, &payload, at(1, 12)).unwrap_err();
        assert!(matches!(err, RecordStoreError::MissingField { ref key, .. } if key == "coord.lat"));
        assert!(!store.log_path(&madrid).exists());

        let err = store.append_at(&madrid, &Value::Null, at(1, 12)).unwrap_err();
        assert!(matches!(err, RecordStoreError::NoData { .. }));
        Ok(())
    }

    #[test]
    fn test_locations_do_not_share_logs() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let store = store_in(dir.path());
        let a = Location::new("San Juan", Some("PR"), None);
        let b = Location::new("Lugo", Some("ES"), None);

        store.append_at(&a, &sample_payload(28.0), at(1, 12))?;
        store.append_at(&b, &sample_payload(9.0), at(1, 12))?;
        store.append_at(&b, &sample_payload(9.5), at(1, 13))?;

        assert_eq!(row_count(&dir.path().join("San_Juan.csv")), 1);
        assert_eq!(row_count(&dir.path().join("Lugo.csv")), 2);
        Ok(())
    }
}
