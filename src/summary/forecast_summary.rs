//! The two documents written at the end of a run: per-location forecasts and
//! the map summary of where and how warm every observed location was.

use crate::summary::error::PersistError;
use crate::types::forecast::{ForecastResult, LocationSummary};
use crate::utils::write_atomically;
use log::info;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use std::path::Path;

/// Forecast results keyed by location display name, in processing order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ForecastSummary {
    entries: Vec<(String, ForecastResult)>,
}

impl ForecastSummary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a location. A name that is already present keeps its position and
    /// gets the new result.
    pub fn insert(&mut self, location: impl Into<String>, result: ForecastResult) {
        let location = location.into();
        match self.entries.iter_mut().find(|(name, _)| *name == location) {
            Some((_, existing)) => *existing = result,
            None => self.entries.push((location, result)),
        }
    }

    pub fn locations(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for ForecastSummary {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, result) in &self.entries {
            map.serialize_entry(name, result)?;
        }
        map.end()
    }
}

fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), PersistError> {
    let mut bytes = serde_json::to_vec_pretty(value).map_err(|e| PersistError::Encode(path.to_path_buf(), e))?;
    bytes.push(b'\n');
    write_atomically(path, &bytes).map_err(|e| PersistError::Write(path.to_path_buf(), e))
}

/// Replaces the forecast document at `path` with `summary`.
pub fn write_forecast_summary(path: &Path, summary: &ForecastSummary) -> Result<(), PersistError> {
    write_json(path, summary)?;
    info!("Wrote forecasts for {} locations to {}", summary.len(), path.display());
    Ok(())
}

/// Replaces the map document at `path` with one entry per observed location.
pub fn write_map_summary(path: &Path, locations: &[LocationSummary]) -> Result<(), PersistError> {
    write_json(path, locations)?;
    info!("Wrote {} map entries to {}", locations.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::forecast::{DailyForecast, LocalForecast};
    use chrono::NaiveDate;
    use serde_json::{json, Value};
    use std::fs;

    fn predicted() -> ForecastResult {
        ForecastResult {
            external_forecast: vec![DailyForecast {
                date: NaiveDate::from_ymd_opt(2025, 6, 2).unwrap(),
                max: 31.0,
                min: 19.5,
                mean: 25.2,
            }],
            local_forecast: LocalForecast::predicted(30.4, 18.9, 24.6, 21),
        }
    }

    #[test]
    fn test_keeps_processing_order() -> Result<(), Box<dyn std::error::Error>> {
        let mut summary = ForecastSummary::new();
        summary.insert("Zaragoza", ForecastResult::default());
        summary.insert("Alicante", predicted());
        summary.insert("Madrid", ForecastResult::default());
        summary.insert("Alicante", predicted());

        let text = serde_json::to_string(&summary)?;
        let zaragoza = text.find("Zaragoza").ok_or("missing")?;
        let alicante = text.find("Alicante").ok_or("missing")?;
        let madrid = text.find("Madrid").ok_or("missing")?;
        assert!(zaragoza < alicante && alicante < madrid);
        assert_eq!(summary.len(), 3);
        assert_eq!(summary.locations().collect::<Vec<_>>(), vec!["Zaragoza", "Alicante", "Madrid"]);
        Ok(())
    }

    #[test]
    fn test_writes_complete_document() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("forecasts.json");
        let mut summary = ForecastSummary::new();
        summary.insert("Madrid", predicted());
        summary.insert("Quito", ForecastResult::default());

        write_forecast_summary(&path, &summary)?;
        let written: Value = serde_json::from_str(&fs::read_to_string(&path)?)?;
        assert_eq!(
            written["Madrid"]["local_forecast"],
            json!({ "max": 30.4, "min": 18.9, "mean": 24.6, "sample_count": 21 })
        );
        assert_eq!(written["Madrid"]["external_forecast"][0]["date"], json!("2025-06-02"));
        assert_eq!(written["Quito"]["external_forecast"], json!([]));
        assert_eq!(
            written["Quito"]["local_forecast"],
            json!({ "max": null, "min": null, "mean": null, "sample_count": 0 })
        );
        Ok(())
    }

    #[test]
    fn test_map_summary_is_overwritten() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("city_locations.json");
        fs::write(&path, "[{\"location\": \"stale\"}]")?;

        let entries = vec![LocationSummary {
            location: "Madrid".to_string(),
            latitude: 40.4165,
            longitude: -3.7026,
            temperature: 21.5,
        }];
        write_map_summary(&path, &entries)?;

        let written: Value = serde_json::from_str(&fs::read_to_string(&path)?)?;
        assert_eq!(
            written,
            json!([{ "location": "Madrid", "latitude": 40.4165, "longitude": -3.7026, "temperature": 21.5 }])
        );
        Ok(())
    }

    #[test]
    fn test_unwritable_target_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("forecasts.json");
        let err = write_forecast_summary(&path, &ForecastSummary::new()).unwrap_err();
        assert!(matches!(err, PersistError::Write(ref p, _) if *p == path));
    }
}
