//! Parses the configured list of locations.
//!
//! Each non-empty line not starting with `#` is either `name,region` or
//! `name,region,latitude,longitude`. Anything else is skipped with a warning.

use crate::locations::error::LocationsError;
use crate::types::location::{LatLon, Location};
use log::{info, warn};
use std::collections::HashSet;
use std::io;
use std::path::Path;

/// Entry written when the locations file does not exist yet.
pub const DEFAULT_LOCATION_LINE: &str = "Madrid,ES";

/// Loads the locations file, creating it with [`DEFAULT_LOCATION_LINE`] when missing.
pub async fn load_locations(path: &Path) -> Result<Vec<Location>, LocationsError> {
    let text = match tokio::fs::read_to_string(path).await {
        Ok(text) => text,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            warn!(
                "Locations file {} not found, creating it with '{}'",
                path.display(),
                DEFAULT_LOCATION_LINE
            );
            let content = format!("{}\n", DEFAULT_LOCATION_LINE);
            tokio::fs::write(path, &content)
                .await
                .map_err(|e| LocationsError::CreateDefault(path.to_path_buf(), e))?;
            content
        }
        Err(e) => return Err(LocationsError::Read(path.to_path_buf(), e)),
    };

    let locations = parse_locations(&text);
    info!("Loaded {} locations from {}", locations.len(), path.display());
    Ok(locations)
}

/// Parses location lines. Display names and log file names are unique: a
/// later line that repeats either is dropped.
pub fn parse_locations(text: &str) -> Vec<Location> {
    let mut seen = HashSet::new();
    let mut locations = Vec::new();

    for (line_no, raw) in text.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let Some(location) = parse_line(line, line_no + 1) else {
            continue;
        };
        if !seen.insert(location.display_name.clone()) {
            warn!(
                "Line {}: duplicate location '{}' ignored",
                line_no + 1,
                location.display_name
            );
            continue;
        }
        if let Some(owner) = locations
            .iter()
            .find(|known: &&Location| known.file_stem() == location.file_stem())
        {
            warn!(
                "Line {}: location '{}' would share the log of '{}', ignored",
                line_no + 1,
                location.display_name,
                owner.display_name
            );
            continue;
        }
        locations.push(location);
    }

    locations
}

fn parse_line(line: &str, line_no: usize) -> Option<Location> {
    let parts: Vec<&str> = line.split(',').map(str::trim).collect();
    match parts.as_slice() {
        [name, region] if !name.is_empty() => Some(Location::new(name, Some(*region), None)),
        [name, region, lat, lon] if !name.is_empty() => {
            let coordinates = match (lat.parse::<f64>(), lon.parse::<f64>()) {
                (Ok(lat), Ok(lon)) if (-90.0..=90.0).contains(&lat) && (-180.0..=180.0).contains(&lon) => {
                    Some(LatLon(lat, lon))
                }
                _ => {
                    warn!(
                        "Line {}: invalid coordinates '{},{}' for '{}', querying by name",
                        line_no, lat, lon, name
                    );
                    None
                }
            };
            Some(Location::new(name, Some(*region), coordinates))
        }
        _ => {
            warn!("Line {}: expected 'name,region[,lat,lon]', got '{}'", line_no, line);
            None
        }
    }
}
