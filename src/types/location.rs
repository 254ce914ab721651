//! Defines the tracked [`Location`] and its optional geographical coordinate.

use serde::Serialize;

/// Represents a geographical coordinate using latitude and longitude.
///
/// Latitude is the first element (index 0), and longitude is the second (index 1).
///
/// # Examples
///
/// ```
/// use meteolog::LatLon;
///
/// let leon = LatLon(42.5984, -5.5719);
/// assert_eq!(leon.0, 42.5984); // Latitude
/// assert_eq!(leon.1, -5.5719); // Longitude
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LatLon(pub f64, pub f64);

/// One place being tracked.
///
/// `display_name` is the unique key of the location: it names the historical log
/// file and keys the forecast summary. `query_name` (name plus optional region
/// code, e.g. `"León,ES"`) is only used when asking the weather service.
#[derive(Debug, Clone, PartialEq)]
pub struct Location {
    pub display_name: String,
    pub query_name: String,
    pub coordinates: Option<LatLon>,
}

impl Location {
    /// Builds a location from a name, an optional region code and optional coordinates.
    ///
    /// ```
    /// use meteolog::{LatLon, Location};
    ///
    /// let madrid = Location::new("Madrid", Some("ES"), None);
    /// assert_eq!(madrid.display_name, "Madrid");
    /// assert_eq!(madrid.query_name, "Madrid,ES");
    ///
    /// let leon = Location::new("León", Some("ES"), Some(LatLon(42.5984, -5.5719)));
    /// assert!(leon.coordinates.is_some());
    /// ```
    pub fn new(name: &str, region: Option<&str>, coordinates: Option<LatLon>) -> Self {
        let name = name.trim();
        let query_name = match region.map(str::trim).filter(|r| !r.is_empty()) {
            Some(region) => format!("{},{}", name, region),
            None => name.to_string(),
        };
        Self {
            display_name: name.to_string(),
            query_name,
            coordinates,
        }
    }

    /// File-system safe version of the display name: every character that is
    /// not alphanumeric becomes an underscore.
    ///
    /// ```
    /// use meteolog::Location;
    ///
    /// let location = Location::new("San Sebastián de los Reyes", Some("ES"), None);
    /// assert_eq!(location.file_stem(), "San_Sebastián_de_los_Reyes");
    /// ```
    pub fn file_stem(&self) -> String {
        self.display_name
            .chars()
            .map(|c| if c.is_alphanumeric() { c } else { '_' })
            .collect()
    }
}
