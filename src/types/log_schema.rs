//! Defines the known layouts of the per-location historical log and the
//! default values used when an older layout is upgraded.

use std::fmt;

/// A layout of the historical log, identified by its header row.
///
/// The header row of a log file is the authoritative marker of its layout.
/// Every layout ever written is listed here so that a stale log can be
/// recognised by name, not only by width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogSchema {
    /// First layout: observation basics without cloud, visibility or precipitation data.
    Legacy,
    /// Current layout with cloudiness, visibility and 1h rain/snow columns appended.
    Current,
    /// [`Legacy`](LogSchema::Legacy) columns under the Spanish names used by
    /// the first collector (`fecha_hora`, `ciudad`, ...).
    CollectorLegacy,
    /// [`Current`](LogSchema::Current) columns under the Spanish collector names.
    Collector,
}

/// Column names of the current layout, in order.
const CURRENT_COLUMNS: [&str; 15] = [
    LogSchema::TIMESTAMP,
    LogSchema::LOCATION,
    LogSchema::TEMPERATURE,
    LogSchema::FEELS_LIKE,
    LogSchema::TEMP_MIN,
    LogSchema::TEMP_MAX,
    LogSchema::HUMIDITY,
    LogSchema::WIND,
    LogSchema::DESCRIPTION,
    LogSchema::LAT,
    LogSchema::LON,
    LogSchema::CLOUDINESS,
    LogSchema::VISIBILITY,
    LogSchema::RAIN_1H,
    LogSchema::SNOW_1H,
];

/// The same columns as written by the Spanish collector, position for position.
const COLLECTOR_COLUMNS: [&str; 15] = [
    "fecha_hora",
    "ciudad",
    "temperatura_c",
    "sensacion_c",
    "temp_min_c",
    "temp_max_c",
    "humedad_porc",
    "viento_kmh",
    "descripcion",
    "lat",
    "lon",
    "nubosidad_porc",
    "visibilidad_m",
    "lluvia_1h",
    "nieve_1h",
];

/// Number of columns every layout starts with.
const BASE_WIDTH: usize = 11;

impl LogSchema {
    pub const TIMESTAMP: &'static str = "timestamp";
    pub const LOCATION: &'static str = "location";
    pub const TEMPERATURE: &'static str = "temperature_c";
    pub const FEELS_LIKE: &'static str = "feels_like_c";
    pub const TEMP_MIN: &'static str = "temp_min_c";
    pub const TEMP_MAX: &'static str = "temp_max_c";
    pub const HUMIDITY: &'static str = "humidity_pct";
    pub const WIND: &'static str = "wind_kmh";
    pub const DESCRIPTION: &'static str = "description";
    pub const LAT: &'static str = "lat";
    pub const LON: &'static str = "lon";
    pub const CLOUDINESS: &'static str = "cloudiness_pct";
    pub const VISIBILITY: &'static str = "visibility_m";
    pub const RAIN_1H: &'static str = "rain_1h";
    pub const SNOW_1H: &'static str = "snow_1h";

    const ALL: [LogSchema; 4] = [
        LogSchema::Current,
        LogSchema::Legacy,
        LogSchema::Collector,
        LogSchema::CollectorLegacy,
    ];

    pub fn column_names(&self) -> Vec<&'static str> {
        let names: &[&'static str] = match self {
            LogSchema::Legacy => &CURRENT_COLUMNS[..BASE_WIDTH],
            LogSchema::Current => &CURRENT_COLUMNS,
            LogSchema::CollectorLegacy => &COLLECTOR_COLUMNS[..BASE_WIDTH],
            LogSchema::Collector => &COLLECTOR_COLUMNS,
        };
        names.to_vec()
    }

    pub fn width(&self) -> usize {
        self.column_names().len()
    }

    /// Identifies a known layout from a parsed header row.
    pub fn detect(header: &[String]) -> Option<LogSchema> {
        Self::ALL
            .into_iter()
            .find(|schema| header.iter().map(String::as_str).eq(schema.column_names()))
    }

    /// Name a column of any known layout has in the current layout.
    ///
    /// ```
    /// use meteolog::LogSchema;
    ///
    /// assert_eq!(LogSchema::current_name("humedad_porc"), Some(LogSchema::HUMIDITY));
    /// assert_eq!(LogSchema::current_name("humidity_pct"), Some(LogSchema::HUMIDITY));
    /// assert_eq!(LogSchema::current_name("pressure_hpa"), None);
    /// ```
    pub fn current_name(column: &str) -> Option<&'static str> {
        CURRENT_COLUMNS
            .iter()
            .position(|name| *name == column)
            .or_else(|| COLLECTOR_COLUMNS.iter().position(|name| *name == column))
            .map(|i| CURRENT_COLUMNS[i])
    }

    /// Textual default written into a column that an older layout lacks.
    ///
    /// Returns `None` for columns that every layout has, which therefore
    /// cannot be invented during an upgrade.
    pub fn default_cell(column: &str) -> Option<&'static str> {
        match column {
            Self::CLOUDINESS => Some("0"),
            Self::VISIBILITY => Some("10000"),
            Self::RAIN_1H => Some("0.0"),
            Self::SNOW_1H => Some("0.0"),
            _ => None,
        }
    }
}

impl fmt::Display for LogSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogSchema::Legacy => write!(f, "legacy ({} columns)", self.width()),
            LogSchema::Current => write!(f, "current ({} columns)", self.width()),
            LogSchema::CollectorLegacy => write!(f, "collector legacy ({} columns)", self.width()),
            LogSchema::Collector => write!(f, "collector ({} columns)", self.width()),
        }
    }
}
