mod aggregation;
mod clients;
mod config;
mod error;
mod forecast_model;
mod locations;
mod record_store;
mod runner;
mod summary;
mod types;
mod utils;

pub use config::*;
pub use error::{ConfigError, MeteologError};
pub use runner::*;

pub use clients::error::FetchError;
pub use clients::open_weather_client::{summarize_forecast, ForecastItem, OpenWeatherClient};
pub use clients::weather_source::WeatherSource;

pub use locations::error::LocationsError;
pub use locations::location_directory::{load_locations, parse_locations};

pub use record_store::error::{MigrationError, RecordStoreError};
pub use record_store::log_store::{AppendOutcome, LogChange, RecordStore};
pub use record_store::migration::{migrate_log, MigrationReport};

pub use aggregation::daily_aggregate::{aggregate_frame, aggregate_log, DailyAggregate};
pub use aggregation::error::AggregationError;

pub use forecast_model::error::RegressionError;
pub use forecast_model::evaluation::{evaluate_holdout, HoldoutReport};
pub use forecast_model::features::{lag_rows, tomorrow_features, TrainingRow, FEATURE_NAMES};
pub use forecast_model::predictor::{predict_tomorrow, TemperatureModel, DEFAULT_MIN_RECORDS};
pub use forecast_model::regression::LinearRegression;

pub use summary::error::PersistError;
pub use summary::forecast_summary::{write_forecast_summary, write_map_summary, ForecastSummary};

pub use types::forecast::{DailyForecast, ForecastResult, LocalForecast, LocationSummary};
pub use types::location::{LatLon, Location};
pub use types::log_schema::LogSchema;
pub use types::observation::{Observation, PayloadError};
