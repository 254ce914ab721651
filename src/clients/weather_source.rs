use crate::clients::error::FetchError;
use crate::types::forecast::DailyForecast;
use crate::types::location::Location;
use serde_json::Value;
use std::future::Future;

/// Provider of current observations and multi-day forecasts.
///
/// `current` hands back the raw observation document so that missing fields
/// are reported by the record store with their dotted key. `forecast` never
/// fails: any problem results in an empty list.
pub trait WeatherSource: Send + Sync {
    fn current(&self, location: &Location) -> impl Future<Output = Result<Value, FetchError>> + Send;

    fn forecast(&self, location: &Location) -> impl Future<Output = Vec<DailyForecast>> + Send;
}
