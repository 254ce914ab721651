use crate::aggregation::error::AggregationError;
use crate::clients::error::FetchError;
use crate::forecast_model::error::RegressionError;
use crate::locations::error::LocationsError;
use crate::record_store::error::RecordStoreError;
use crate::summary::error::PersistError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MeteologError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Locations(#[from] LocationsError),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    RecordStore(#[from] RecordStoreError),

    #[error(transparent)]
    Aggregation(#[from] AggregationError),

    #[error(transparent)]
    Regression(#[from] RegressionError),

    #[error(transparent)]
    Persist(#[from] PersistError),

    #[error("Background task failed to complete")]
    TaskJoin(#[from] tokio::task::JoinError),
}

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("Environment variable {0} is not set")]
    MissingApiKey(&'static str),
}
