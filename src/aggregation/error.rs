use polars::error::PolarsError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AggregationError {
    #[error("Failed to read log '{0}'")]
    LogRead(PathBuf, #[source] PolarsError),

    #[error("Log is missing required column '{0}'")]
    MissingColumn(String),

    #[error("Failed processing DataFrame: {0}")]
    DataFrameProcessing(#[from] PolarsError),
}
