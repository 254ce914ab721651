use crate::types::observation::PayloadError;
use polars::error::PolarsError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RecordStoreError {
    #[error("No observation data to store for '{location}'")]
    NoData { location: String },

    #[error("Required field '{key}' missing from observation for '{location}'")]
    MissingField { location: String, key: String },

    #[error("Failed to create data directory '{0}'")]
    DataDirCreation(PathBuf, #[source] std::io::Error),

    #[error("Failed to read header of log '{0}'")]
    HeaderRead(PathBuf, #[source] std::io::Error),

    #[error("I/O error appending to log '{0}'")]
    AppendIo(PathBuf, #[source] std::io::Error),

    #[error("Encoding error appending to log '{0}'")]
    AppendEncode(PathBuf, #[source] PolarsError),

    #[error("Failed to migrate log '{path}' to the current layout")]
    Migration {
        path: PathBuf,
        #[source]
        source: MigrationError,
    },

    #[error("Failed to move unreadable log '{0}' aside")]
    Discard(PathBuf, #[source] std::io::Error),
}

impl RecordStoreError {
    pub(crate) fn from_payload(location: &str, error: PayloadError) -> Self {
        match error {
            PayloadError::NoData => RecordStoreError::NoData {
                location: location.to_string(),
            },
            PayloadError::MissingField(key) => RecordStoreError::MissingField {
                location: location.to_string(),
                key,
            },
        }
    }
}

/// Reasons a stale log could not be rewritten. The original file is left
/// untouched in every case.
#[derive(Debug, Error)]
pub enum MigrationError {
    #[error("Failed to parse existing log")]
    Read(#[source] PolarsError),

    #[error("Existing log lacks column '{0}', which has no default value")]
    MissingColumn(String),

    #[error("Existing log has columns unknown to the current layout: {0:?}")]
    UnknownColumns(Vec<String>),

    #[error("Existing log has the same column under several names: {0:?}")]
    DuplicateColumns(Vec<String>),

    #[error("Failed reshaping log frame")]
    Reshape(#[source] PolarsError),

    #[error("Row count changed during migration ({before} before, {after} after)")]
    RowCountMismatch { before: usize, after: usize },

    #[error("I/O error writing migrated copy")]
    TempWriteIo(#[source] std::io::Error),

    #[error("Encoding error writing migrated copy")]
    TempWriteEncode(#[source] PolarsError),

    #[error("Failed to replace log with migrated copy")]
    Replace(#[source] tempfile::PersistError),
}
