use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("Failed to encode summary for '{0}'")]
    Encode(PathBuf, #[source] serde_json::Error),

    #[error("Failed to write summary file '{0}'")]
    Write(PathBuf, #[source] std::io::Error),
}
