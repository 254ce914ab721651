use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LocationsError {
    #[error("Failed to read locations file '{0}'")]
    Read(PathBuf, #[source] std::io::Error),

    #[error("Failed to create default locations file '{0}'")]
    CreateDefault(PathBuf, #[source] std::io::Error),
}
