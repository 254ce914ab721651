use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Location '{0}' not found by the weather service")]
    NotFound(String),

    #[error("API key rejected by the weather service")]
    Unauthorized,

    #[error("HTTP request for {target} failed with status {status}")]
    HttpStatus {
        target: String,
        status: reqwest::StatusCode,
        #[source]
        source: reqwest::Error,
    },

    #[error("Network request failed for {0}")]
    Network(String, #[source] reqwest::Error),

    #[error("Could not decode the response for {0}")]
    Decode(String, #[source] reqwest::Error),
}
