use std::path::PathBuf;
use thiserror::Error;

/// Failures of the persisted key/value state
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Failed to read state file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to write state file {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to serialize state: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Failures below the HTTP status line: no response was obtained at all
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Invalid request URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("{0}")]
    Http(#[from] reqwest::Error),

    #[error("{0}")]
    Network(String),
}

/// Everything that can go wrong talking to the practice service
#[derive(Debug, Error)]
pub enum ClientError {
    /// The service answered with a non-2xx status; carries the message to show
    #[error("{0}")]
    Service(String),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("Invalid response from service: {0}")]
    Decode(#[from] serde_json::Error),
}
