use polars::error::PolarsError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GeocodeError {
    #[error("Invalid coordinates ({latitude}, {longitude})")]
    InvalidCoordinates { latitude: f64, longitude: f64 },

    #[error("Failed to build geocoding client")]
    ClientBuild(#[source] reqwest::Error),

    #[error("Network request failed for {0}")]
    NetworkRequest(String, #[source] reqwest::Error),

    #[error("HTTP request failed for {url} with status {status}")]
    HttpStatus {
        url: String,
        status: reqwest::StatusCode,
        #[source]
        source: reqwest::Error,
    },

    #[error("Failed to parse geocoding response")]
    JsonParse(#[from] serde_json::Error),
}

impl GeocodeError {
    /// Whether this error invalidates the whole batch of lookups rather than one station.
    pub fn is_batch_fatal(&self) -> bool {
        matches!(
            self,
            GeocodeError::InvalidCoordinates { .. } | GeocodeError::ClientBuild(_)
        )
    }
}

#[derive(Debug, Error)]
pub enum MappingFileError {
    #[error("Failed to read ZIP code mapping '{0}'")]
    Read(PathBuf, #[source] PolarsError),

    #[error("Failed to write ZIP code mapping '{0}'")]
    Write(PathBuf, #[source] std::io::Error),

    #[error("Failed to encode ZIP code mapping '{0}'")]
    Encode(PathBuf, #[source] PolarsError),

    #[error("Invalid station id '{value}' in '{path}'")]
    InvalidStationId { path: PathBuf, value: String },

    #[error("Failed processing DataFrame: {0}")]
    DataFrameProcessing(#[from] PolarsError),
}
