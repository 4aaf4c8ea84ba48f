use crate::trip_data::error::TripDataError;
use crate::zip_codes::error::{GeocodeError, MappingFileError};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CitiBikeError {
    #[error(transparent)]
    TripData(#[from] TripDataError),

    #[error(transparent)]
    Geocode(#[from] GeocodeError),

    #[error(transparent)]
    MappingFile(#[from] MappingFileError),

    #[error("Failed to create cache directory '{0}'")]
    CacheDirCreation(PathBuf, #[source] std::io::Error),

    #[error("Failed to determine cache directory")]
    CacheDirResolution(#[source] std::io::Error),

    #[error("Failed processing DataFrame: {0}")]
    PolarsError(#[from] polars::error::PolarsError),

    #[error("Background task failed to complete")]
    TaskJoin(#[from] tokio::task::JoinError),
}
