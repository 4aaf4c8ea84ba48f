use crate::trip_data::error::TripDataError;
use log::info;
use polars::prelude::*;
use std::path::Path;
use tokio::task;

/// Collects `frame` and writes it, with a header row, to a CSV file at `path`.
///
/// Collecting and writing are blocking, so both run on a blocking task.
pub async fn write_trips_csv(frame: LazyFrame, path: &Path) -> Result<usize, TripDataError> {
    let path_buf = path.to_path_buf();
    task::spawn_blocking(move || {
        let mut df = frame.collect()?;
        let file = std::fs::File::create(&path_buf)
            .map_err(|e| TripDataError::CacheWrite(path_buf.clone(), e))?;
        CsvWriter::new(file)
            .include_header(true)
            .finish(&mut df)
            .map_err(|e| TripDataError::CsvWrite(path_buf.clone(), e))?;
        info!("Wrote {} trips to {:?}", df.height(), path_buf);
        Ok::<usize, TripDataError>(df.height())
    })
    .await?
}
