//! Reading and writing the station → ZIP code mapping as a two column CSV file
//! (`station_id,zip_code`).

use crate::types::station::StationId;
use crate::types::zip_code::{ZipCode, ZipCodeMapping};
use crate::zip_codes::error::MappingFileError;
use log::info;
use polars::prelude::*;
use std::path::Path;
use tempfile::NamedTempFile;

const STATION_ID_COLUMN: &str = "station_id";
const ZIP_CODE_COLUMN: &str = "zip_code";

/// Loads a mapping written by [`save_mapping`]. A missing file is an empty mapping.
///
/// All columns are read as text so ZIP codes such as `"02139"` keep their leading zero.
pub fn load_mapping(path: &Path) -> Result<ZipCodeMapping, MappingFileError> {
    if !path.exists() {
        info!("No ZIP code mapping at {:?}, starting empty", path);
        return Ok(ZipCodeMapping::new());
    }

    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(0))
        .try_into_reader_with_file_path(Some(path.to_path_buf()))
        .map_err(|e| MappingFileError::Read(path.to_path_buf(), e))?
        .finish()
        .map_err(|e| MappingFileError::Read(path.to_path_buf(), e))?;

    let ids = df.column(STATION_ID_COLUMN)?.str()?;
    let zips = df.column(ZIP_CODE_COLUMN)?.str()?;

    let mut mapping = ZipCodeMapping::new();
    for (id, zip) in ids.into_iter().zip(zips) {
        let (Some(id), Some(zip)) = (id, zip) else {
            continue;
        };
        let id = id
            .trim()
            .parse::<i64>()
            .map_err(|_| MappingFileError::InvalidStationId {
                path: path.to_path_buf(),
                value: id.to_string(),
            })?;
        mapping.insert(StationId(id), ZipCode::new(zip));
    }
    info!("Loaded {} ZIP codes from {:?}", mapping.len(), path);
    Ok(mapping)
}

/// Writes `mapping` to `path`, sorted by station id, replacing any existing file.
///
/// The file is written next to `path` first and moved into place once complete.
pub fn save_mapping(mapping: &ZipCodeMapping, path: &Path) -> Result<(), MappingFileError> {
    let (ids, zips): (Vec<i64>, Vec<String>) = mapping
        .iter()
        .map(|(id, zip)| (id.0, zip.as_str().to_string()))
        .unzip();
    let mut df = df!(STATION_ID_COLUMN => ids, ZIP_CODE_COLUMN => zips)?;

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut temp_file = NamedTempFile::new_in(dir)
        .map_err(|e| MappingFileError::Write(path.to_path_buf(), e))?;
    CsvWriter::new(&mut temp_file)
        .include_header(true)
        .finish(&mut df)
        .map_err(|e| MappingFileError::Encode(path.to_path_buf(), e))?;
    temp_file
        .persist(path)
        .map_err(|e| MappingFileError::Write(path.to_path_buf(), e.error))?;

    info!("Saved {} ZIP codes to {:?}", mapping.len(), path);
    Ok(())
}
