//! This module provides the main entry point: the [`CitiBike`] client. It fetches
//! monthly trip data (optionally narrowed to trips near a location) and enriches
//! stations with ZIP codes.

use crate::error::CitiBikeError;
use crate::trip_data::error::TripDataError;
use crate::trip_data::filtering::{TripFrameFilterExt, DEFAULT_RADIUS_DEGREES};
use crate::trip_data::frame_fetcher::FrameFetcher;
use crate::trip_data::loader::TripDataLoader;
use crate::types::month::{month_range, Month};
use crate::types::station::{LatLon, StationRecord};
use crate::types::zip_code::ZipCodeMapping;
use crate::utils::{ensure_cache_dir_exists, get_cache_dir};
use crate::zip_codes::mapping_file::{load_mapping, save_mapping};
use crate::zip_codes::nominatim::{NominatimConfig, NominatimGeocoder};
use crate::zip_codes::overrides::overlay_overrides;
use crate::zip_codes::resolver::ZipCodeResolver;
use bon::bon;
use log::warn;
use polars::prelude::{concat, LazyFrame, UnionArgs};
use std::path::{Path, PathBuf};
use tokio::task;

/// First month fetched when no start is given.
pub const DEFAULT_START: Month = Month(2016, 4);
/// Month at which fetching stops (exclusive) when no end is given.
pub const DEFAULT_END: Month = Month(2021, 4);

/// The main client struct for accessing Citi Bike trip data.
///
/// Monthly trip files are downloaded once and kept in a cache folder; later requests
/// for the same month read the cached parquet file.
///
/// Create an instance using [`CitiBike::new()`] for the default cache directory or
/// [`CitiBike::with_cache_folder()`] for a custom one.
///
/// # Examples
///
/// ```rust,no_run
/// # use citibike::{CitiBike, CitiBikeError};
/// # async fn run() -> Result<(), CitiBikeError> {
/// let client = CitiBike::new().await?;
/// # Ok(())
/// # }
/// ```
pub struct CitiBike {
    fetcher: FrameFetcher,
    cache_folder: PathBuf,
    geocoder_config: NominatimConfig,
}

#[bon]
impl CitiBike {
    /// Creates a new client that caches downloads in `cache_folder`.
    ///
    /// The directory is created if it doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns [`CitiBikeError::CacheDirCreation`] if the directory cannot be created.
    pub async fn with_cache_folder(cache_folder: PathBuf) -> Result<Self, CitiBikeError> {
        ensure_cache_dir_exists(&cache_folder)
            .await
            .map_err(|e| CitiBikeError::CacheDirCreation(cache_folder.clone(), e))?;
        Ok(Self {
            fetcher: FrameFetcher::new(&cache_folder),
            cache_folder,
            geocoder_config: NominatimConfig::default(),
        })
    }

    /// Creates a new client using the default cache directory
    /// (e.g. `~/.cache/citibike_rs_cache` on Linux).
    ///
    /// # Errors
    ///
    /// Returns [`CitiBikeError::CacheDirResolution`] if the system cache directory is unknown,
    /// or [`CitiBikeError::CacheDirCreation`] if it cannot be created.
    pub async fn new() -> Result<Self, CitiBikeError> {
        let cache_folder = get_cache_dir().map_err(CitiBikeError::CacheDirResolution)?;
        Self::with_cache_folder(cache_folder).await
    }

    /// Fetches monthly files from `base_url` instead of the public Citi Bike bucket.
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.fetcher =
            FrameFetcher::from_loader(TripDataLoader::with_base_url(&self.cache_folder, base_url));
        self
    }

    /// Sets how [`CitiBike::update_zip_codes`] talks to Nominatim.
    pub fn with_geocoder_config(mut self, config: NominatimConfig) -> Self {
        self.geocoder_config = config;
        self
    }

    pub fn cache_folder(&self) -> &Path {
        &self.cache_folder
    }

    /// Fetches all trips of the months from `start` up to, but not including, `end`.
    ///
    /// Months are fetched one after the other and concatenated.
    ///
    /// # Arguments
    ///
    /// * `.start(Month)`: Optional. First month to fetch. Defaults to April 2016.
    /// * `.end(Month)`: Optional. Month at which to stop, exclusive. Defaults to April 2021.
    ///
    /// # Errors
    ///
    /// Returns [`CitiBikeError::TripData`] if the range holds no month, or if downloading
    /// or reading a month fails.
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// # use citibike::{CitiBike, CitiBikeError, Month};
    /// # #[tokio::main]
    /// # async fn main() -> Result<(), CitiBikeError> {
    /// let client = CitiBike::new().await?;
    /// let spring = client
    ///     .trips()
    ///     .start(Month::new(4, 2020))
    ///     .end(Month::new(6, 2020))
    ///     .call()
    ///     .await?
    ///     .collect()?;
    /// println!("{} trips in April and May 2020", spring.height());
    /// # Ok(())
    /// # }
    /// ```
    #[builder]
    pub async fn trips(
        &self,
        start: Option<Month>,
        end: Option<Month>,
    ) -> Result<LazyFrame, CitiBikeError> {
        let start = start.unwrap_or(DEFAULT_START);
        let end = end.unwrap_or(DEFAULT_END);
        Ok(self.collect_months(start, end, None).await?)
    }

    /// Fetches the trips that start or end near `location`.
    ///
    /// Same as [`CitiBike::trips`], with each month narrowed by
    /// [`TripFrameFilterExt::filter_near`] before concatenation.
    ///
    /// # Arguments
    ///
    /// * `.location(LatLon)`: **Required.** Center of the area of interest.
    /// * `.radius_degrees(f64)`: Optional. Maximum distance in degrees. Defaults to `0.005`.
    /// * `.start(Month)`, `.end(Month)`: Optional. As for [`CitiBike::trips`].
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// # use citibike::{CitiBike, CitiBikeError, LatLon, Month};
    /// # #[tokio::main]
    /// # async fn main() -> Result<(), CitiBikeError> {
    /// let client = CitiBike::new().await?;
    /// let local = client
    ///     .local_trips()
    ///     .location(LatLon(40.7116453, -73.9513869))
    ///     .start(Month::new(1, 2020))
    ///     .end(Month::new(1, 2021))
    ///     .call()
    ///     .await?
    ///     .collect()?;
    /// println!("{} local trips in 2020", local.height());
    /// # Ok(())
    /// # }
    /// ```
    #[builder]
    pub async fn local_trips(
        &self,
        location: LatLon,
        radius_degrees: Option<f64>,
        start: Option<Month>,
        end: Option<Month>,
    ) -> Result<LazyFrame, CitiBikeError> {
        let radius_degrees = radius_degrees.unwrap_or(DEFAULT_RADIUS_DEGREES);
        let start = start.unwrap_or(DEFAULT_START);
        let end = end.unwrap_or(DEFAULT_END);
        Ok(self
            .collect_months(start, end, Some((location, radius_degrees)))
            .await?)
    }

    async fn collect_months(
        &self,
        start: Month,
        end: Month,
        near: Option<(LatLon, f64)>,
    ) -> Result<LazyFrame, TripDataError> {
        let tokens = month_range(start, end);
        if tokens.is_empty() {
            return Err(TripDataError::EmptyRange { start, end });
        }

        let mut frames = Vec::with_capacity(tokens.len());
        for token in &tokens {
            let frame = self.fetcher.get_cache_lazyframe(token).await?;
            frames.push(match near {
                Some((location, radius_degrees)) => frame.filter_near(location, radius_degrees),
                None => frame,
            });
        }
        Ok(concat(frames, UnionArgs::default())?)
    }

    /// Adds ZIP codes for stations in `records` that `mapping` does not know yet,
    /// looking them up on Nominatim, and applies the manual overrides.
    ///
    /// Lookups are blocking and sequential, so they run on a blocking task. Lookup
    /// problems never fail this call: they leave [`crate::UNKNOWN_ZIP_CODE`] behind, or
    /// skip the lookups of this call altogether.
    pub async fn update_zip_codes(
        &self,
        records: Vec<StationRecord>,
        mapping: ZipCodeMapping,
    ) -> Result<ZipCodeMapping, CitiBikeError> {
        let config = self.geocoder_config.clone();
        let mapping = task::spawn_blocking(move || match NominatimGeocoder::new(config) {
            Ok(geocoder) => ZipCodeResolver::new(geocoder).resolve(&records, mapping),
            Err(e) => {
                warn!("No new ZIP codes: could not set up geocoder: {}", e);
                overlay_overrides(mapping)
            }
        })
        .await?;
        Ok(mapping)
    }

    /// Loads the mapping stored at `path`, updates it like [`CitiBike::update_zip_codes`]
    /// and writes it back.
    pub async fn update_zip_code_file(
        &self,
        records: Vec<StationRecord>,
        path: &Path,
    ) -> Result<ZipCodeMapping, CitiBikeError> {
        let path_buf = path.to_path_buf();
        let mapping = task::spawn_blocking(move || load_mapping(&path_buf)).await??;
        let mapping = self.update_zip_codes(records, mapping).await?;

        let path_buf = path.to_path_buf();
        let to_save = mapping.clone();
        task::spawn_blocking(move || save_mapping(&to_save, &path_buf)).await??;
        Ok(mapping)
    }

    /// Deletes every cached monthly file, returning how many were removed.
    pub async fn clear_cache(&self) -> Result<usize, CitiBikeError> {
        Ok(self.fetcher.clear_cache().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::station::{StationId, StationSide};
    use crate::types::zip_code::ZipCode;
    use crate::zip_codes::overrides::MANUAL_ZIP_CODE_OVERRIDES;
    use polars::prelude::*;

    const WILLIAMSBURG: LatLon = LatLon(40.7116453, -73.9513869);

    /// Writes a month of trips straight into the cache so no download happens.
    fn seed_month(dir: &Path, month: Month, mut trips: DataFrame) {
        let path = dir.join(format!("20{}-citibike-tripdata.parquet", month.token()));
        let file = std::fs::File::create(path).expect("cache file");
        ParquetWriter::new(file)
            .finish(&mut trips)
            .expect("parquet write");
    }

    fn month_of_trips(ids: [i64; 2], latitudes: [f64; 2]) -> DataFrame {
        df!(
            "Start Station ID" => ids,
            "Start Station Latitude" => latitudes,
            "Start Station Longitude" => [-73.9520, -73.9520],
            "End Station ID" => [3002i64, 3002],
            "End Station Latitude" => [40.7115, 40.7115],
            "End Station Longitude" => [-74.0120, -74.0120]
        )
        .expect("trips frame")
    }

    async fn seeded_client() -> (tempfile::TempDir, CitiBike) {
        let dir = tempfile::tempdir().expect("temp dir");
        seed_month(
            dir.path(),
            Month::new(12, 2019),
            month_of_trips([3092, 72], [40.7130, 40.7673]),
        );
        seed_month(
            dir.path(),
            Month::new(1, 2020),
            month_of_trips([3093, 3092], [40.7116, 40.7130]),
        );
        let client = CitiBike::with_cache_folder(dir.path().to_path_buf())
            .await
            .expect("client");
        (dir, client)
    }

    #[tokio::test]
    async fn test_trips_concatenates_cached_months() -> Result<(), CitiBikeError> {
        let (_dir, client) = seeded_client().await;
        let trips = client
            .trips()
            .start(Month::new(12, 2019))
            .end(Month::new(2, 2020))
            .call()
            .await?
            .collect()?;
        assert_eq!(trips.height(), 4);
        Ok(())
    }

    #[tokio::test]
    async fn test_local_trips_filters_each_month() -> Result<(), CitiBikeError> {
        let (_dir, client) = seeded_client().await;
        let local = client
            .local_trips()
            .location(WILLIAMSBURG)
            .start(Month::new(12, 2019))
            .end(Month::new(2, 2020))
            .call()
            .await?;

        let records = local.station_records(StationSide::Start)?;
        let ids: Vec<i64> = records.iter().map(|r| r.id.0).collect();
        assert_eq!(ids, [3092, 3093, 3092]);
        Ok(())
    }

    #[tokio::test]
    async fn test_empty_range_is_an_error() {
        let (_dir, client) = seeded_client().await;
        let result = client
            .trips()
            .start(Month::new(1, 2021))
            .end(Month::new(1, 2021))
            .call()
            .await;
        assert!(matches!(
            result,
            Err(CitiBikeError::TripData(TripDataError::EmptyRange { .. }))
        ));
    }

    #[tokio::test]
    async fn test_clear_cache_removes_months() -> Result<(), CitiBikeError> {
        let (dir, client) = seeded_client().await;
        assert_eq!(client.clear_cache().await?, 2);
        assert_eq!(std::fs::read_dir(dir.path()).expect("cache dir").count(), 0);
        Ok(())
    }

    #[tokio::test]
    async fn test_update_zip_code_file_without_new_stations() -> Result<(), CitiBikeError> {
        let (dir, client) = seeded_client().await;
        let path = dir.path().join("zip_codes.csv");
        let known: ZipCodeMapping = [(StationId(3092), ZipCode::from("11211"))]
            .into_iter()
            .collect();
        save_mapping(&known, &path)?;

        // Every station is already known, so nothing is sent to Nominatim.
        let records = vec![
            StationRecord::new(3092, WILLIAMSBURG),
            StationRecord::new(150, LatLon(40.7247, -73.9812)),
        ];
        let mapping = client
            .update_zip_codes(records.clone(), overlay_overrides(known))
            .await?;
        assert_eq!(mapping.len(), MANUAL_ZIP_CODE_OVERRIDES.len() + 1);

        let from_file = client.update_zip_code_file(records[..1].to_vec(), &path).await?;
        assert_eq!(from_file, mapping);
        assert_eq!(load_mapping(&path)?, mapping);
        Ok(())
    }

    #[tokio::test]
    #[ignore = "downloads monthly trip files"]
    async fn test_local_trips_remote() -> Result<(), CitiBikeError> {
        let client = CitiBike::new().await?;
        let local = client
            .local_trips()
            .location(WILLIAMSBURG)
            .start(Month::new(4, 2016))
            .end(Month::new(5, 2016))
            .call()
            .await?
            .collect()?;
        assert!(local.height() > 0);
        Ok(())
    }
}
