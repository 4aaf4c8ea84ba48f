use crate::trip_data::error::TripDataError;
use crate::types::month::YearMonthToken;
use futures_util::TryStreamExt;
use log::{info, warn};
use polars::prelude::*;
use reqwest::Client;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio_util::io::StreamReader;

pub const DEFAULT_BASE_URL: &str = "https://s3.amazonaws.com/ctbk";

pub struct TripDataLoader {
    cache_dir: PathBuf,
    base_url: String,
    download_client: Client,
}

impl TripDataLoader {
    pub fn new(cache_dir: &Path) -> TripDataLoader {
        Self::with_base_url(cache_dir, DEFAULT_BASE_URL)
    }

    pub fn with_base_url(cache_dir: &Path, base_url: &str) -> TripDataLoader {
        TripDataLoader {
            cache_dir: cache_dir.to_path_buf(),
            base_url: base_url.trim_end_matches('/').to_string(),
            download_client: Client::new(),
        }
    }

    /// File name of the monthly parquet file, both remotely and in the cache.
    ///
    /// Tokens carry a two digit year; the `20` century prefix is literal.
    pub(crate) fn file_name(token: &YearMonthToken) -> String {
        format!("20{}-citibike-tripdata.parquet", token)
    }

    pub(crate) fn url(&self, token: &YearMonthToken) -> String {
        format!("{}/{}", self.base_url, Self::file_name(token))
    }

    pub(crate) fn cache_path(&self, token: &YearMonthToken) -> PathBuf {
        self.cache_dir.join(Self::file_name(token))
    }

    /// Loads the trips of one month, downloading them first if they are not cached yet.
    pub async fn get_frame(&self, token: &YearMonthToken) -> Result<LazyFrame, TripDataError> {
        let parquet_path = self.cache_path(token);

        if fs::metadata(&parquet_path).await.is_ok() {
            info!("Cache hit for trips of {} at {:?}", token, parquet_path);
        } else {
            warn!("Cache miss for trips of {}. Downloading.", token);
            fs::create_dir_all(&self.cache_dir)
                .await
                .map_err(|e| TripDataError::CacheDirCreation(self.cache_dir.clone(), e))?;
            self.download(token, &parquet_path).await?;
            info!("Cached trips of {} to {:?}", token, parquet_path);
        }

        LazyFrame::scan_parquet(&parquet_path, Default::default())
            .map_err(|e| TripDataError::ParquetScan(parquet_path.clone(), e))
    }

    /// Streams the remote file to `<path>.part` and renames it into place once complete.
    async fn download(&self, token: &YearMonthToken, path: &Path) -> Result<(), TripDataError> {
        let url = self.url(token);
        info!("Downloading trips from {}", url);

        let response = self
            .download_client
            .get(&url)
            .send()
            .await
            .map_err(|e| TripDataError::NetworkRequest(url.clone(), e))?;

        let response = match response.error_for_status() {
            Ok(resp) => resp,
            Err(e) => {
                warn!("HTTP error for {}: {:?}", url, e);
                return Err(if let Some(status) = e.status() {
                    TripDataError::HttpStatus {
                        url,
                        status,
                        source: e,
                    }
                } else {
                    TripDataError::NetworkRequest(url, e)
                });
            }
        };

        let part_path = path.with_extension("parquet.part");
        let mut file = fs::File::create(&part_path)
            .await
            .map_err(|e| TripDataError::CacheWrite(part_path.clone(), e))?;

        let stream = response.bytes_stream().map_err(std::io::Error::other);
        let mut reader = StreamReader::new(stream);
        let written = match tokio::io::copy(&mut reader, &mut file).await {
            Ok(written) => written,
            Err(e) => {
                drop(file);
                let _ = fs::remove_file(&part_path).await;
                return Err(TripDataError::DownloadIo(e));
            }
        };
        drop(file);

        fs::rename(&part_path, path)
            .await
            .map_err(|e| TripDataError::CacheWrite(path.to_path_buf(), e))?;
        info!("Downloaded {} bytes of trips for {}", written, token);
        Ok(())
    }

    /// Removes every cached monthly trip file from the cache directory.
    pub async fn clear_all_cache(&self) -> Result<usize, TripDataError> {
        let mut entries = match fs::read_dir(&self.cache_dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(0),
            Err(e) => return Err(TripDataError::CacheDeletion(self.cache_dir.clone(), e)),
        };

        let mut removed = 0;
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| TripDataError::CacheDeletion(self.cache_dir.clone(), e))?
        {
            let name = entry.file_name();
            let is_trip_file = name
                .to_str()
                .is_some_and(|n| n.contains("-citibike-tripdata.parquet"));
            if is_trip_file {
                let path = entry.path();
                fs::remove_file(&path)
                    .await
                    .map_err(|e| TripDataError::CacheDeletion(path, e))?;
                removed += 1;
            }
        }
        Ok(removed)
    }
}
