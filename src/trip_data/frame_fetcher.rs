use crate::trip_data::error::TripDataError;
use crate::trip_data::loader::TripDataLoader;
use crate::types::month::YearMonthToken;
use polars::prelude::LazyFrame;
use std::collections::{hash_map::Entry, HashMap};
use std::path::Path;
use tokio::sync::Mutex;

pub struct FrameFetcher {
    loader: TripDataLoader,
    lazyframe_cache: Mutex<HashMap<YearMonthToken, LazyFrame>>,
}

impl FrameFetcher {
    pub fn new(cache_dir: &Path) -> Self {
        Self::from_loader(TripDataLoader::new(cache_dir))
    }

    pub fn from_loader(loader: TripDataLoader) -> Self {
        Self {
            loader,
            lazyframe_cache: Mutex::new(HashMap::new()),
        }
    }

    /// Gets the trips of one month, reusing a frame scanned earlier when possible.
    pub async fn get_cache_lazyframe(
        &self,
        token: &YearMonthToken,
    ) -> Result<LazyFrame, TripDataError> {
        {
            let cache = self.lazyframe_cache.lock().await;
            if let Some(cached) = cache.get(token) {
                return Ok(cached.clone());
            }
        }

        // Loading may download, so it happens outside the lock.
        let loaded_frame = self.loader.get_frame(token).await?;

        let mut cache = self.lazyframe_cache.lock().await;
        match cache.entry(token.clone()) {
            Entry::Occupied(entry) => Ok(entry.get().clone()),
            Entry::Vacant(entry) => {
                entry.insert(loaded_frame.clone());
                Ok(loaded_frame)
            }
        }
    }

    /// Forgets all scanned frames and deletes the cached files.
    pub async fn clear_cache(&self) -> Result<usize, TripDataError> {
        self.lazyframe_cache.lock().await.clear();
        self.loader.clear_all_cache().await
    }
}
