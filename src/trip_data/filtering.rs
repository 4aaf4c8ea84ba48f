use crate::trip_data::error::TripDataError;
use crate::types::station::{LatLon, StationId, StationRecord, StationSide};
use polars::prelude::{col, lit, DataType, Expr, LazyFrame};

/// Radius, in degrees, used when no other radius is requested. Roughly half a kilometre
/// in New York.
pub const DEFAULT_RADIUS_DEGREES: f64 = 0.005;

pub trait TripFrameFilterExt {
    /// Keeps trips that start or end within `radius_degrees` of `location`.
    ///
    /// Distance is the plain Euclidean distance between coordinates in degrees, not a
    /// great-circle distance. Rows with missing coordinates on both sides are dropped.
    ///
    /// # Arguments
    /// * `location`: The center of the search area.
    /// * `radius_degrees`: Maximum distance in degrees (inclusive).
    fn filter_near(self, location: LatLon, radius_degrees: f64) -> LazyFrame;

    /// Collects the id and coordinates of the `side` station of every trip.
    ///
    /// Rows where any of the three fields is null are skipped. Duplicates are kept;
    /// the ZIP code resolver deduplicates on its own.
    fn station_records(self, side: StationSide) -> Result<Vec<StationRecord>, TripDataError>;
}

fn within(side: StationSide, location: LatLon, radius_degrees: f64) -> Expr {
    let d_lat = col(side.latitude_column()) - lit(location.latitude());
    let d_lon = col(side.longitude_column()) - lit(location.longitude());
    // Compare squared distances to skip the square root.
    (d_lat.clone() * d_lat + d_lon.clone() * d_lon).lt_eq(lit(radius_degrees * radius_degrees))
}

impl TripFrameFilterExt for LazyFrame {
    fn filter_near(self, location: LatLon, radius_degrees: f64) -> LazyFrame {
        self.filter(
            within(StationSide::Start, location, radius_degrees).or(within(
                StationSide::End,
                location,
                radius_degrees,
            )),
        )
    }

    fn station_records(self, side: StationSide) -> Result<Vec<StationRecord>, TripDataError> {
        let frame = self
            .select([
                col(side.id_column())
                    .cast(DataType::Int64)
                    .alias("station_id"),
                col(side.latitude_column())
                    .cast(DataType::Float64)
                    .alias("latitude"),
                col(side.longitude_column())
                    .cast(DataType::Float64)
                    .alias("longitude"),
            ])
            .collect()?;

        let ids = frame.column("station_id")?.i64()?;
        let latitudes = frame.column("latitude")?.f64()?;
        let longitudes = frame.column("longitude")?.f64()?;

        Ok(ids
            .into_iter()
            .zip(latitudes)
            .zip(longitudes)
            .filter_map(|((id, lat), lon)| {
                Some(StationRecord {
                    id: StationId(id?),
                    location: LatLon(lat?, lon?),
                })
            })
            .collect())
    }
}
