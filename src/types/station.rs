//! Defines the data structures representing bike-share stations as they appear in trip
//! records: identifiers, coordinates, and which side of a trip they belong to.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::fmt::{Display, Formatter};

/// Represents a geographical coordinate using latitude and longitude.
///
/// Latitude is the first element (index 0), and longitude is the second (index 1).
///
/// # Examples
///
/// ```
/// use citibike::LatLon;
///
/// let williamsburg = LatLon(40.7116453, -73.9513869);
/// assert_eq!(williamsburg.0, 40.7116453); // Latitude
/// assert_eq!(williamsburg.1, -73.9513869); // Longitude
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLon(pub f64, pub f64);

impl LatLon {
    pub fn latitude(self) -> f64 {
        self.0
    }
    pub fn longitude(self) -> f64 {
        self.1
    }
}

/// The integer identifier of a bike-share dock.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub struct StationId(pub i64);

impl Display for StationId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for StationId {
    fn from(id: i64) -> Self {
        StationId(id)
    }
}

/// A station as seen on a single trip row.
///
/// The same station usually appears on many rows; the coordinates of different rows
/// may differ slightly when a dock was moved.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StationRecord {
    pub id: StationId,
    pub location: LatLon,
}

impl StationRecord {
    pub fn new(id: impl Into<StationId>, location: LatLon) -> Self {
        Self {
            id: id.into(),
            location,
        }
    }
}

/// Which station of a trip to read: where it started, or where it ended.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum StationSide {
    Start,
    End,
}

impl StationSide {
    pub fn id_column(self) -> &'static str {
        match self {
            StationSide::Start => "Start Station ID",
            StationSide::End => "End Station ID",
        }
    }

    pub fn latitude_column(self) -> &'static str {
        match self {
            StationSide::Start => "Start Station Latitude",
            StationSide::End => "End Station Latitude",
        }
    }

    pub fn longitude_column(self) -> &'static str {
        match self {
            StationSide::Start => "Start Station Longitude",
            StationSide::End => "End Station Longitude",
        }
    }
}

impl Display for StationSide {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            StationSide::Start => write!(f, "start"),
            StationSide::End => write!(f, "end"),
        }
    }
}
