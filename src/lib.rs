mod citibike;
mod error;
mod trip_data;
mod types;
mod utils;
mod zip_codes;

pub use citibike::*;
pub use error::CitiBikeError;

pub use types::month::{month_range, year_month_tokens, Month, YearMonthToken};
pub use types::station::{LatLon, StationId, StationRecord, StationSide};
pub use types::zip_code::{ZipCode, ZipCodeMapping, UNKNOWN_ZIP_CODE};

pub use trip_data::error::TripDataError;
pub use trip_data::export::write_trips_csv;
pub use trip_data::filtering::{TripFrameFilterExt, DEFAULT_RADIUS_DEGREES};

pub use zip_codes::error::{GeocodeError, MappingFileError};
pub use zip_codes::geocoder::{Address, ReverseGeocoder};
pub use zip_codes::mapping_file::{load_mapping, save_mapping};
pub use zip_codes::nominatim::{NominatimConfig, NominatimGeocoder};
pub use zip_codes::overrides::{overlay_overrides, MANUAL_ZIP_CODE_OVERRIDES};
pub use zip_codes::resolver::ZipCodeResolver;
