pub mod error;
pub mod geocoder;
pub mod mapping_file;
pub mod nominatim;
pub mod overrides;
pub mod resolver;
