pub mod month;
pub mod station;
pub mod zip_code;
