pub mod error;
pub mod export;
pub mod filtering;
pub mod frame_fetcher;
pub mod loader;
