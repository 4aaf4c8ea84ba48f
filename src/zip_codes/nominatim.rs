//! A [`ReverseGeocoder`] backed by the Nominatim API (OpenStreetMap).
//!
//! The client is blocking. From async code, create and use it inside
//! `tokio::task::spawn_blocking`, as [`crate::CitiBike::update_zip_codes`] does.

use crate::types::station::LatLon;
use crate::zip_codes::error::GeocodeError;
use crate::zip_codes::geocoder::{Address, ReverseGeocoder};
use bon::Builder;
use log::{debug, warn};
use reqwest::blocking::Client;
use serde::Deserialize;
use std::time::Duration;

pub const DEFAULT_ENDPOINT: &str = "https://nominatim.openstreetmap.org/reverse";
pub const DEFAULT_USER_AGENT: &str = "citibike-rs";

/// Connection settings for [`NominatimGeocoder`].
///
/// Nominatim's usage policy asks every application to identify itself with its own
/// user agent, so set `user_agent` when using the public endpoint.
///
/// # Examples
///
/// ```
/// use citibike::NominatimConfig;
/// use std::time::Duration;
///
/// let config = NominatimConfig::builder()
///     .user_agent("my-station-survey")
///     .timeout(Duration::from_secs(5))
///     .build();
/// assert_eq!(config.endpoint, "https://nominatim.openstreetmap.org/reverse");
/// ```
#[derive(Debug, Clone, Builder)]
pub struct NominatimConfig {
    #[builder(into, default = DEFAULT_ENDPOINT.to_string())]
    pub endpoint: String,
    #[builder(into, default = DEFAULT_USER_AGENT.to_string())]
    pub user_agent: String,
    /// Upper bound for a single lookup.
    #[builder(default = Duration::from_secs(10))]
    pub timeout: Duration,
}

impl Default for NominatimConfig {
    fn default() -> Self {
        NominatimConfig::builder().build()
    }
}

pub struct NominatimGeocoder {
    config: NominatimConfig,
    client: Client,
}

#[derive(Deserialize)]
struct ReverseResponse {
    #[serde(default)]
    address: Option<Address>,
    #[serde(default)]
    error: Option<String>,
}

impl NominatimGeocoder {
    pub fn new(config: NominatimConfig) -> Result<Self, GeocodeError> {
        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(config.timeout)
            .build()
            .map_err(GeocodeError::ClientBuild)?;
        Ok(Self { config, client })
    }

    pub fn config(&self) -> &NominatimConfig {
        &self.config
    }
}

impl ReverseGeocoder for NominatimGeocoder {
    fn reverse(&self, location: LatLon) -> Result<Option<Address>, GeocodeError> {
        validate_coordinates(location)?;
        let url = self.config.endpoint.as_str();

        let response = self
            .client
            .get(url)
            .query(&[
                ("format", "jsonv2".to_string()),
                ("lat", location.latitude().to_string()),
                ("lon", location.longitude().to_string()),
                ("addressdetails", "1".to_string()),
            ])
            .send()
            .map_err(|e| GeocodeError::NetworkRequest(url.to_string(), e))?;

        let response = match response.error_for_status() {
            Ok(resp) => resp,
            Err(e) => {
                warn!("HTTP error for {}: {:?}", url, e);
                return Err(if let Some(status) = e.status() {
                    GeocodeError::HttpStatus {
                        url: url.to_string(),
                        status,
                        source: e,
                    }
                } else {
                    GeocodeError::NetworkRequest(url.to_string(), e)
                });
            }
        };

        let body = response
            .text()
            .map_err(|e| GeocodeError::NetworkRequest(url.to_string(), e))?;
        parse_reverse_response(&body)
    }
}

fn validate_coordinates(location: LatLon) -> Result<(), GeocodeError> {
    let LatLon(latitude, longitude) = location;
    let valid = latitude.is_finite()
        && longitude.is_finite()
        && (-90.0..=90.0).contains(&latitude)
        && (-180.0..=180.0).contains(&longitude);
    if valid {
        Ok(())
    } else {
        Err(GeocodeError::InvalidCoordinates {
            latitude,
            longitude,
        })
    }
}

fn parse_reverse_response(body: &str) -> Result<Option<Address>, GeocodeError> {
    let response: ReverseResponse = serde_json::from_str(body)?;
    if let Some(error) = response.error {
        debug!("Nominatim returned no address: {}", error);
        return Ok(None);
    }
    Ok(response.address)
}
