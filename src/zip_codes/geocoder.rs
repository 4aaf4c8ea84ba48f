//! The reverse geocoding seam used by the ZIP code resolver.

use crate::types::station::LatLon;
use crate::zip_codes::error::GeocodeError;
use serde::{Deserialize, Serialize};
use std::rc::Rc;
use std::sync::Arc;

/// The parts of a structured address this crate cares about.
///
/// Every field is optional: geocoding services routinely omit parts of an address,
/// the postal code included.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Address {
    pub house_number: Option<String>,
    pub road: Option<String>,
    pub suburb: Option<String>,
    pub city: Option<String>,
    pub county: Option<String>,
    pub state: Option<String>,
    pub postcode: Option<String>,
    pub country: Option<String>,
    pub country_code: Option<String>,
}

/// Looks up the address at a coordinate.
///
/// Implementations answer one coordinate per call and block until they have an answer.
/// `Ok(None)` means the service had no address for the coordinate.
///
/// Errors for which [`GeocodeError::is_batch_fatal`] is true abort the resolver's whole
/// batch; any other error only affects the station being looked up.
pub trait ReverseGeocoder {
    fn reverse(&self, location: LatLon) -> Result<Option<Address>, GeocodeError>;
}

impl<G: ReverseGeocoder + ?Sized> ReverseGeocoder for &G {
    fn reverse(&self, location: LatLon) -> Result<Option<Address>, GeocodeError> {
        (**self).reverse(location)
    }
}

impl<G: ReverseGeocoder + ?Sized> ReverseGeocoder for Box<G> {
    fn reverse(&self, location: LatLon) -> Result<Option<Address>, GeocodeError> {
        (**self).reverse(location)
    }
}

impl<G: ReverseGeocoder + ?Sized> ReverseGeocoder for Rc<G> {
    fn reverse(&self, location: LatLon) -> Result<Option<Address>, GeocodeError> {
        (**self).reverse(location)
    }
}

impl<G: ReverseGeocoder + ?Sized> ReverseGeocoder for Arc<G> {
    fn reverse(&self, location: LatLon) -> Result<Option<Address>, GeocodeError> {
        (**self).reverse(location)
    }
}
