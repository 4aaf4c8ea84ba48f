use crate::types::station::{StationId, StationRecord};
use crate::types::zip_code::{ZipCode, ZipCodeMapping};
use crate::zip_codes::error::GeocodeError;
use crate::zip_codes::geocoder::{Address, ReverseGeocoder};
use crate::zip_codes::overrides::overlay_overrides;
use log::{debug, info, warn};
use std::collections::HashSet;

/// Fills in ZIP codes for stations that a [`ZipCodeMapping`] does not know yet.
///
/// Lookups go through the wrapped [`ReverseGeocoder`], one station at a time.
///
/// # Examples
///
/// ```
/// use citibike::{
///     Address, GeocodeError, LatLon, ReverseGeocoder, StationId, StationRecord, ZipCodeMapping,
///     ZipCodeResolver,
/// };
///
/// struct Everywhere11211;
///
/// impl ReverseGeocoder for Everywhere11211 {
///     fn reverse(&self, _: LatLon) -> Result<Option<Address>, GeocodeError> {
///         Ok(Some(Address {
///             postcode: Some("11211".to_string()),
///             ..Address::default()
///         }))
///     }
/// }
///
/// let records = [StationRecord::new(3092, LatLon(40.7130, -73.9520))];
/// let mapping = ZipCodeResolver::new(Everywhere11211).resolve(&records, ZipCodeMapping::new());
/// assert_eq!(mapping.get(StationId(3092)).unwrap().as_str(), "11211");
/// ```
pub struct ZipCodeResolver<G> {
    geocoder: G,
}

impl<G: ReverseGeocoder> ZipCodeResolver<G> {
    pub fn new(geocoder: G) -> Self {
        Self { geocoder }
    }

    /// Returns `mapping` extended with ZIP codes for every station in `records` it lacked,
    /// with the manual overrides applied on top.
    ///
    /// Only the first record of each unknown station is looked up. A station without a
    /// postal code in the lookup result, or whose lookup failed, gets
    /// [`crate::UNKNOWN_ZIP_CODE`]. If the geocoder reports a batch-fatal error, nothing
    /// from this call is added, but the overrides are still applied. This never fails.
    pub fn resolve(&self, records: &[StationRecord], mapping: ZipCodeMapping) -> ZipCodeMapping {
        let mut mapping = mapping;
        let pending = unseen_stations(records, &mapping);

        if pending.is_empty() {
            info!("No new ZIP codes.");
        } else {
            match self.geocode_all(&pending) {
                Ok(resolved) => {
                    let unknown = resolved.iter().filter(|(_, zip)| zip.is_unknown()).count();
                    info!(
                        "Resolved ZIP codes for {} new stations ({} unknown)",
                        resolved.len(),
                        unknown
                    );
                    mapping.extend(resolved);
                }
                Err(e) => {
                    warn!(
                        "No new ZIP codes: geocoding of {} stations failed: {}",
                        pending.len(),
                        e
                    );
                }
            }
        }

        overlay_overrides(mapping)
    }

    fn geocode_all(
        &self,
        pending: &[StationRecord],
    ) -> Result<Vec<(StationId, ZipCode)>, GeocodeError> {
        pending
            .iter()
            .map(|record| Ok((record.id, self.zip_code_for(record)?)))
            .collect()
    }

    fn zip_code_for(&self, record: &StationRecord) -> Result<ZipCode, GeocodeError> {
        match self.geocoder.reverse(record.location) {
            Ok(Some(Address {
                postcode: Some(postcode),
                ..
            })) => Ok(ZipCode::new(postcode)),
            Ok(_) => Ok(ZipCode::unknown()),
            Err(e) if e.is_batch_fatal() => Err(e),
            Err(e) => {
                debug!("Lookup for station {} failed: {}", record.id, e);
                Ok(ZipCode::unknown())
            }
        }
    }
}

/// First record of each station missing from `mapping`, in order of appearance.
fn unseen_stations(records: &[StationRecord], mapping: &ZipCodeMapping) -> Vec<StationRecord> {
    let mut seen = HashSet::new();
    records
        .iter()
        .filter(|record| !mapping.contains(record.id) && seen.insert(record.id))
        .copied()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::station::LatLon;
    use crate::zip_codes::overrides::MANUAL_ZIP_CODE_OVERRIDES;
    use std::cell::RefCell;

    /// Answers lookups with a closure and records every coordinate it was asked about.
    struct ScriptedGeocoder<F> {
        answer: F,
        calls: RefCell<Vec<LatLon>>,
    }

    impl<F> ScriptedGeocoder<F>
    where
        F: Fn(LatLon) -> Result<Option<Address>, GeocodeError>,
    {
        fn new(answer: F) -> Self {
            Self {
                answer,
                calls: RefCell::new(Vec::new()),
            }
        }

        fn calls(&self) -> Vec<LatLon> {
            self.calls.borrow().clone()
        }
    }

    impl<F> ReverseGeocoder for ScriptedGeocoder<F>
    where
        F: Fn(LatLon) -> Result<Option<Address>, GeocodeError>,
    {
        fn reverse(&self, location: LatLon) -> Result<Option<Address>, GeocodeError> {
            self.calls.borrow_mut().push(location);
            (self.answer)(location)
        }
    }

    fn postcode(code: &str) -> Result<Option<Address>, GeocodeError> {
        Ok(Some(Address {
            postcode: Some(code.to_string()),
            ..Address::default()
        }))
    }

    fn records() -> Vec<StationRecord> {
        vec![
            StationRecord::new(3092, LatLon(40.7130, -73.9520)),
            StationRecord::new(72, LatLon(40.7673, -73.9939)),
            StationRecord::new(3092, LatLon(40.7131, -73.9521)),
            StationRecord::new(150, LatLon(40.7247, -73.9812)),
        ]
    }

    fn assert_overrides_applied(mapping: &ZipCodeMapping) {
        for &(id, zip) in MANUAL_ZIP_CODE_OVERRIDES {
            assert_eq!(mapping.get(StationId(id)).map(ZipCode::as_str), Some(zip));
        }
    }

    #[test]
    fn test_resolves_unseen_stations_once() {
        let geocoder = ScriptedGeocoder::new(|_| postcode("11211"));
        let mapping = ZipCodeResolver::new(&geocoder).resolve(&records(), ZipCodeMapping::new());

        // 3092 appears twice, only its first coordinates are looked up.
        assert_eq!(
            geocoder.calls(),
            [
                LatLon(40.7130, -73.9520),
                LatLon(40.7673, -73.9939),
                LatLon(40.7247, -73.9812)
            ]
        );
        assert_eq!(mapping.get(StationId(3092)).map(ZipCode::as_str), Some("11211"));
        assert_eq!(mapping.get(StationId(72)).map(ZipCode::as_str), Some("11211"));
        // Geocoded 11211, but the manual table says otherwise.
        assert_eq!(mapping.get(StationId(150)).map(ZipCode::as_str), Some("10009"));
        assert_overrides_applied(&mapping);
    }

    #[test]
    fn test_known_stations_are_not_looked_up() {
        let geocoder = ScriptedGeocoder::new(|_| postcode("10001"));
        let existing: ZipCodeMapping = [(StationId(3092), ZipCode::from("11249"))]
            .into_iter()
            .collect();

        let mapping = ZipCodeResolver::new(&geocoder).resolve(&records(), existing);

        assert_eq!(geocoder.calls().len(), 2);
        assert_eq!(mapping.get(StationId(3092)).map(ZipCode::as_str), Some("11249"));
        assert_eq!(mapping.get(StationId(72)).map(ZipCode::as_str), Some("10001"));
    }

    #[test]
    fn test_missing_postcode_and_lookup_errors_become_unknown() {
        let geocoder = ScriptedGeocoder::new(|location: LatLon| {
            if location.latitude() > 40.76 {
                Ok(Some(Address::default()))
            } else if location.latitude() > 40.72 {
                Ok(None)
            } else {
                Err(GeocodeError::JsonParse(
                    serde_json::from_str::<Address>("not json").unwrap_err(),
                ))
            }
        });
        let records = [
            StationRecord::new(72, LatLon(40.7673, -73.9939)),
            StationRecord::new(79, LatLon(40.7190, -74.0067)),
            StationRecord::new(82, LatLon(40.7241, -73.9921)),
        ];

        let mapping = ZipCodeResolver::new(&geocoder).resolve(&records, ZipCodeMapping::new());

        assert_eq!(geocoder.calls().len(), 3);
        for id in [72, 79, 82] {
            assert!(mapping.get(StationId(id)).is_some_and(ZipCode::is_unknown));
        }
    }

    #[test]
    fn test_batch_failure_keeps_input_and_applies_overrides() {
        let geocoder = ScriptedGeocoder::new(|location: LatLon| {
            if location.latitude() > 40.76 {
                Err(GeocodeError::InvalidCoordinates {
                    latitude: location.latitude(),
                    longitude: location.longitude(),
                })
            } else {
                postcode("11211")
            }
        });
        let existing: ZipCodeMapping = [
            (StationId(519), ZipCode::from("10017")),
            (StationId(216), ZipCode::unknown()),
        ]
        .into_iter()
        .collect();

        let mapping = ZipCodeResolver::new(&geocoder).resolve(&records(), existing);

        // 3092 was resolved before 72 failed; it is discarded with the rest of the batch.
        assert!(!mapping.contains(StationId(3092)));
        assert!(!mapping.contains(StationId(72)));
        assert_eq!(mapping.get(StationId(519)).map(ZipCode::as_str), Some("10017"));
        assert_eq!(mapping.get(StationId(216)).map(ZipCode::as_str), Some("11201"));
        assert_eq!(mapping.len(), MANUAL_ZIP_CODE_OVERRIDES.len() + 1);
        assert_overrides_applied(&mapping);
    }

    #[test]
    fn test_resolve_is_idempotent() {
        let geocoder = ScriptedGeocoder::new(|_| postcode("10036"));
        let resolver = ZipCodeResolver::new(&geocoder);

        let first = resolver.resolve(&records(), ZipCodeMapping::new());
        let calls_after_first = geocoder.calls().len();
        let second = resolver.resolve(&records(), first.clone());

        assert_eq!(first, second);
        assert_eq!(geocoder.calls().len(), calls_after_first);
    }

    #[test]
    fn test_unknown_stations_are_not_retried() {
        let geocoder = ScriptedGeocoder::new(|_| Ok(None));
        let resolver = ZipCodeResolver::new(&geocoder);
        let records = [StationRecord::new(72, LatLon(40.7673, -73.9939))];

        let first = resolver.resolve(&records, ZipCodeMapping::new());
        let second = resolver.resolve(&records, first);

        assert_eq!(geocoder.calls().len(), 1);
        assert!(second.get(StationId(72)).is_some_and(ZipCode::is_unknown));
    }

    #[test]
    fn test_no_records_still_applies_overrides() {
        let geocoder = ScriptedGeocoder::new(|_| postcode("10001"));
        let mapping = ZipCodeResolver::new(&geocoder).resolve(&[], ZipCodeMapping::new());
        assert!(geocoder.calls().is_empty());
        assert_eq!(mapping.len(), MANUAL_ZIP_CODE_OVERRIDES.len());
        assert_overrides_applied(&mapping);
    }
}
