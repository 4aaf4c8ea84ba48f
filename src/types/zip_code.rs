//! ZIP codes and the station → ZIP code mapping that callers carry between runs.

use crate::types::station::StationId;
use serde::{Deserialize, Serialize};
use std::collections::btree_map;
use std::collections::BTreeMap;
use std::fmt;
use std::fmt::{Display, Formatter};

/// Placeholder stored when no postal code could be determined for a station.
pub const UNKNOWN_ZIP_CODE: &str = "XXXXXXXXX";

/// A postal code, a manually curated override, or [`UNKNOWN_ZIP_CODE`].
#[derive(Debug, Clone, PartialEq, Eq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub struct ZipCode(String);

impl ZipCode {
    pub fn new(code: impl Into<String>) -> Self {
        ZipCode(code.into())
    }

    pub fn unknown() -> Self {
        ZipCode(UNKNOWN_ZIP_CODE.to_string())
    }

    pub fn is_unknown(&self) -> bool {
        self.0 == UNKNOWN_ZIP_CODE
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for ZipCode {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ZipCode {
    fn from(code: &str) -> Self {
        ZipCode::new(code)
    }
}

/// Maps station ids to ZIP codes.
///
/// Entries are never removed by this crate. Stations whose lookup failed keep the
/// [`UNKNOWN_ZIP_CODE`] placeholder, which also means they count as already resolved
/// on the next run. Iteration is in ascending station id order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZipCodeMapping(BTreeMap<StationId, ZipCode>);

impl ZipCodeMapping {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: StationId) -> Option<&ZipCode> {
        self.0.get(&id)
    }

    pub fn contains(&self, id: StationId) -> bool {
        self.0.contains_key(&id)
    }

    /// Inserts or replaces the entry for `id`, returning the previous value.
    pub fn insert(&mut self, id: StationId, zip_code: ZipCode) -> Option<ZipCode> {
        self.0.insert(id, zip_code)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, StationId, ZipCode> {
        self.0.iter()
    }
}

impl Extend<(StationId, ZipCode)> for ZipCodeMapping {
    fn extend<T: IntoIterator<Item = (StationId, ZipCode)>>(&mut self, iter: T) {
        self.0.extend(iter)
    }
}

impl FromIterator<(StationId, ZipCode)> for ZipCodeMapping {
    fn from_iter<T: IntoIterator<Item = (StationId, ZipCode)>>(iter: T) -> Self {
        ZipCodeMapping(iter.into_iter().collect())
    }
}

impl IntoIterator for ZipCodeMapping {
    type Item = (StationId, ZipCode);
    type IntoIter = btree_map::IntoIter<StationId, ZipCode>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a ZipCodeMapping {
    type Item = (&'a StationId, &'a ZipCode);
    type IntoIter = btree_map::Iter<'a, StationId, ZipCode>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl From<BTreeMap<StationId, ZipCode>> for ZipCodeMapping {
    fn from(map: BTreeMap<StationId, ZipCode>) -> Self {
        ZipCodeMapping(map)
    }
}
