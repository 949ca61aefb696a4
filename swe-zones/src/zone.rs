use geo::BoundingRect;
use geo_types::{MultiPolygon, Rect};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::error::{Result, ZoneError};

/// Attribute holding the zone name in CBRFC zone files.
pub const DEFAULT_NAME_FIELD: &str = "zone";

/// Largest zone ID that still fits in an `i16` zone raster.
pub const MAX_ZONE_ID: u16 = i16::MAX as u16;

/// Sequential integer ID of a zone within one [`ZoneCollection`].
///
/// IDs are the basis of the zone mask and of the zonal-mean grouping keys,
/// so they are only meaningful together with the collection that issued them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ZoneId(pub u16);

impl fmt::Display for ZoneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A single CBRFC zone: its assigned ID, name and polygon geometry.
#[derive(Debug, Clone, PartialEq)]
pub struct Zone {
    pub id: ZoneId,
    pub name: String,
    pub geometry: MultiPolygon<f64>,
}

/// The zones of one vector file, with IDs assigned in stored order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ZoneCollection {
    zones: Vec<Zone>,
}

impl ZoneCollection {
    /// Build a collection from `(name, geometry)` features, assigning IDs
    /// `0..N` in iteration order.
    pub fn from_features<I, G>(features: I) -> Result<ZoneCollection>
    where
        I: IntoIterator<Item = (String, G)>,
        G: Into<MultiPolygon<f64>>,
    {
        let mut zones = Vec::new();
        for (index, (name, geometry)) in features.into_iter().enumerate() {
            if index > MAX_ZONE_ID as usize {
                return Err(ZoneError::TooManyZones(index + 1));
            }
            zones.push(Zone {
                id: ZoneId(index as u16),
                name,
                geometry: geometry.into(),
            });
        }
        log::debug!("zones: assigned {} zone IDs", zones.len());
        Ok(ZoneCollection { zones })
    }

    pub fn zones(&self) -> &[Zone] {
        &self.zones
    }

    pub fn len(&self) -> usize {
        self.zones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }

    pub fn get(&self, id: ZoneId) -> Option<&Zone> {
        self.zones.get(id.0 as usize)
    }

    pub fn name_of(&self, id: ZoneId) -> Option<&str> {
        self.get(id).map(|zone| zone.name.as_str())
    }

    /// Map the requested zone names to their IDs.
    ///
    /// Names that are not in the collection are left out of the result
    /// without an error, so callers must compare the mapping's size with the
    /// request. When a name occurs more than once, the last feature wins.
    pub fn target_zones<S: AsRef<str>>(&self, names: &[S]) -> BTreeMap<String, ZoneId> {
        let mut targets = BTreeMap::new();
        for zone in &self.zones {
            if names.iter().any(|name| name.as_ref() == zone.name) {
                targets.insert(zone.name.clone(), zone.id);
            }
        }
        if targets.len() < names.len() {
            log::debug!(
                "zones: matched {} of {} requested zone names",
                targets.len(),
                names.len()
            );
        }
        targets
    }

    /// Bounding rectangle of every zone geometry.
    pub fn bounding_rect(&self) -> Option<Rect<f64>> {
        self.zones
            .iter()
            .filter_map(|zone| zone.geometry.bounding_rect())
            .reduce(|a, b| {
                Rect::new(
                    geo_types::coord! { x: a.min().x.min(b.min().x), y: a.min().y.min(b.min().y) },
                    geo_types::coord! { x: a.max().x.max(b.max().x), y: a.max().y.max(b.max().y) },
                )
            })
    }
}
