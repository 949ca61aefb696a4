//! Query result model structs for the zone mask store.

use serde::Serialize;

/// Summary of one stored zone mask.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ZoneMaskInfo {
    /// CBRFC zone name (e.g. "GBRW4U").
    pub name: String,
    pub width: usize,
    pub height: usize,
    /// Number of cells inside the zone.
    pub cell_count: usize,
}
