//! CBRFC zone definitions and zone masks.
//!
//! Watershed polygons are loaded into a [`zone::ZoneCollection`], burned
//! into a raster matching a reference grid with [`rasterize::rasterize_zones`],
//! and adapted into a lat/lon labeled [`mask::ZoneMask`] that the gridded
//! reducer in `swe-grid` consumes.
//!
//! Reading shapefiles and GeoTIFFs requires the `gdal` feature.

pub mod bbox;
pub mod error;
pub mod mask;
pub mod rasterize;
pub mod transform;
pub mod zone;
pub mod zone_raster;

#[cfg(feature = "gdal")]
pub mod io;

pub use error::{Result, ZoneError};
pub use zone::ZoneId;
