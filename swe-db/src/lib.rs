//! SQLite store for per-zone binary mask rasters.
//!
//! Each zone is stored as a single-band `u8` raster (`1` inside the zone)
//! together with its affine transform, so the gridded reducer can rebuild
//! the mask and its outer extent without the original polygons.
//!
//! # Usage
//!
//! ```rust
//! use swe_db::ZoneDb;
//! use swe_zones::transform::GeoTransform;
//! use swe_zones::zone_raster::ZoneRaster;
//!
//! let db = ZoneDb::open_in_memory().unwrap();
//! let raster = ZoneRaster::from_bytes(
//!     GeoTransform::north_up(-109.0, 0.5, 39.0, -0.5),
//!     2,
//!     1,
//!     vec![1, 0],
//! )
//! .unwrap();
//! db.store_zone_raster("GBRW4U", &raster).unwrap();
//! assert_eq!(db.zone_raster("GBRW4U").unwrap(), raster);
//! ```
//!
//! # Tables
//!
//! See [`schema::create_schema`].

pub mod schema;
mod loader;
mod queries;
pub mod models;

use anyhow::Context;
use rusqlite::Connection;
use std::path::Path;

/// A connection to the zone mask store, opened once and reused.
pub struct ZoneDb {
    conn: Connection,
}

impl ZoneDb {
    /// Open (or create) the store at `path` and apply the schema.
    ///
    /// A connection failure is returned immediately; there is no retry.
    pub fn open(path: &Path) -> anyhow::Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("opening zone mask store {}", path.display()))?;
        conn.execute_batch(schema::create_schema())?;
        log::info!("[SWE Debug] db: Opened zone mask store {}", path.display());
        Ok(Self { conn })
    }

    /// Create an empty in-memory store with the schema applied.
    pub fn open_in_memory() -> anyhow::Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(schema::create_schema())?;
        Ok(Self { conn })
    }
}
