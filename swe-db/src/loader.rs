//! Writing zone masks into the store.

use crate::ZoneDb;
use rusqlite::params;
use swe_zones::rasterize::ZoneGrid;
use swe_zones::zone::ZoneCollection;
use swe_zones::zone_raster::ZoneRaster;

impl ZoneDb {
    /// Store (or replace) the binary mask raster of zone `name`.
    pub fn store_zone_raster(&self, name: &str, raster: &ZoneRaster) -> anyhow::Result<()> {
        let transform = serde_json::to_string(&raster.transform.0)?;
        self.conn.execute(
            "INSERT OR REPLACE INTO zone_masks (name, width, height, transform, cells)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                name,
                raster.width() as i64,
                raster.height() as i64,
                transform,
                raster.to_bytes()
            ],
        )?;
        log::info!(
            "[SWE Debug] loader: Stored mask for {} ({}x{}, {} cells in zone)",
            name,
            raster.width(),
            raster.height(),
            raster.cell_count()
        );
        Ok(())
    }

    /// Split a rasterized zone grid into one binary mask per zone and store
    /// them all under their zone names. Zones without any cell are skipped.
    pub fn store_zone_grid(&self, grid: &ZoneGrid, zones: &ZoneCollection) -> anyhow::Result<usize> {
        let counts = grid.cell_counts();
        let mut count = 0usize;
        let mut skipped = 0usize;
        for zone in zones.zones() {
            if !counts.contains_key(&zone.id) {
                log::debug!("[SWE Debug] loader: Zone {} has no cells", zone.name);
                skipped += 1;
                continue;
            }
            let raster = ZoneRaster::from_zone_grid(grid, zone.id);
            self.store_zone_raster(&zone.name, &raster)?;
            count += 1;
        }
        log::info!(
            "[SWE Debug] loader: Stored {} zone masks, skipped {} empty",
            count,
            skipped
        );
        Ok(count)
    }
}
