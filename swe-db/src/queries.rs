//! Typed queries against the zone mask store.

use crate::models::ZoneMaskInfo;
use crate::ZoneDb;
use anyhow::{anyhow, Context};
use rusqlite::{params, OptionalExtension};
use swe_zones::transform::GeoTransform;
use swe_zones::zone_raster::ZoneRaster;

impl ZoneDb {
    /// Load the stored mask of zone `name`. A zone that was never stored is
    /// an error.
    pub fn zone_raster(&self, name: &str) -> anyhow::Result<ZoneRaster> {
        let row = self
            .conn
            .query_row(
                "SELECT width, height, transform, cells FROM zone_masks WHERE name = ?1",
                params![name],
                |row| {
                    Ok((
                        row.get::<_, i64>(0)?,
                        row.get::<_, i64>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, Vec<u8>>(3)?,
                    ))
                },
            )
            .optional()?;
        let (width, height, transform, cells) =
            row.ok_or_else(|| anyhow!("No mask stored for zone {name}"))?;

        let transform: [f64; 6] = serde_json::from_str(&transform)
            .with_context(|| format!("decoding transform of zone {name}"))?;
        let raster = ZoneRaster::from_bytes(
            GeoTransform(transform),
            usize::try_from(width)?,
            usize::try_from(height)?,
            cells,
        )?;
        log::info!(
            "[SWE Debug] query: zone_raster {} returned {}x{} mask",
            name,
            width,
            height
        );
        Ok(raster)
    }

    /// Names of all stored zones, sorted.
    pub fn zone_names(&self) -> anyhow::Result<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT name FROM zone_masks ORDER BY name")?;
        let rows = stmt
            .query_map([], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;
        Ok(rows)
    }

    /// Summaries of all stored masks, sorted by name.
    pub fn zone_mask_infos(&self) -> anyhow::Result<Vec<ZoneMaskInfo>> {
        self.zone_names()?
            .into_iter()
            .map(|name| {
                let raster = self.zone_raster(&name)?;
                Ok(ZoneMaskInfo {
                    name,
                    width: raster.width(),
                    height: raster.height(),
                    cell_count: raster.cell_count(),
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use crate::ZoneDb;
    use geo_types::polygon;
    use ndarray::array;
    use swe_zones::rasterize::{rasterize_zones, RasterizeOptions};
    use swe_zones::transform::{GeoTransform, ReferenceGrid};
    use swe_zones::zone::ZoneCollection;
    use swe_zones::zone_raster::ZoneRaster;

    fn raster() -> ZoneRaster {
        ZoneRaster::new(
            GeoTransform::north_up(-109.0, 0.25, 39.0, -0.25),
            array![[0, 1, 1], [1, 1, 0]],
        )
    }

    #[test]
    fn stored_raster_round_trips() {
        let db = ZoneDb::open_in_memory().unwrap();
        db.store_zone_raster("GBRW4U", &raster()).unwrap();

        let loaded = db.zone_raster("GBRW4U").unwrap();
        assert_eq!(loaded, raster());
        let bbox = loaded.bounding_box();
        assert_eq!(bbox.min_lon, -109.0);
        assert_eq!(bbox.max_lat, 39.0);
        assert_eq!(loaded.flipped_data(), array![[1, 1, 0], [0, 1, 1]]);
    }

    #[test]
    fn storing_again_replaces() {
        let db = ZoneDb::open_in_memory().unwrap();
        db.store_zone_raster("GBRW4U", &raster()).unwrap();
        let replacement = ZoneRaster::new(GeoTransform::north_up(-110.0, 1.0, 40.0, -1.0), array![[1]]);
        db.store_zone_raster("GBRW4U", &replacement).unwrap();
        assert_eq!(db.zone_raster("GBRW4U").unwrap(), replacement);
        assert_eq!(db.zone_names().unwrap().len(), 1);
    }

    #[test]
    fn missing_zone_is_an_error() {
        let db = ZoneDb::open_in_memory().unwrap();
        let err = db.zone_raster("NOPE").unwrap_err();
        assert!(err.to_string().contains("NOPE"));
    }

    #[test]
    fn zone_grid_is_split_per_zone() {
        let zones = ZoneCollection::from_features(vec![
            (
                "WEST".to_string(),
                polygon![(x: 0.0, y: 0.0), (x: 1.0, y: 0.0), (x: 1.0, y: 2.0), (x: 0.0, y: 2.0), (x: 0.0, y: 0.0)],
            ),
            (
                "FAR".to_string(),
                polygon![(x: 50.0, y: 50.0), (x: 51.0, y: 50.0), (x: 51.0, y: 51.0), (x: 50.0, y: 50.0)],
            ),
        ])
        .unwrap();
        let reference = ReferenceGrid::new(GeoTransform::north_up(0.0, 1.0, 2.0, -1.0), 2, 2);
        let grid = rasterize_zones(&zones, &reference, &RasterizeOptions::default()).unwrap();

        let db = ZoneDb::open_in_memory().unwrap();
        assert_eq!(db.store_zone_grid(&grid, &zones).unwrap(), 1);
        let infos = db.zone_mask_infos().unwrap();
        assert_eq!(infos.len(), 1);
        assert_eq!(infos[0].name, "WEST");
        assert_eq!(infos[0].cell_count, 2);
        assert_eq!(db.zone_raster("WEST").unwrap().data, array![[1, 0], [1, 0]]);
    }
}
