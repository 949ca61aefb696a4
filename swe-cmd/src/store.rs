//! `store-mask`, `store-zones` and `list-masks`: manage the zone mask store.

use std::path::Path;
use swe_db::models::ZoneMaskInfo;
use swe_db::ZoneDb;

use crate::config::PipelineConfig;

/// Print one line per stored mask.
pub fn run_list_masks(db_path: &Path) -> anyhow::Result<()> {
    let db = ZoneDb::open(db_path)?;
    let infos: Vec<ZoneMaskInfo> = db.zone_mask_infos()?;
    if infos.is_empty() {
        log::warn!("No zone masks stored in {}", db_path.display());
    }
    for info in &infos {
        println!(
            "{}\t{}x{}\t{} cells",
            info.name, info.width, info.height, info.cell_count
        );
    }
    Ok(())
}

#[cfg(feature = "gdal")]
pub fn run_store_mask(db_path: &Path, name: &str, mask_path: &Path) -> anyhow::Result<()> {
    let raster = swe_zones::zone_raster::ZoneRaster::from_raster_path(mask_path)?;
    log::info!(
        "Read {}x{} mask for {} from {} ({} cells)",
        raster.width(),
        raster.height(),
        name,
        mask_path.display(),
        raster.cell_count()
    );
    if raster.cell_count() == 0 {
        log::warn!("Mask for {} covers no cells", name);
    }
    let db = ZoneDb::open(db_path)?;
    db.store_zone_raster(name, &raster)
}

#[cfg(not(feature = "gdal"))]
pub fn run_store_mask(_db_path: &Path, _name: &str, _mask_path: &Path) -> anyhow::Result<()> {
    anyhow::bail!("store-mask needs the `gdal` feature")
}

#[cfg(feature = "gdal")]
pub fn run_store_zones(
    db_path: &Path,
    zones_path: &Path,
    reference_path: &Path,
    config: &PipelineConfig,
) -> anyhow::Result<()> {
    use swe_zones::rasterize::rasterize_zones;
    use swe_zones::transform::ReferenceGrid;
    use swe_zones::zone::ZoneCollection;

    let zones = ZoneCollection::from_vector_path(zones_path, &config.name_field)?;
    let reference = ReferenceGrid::from_raster_path(reference_path)?;
    let grid = rasterize_zones(&zones, &reference, &config.rasterize_options())?;
    let db = ZoneDb::open(db_path)?;
    let stored = db.store_zone_grid(&grid, &zones)?;
    log::info!(
        "Stored {} of {} zone masks in {}",
        stored,
        zones.len(),
        db_path.display()
    );
    Ok(())
}

#[cfg(not(feature = "gdal"))]
pub fn run_store_zones(
    _db_path: &Path,
    _zones_path: &Path,
    _reference_path: &Path,
    _config: &PipelineConfig,
) -> anyhow::Result<()> {
    anyhow::bail!("store-zones needs the `gdal` feature")
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;
    use swe_zones::transform::GeoTransform;
    use swe_zones::zone_raster::ZoneRaster;

    #[test]
    fn lists_masks_from_file_db() {
        let dir = std::env::temp_dir().join(format!("swe-cmd-store-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("zones.db");
        {
            let db = ZoneDb::open(&path).unwrap();
            let raster = ZoneRaster::new(GeoTransform::north_up(0.0, 1.0, 1.0, -1.0), array![[1, 0]]);
            db.store_zone_raster("GBRW4U", &raster).unwrap();
        }
        run_list_masks(&path).unwrap();
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[cfg(not(feature = "gdal"))]
    #[test]
    fn store_commands_need_gdal() {
        let path = Path::new("unused");
        assert!(run_store_mask(path, "GBRW4U", path).is_err());
        assert!(run_store_zones(path, path, path, &PipelineConfig::default()).is_err());
    }
}
