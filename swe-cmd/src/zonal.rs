//! `zonal-mean` and `db-zonal-mean`: SWANN zonal means to wide CSV.

use anyhow::bail;
use std::collections::BTreeSet;
use std::fs::File;
use std::path::{Path, PathBuf};
use swe_calendar::series::write_wide_csv;
use swe_calendar::DailySeries;
use swe_db::ZoneDb;
use swe_grid::{binary_mask_mean, zonal_mean, GriddedSource};
use swe_zones::mask::ZoneMask;
use swe_zones::rasterize::rasterize_zones;
use swe_zones::transform::ReferenceGrid;
use swe_zones::zone::ZoneCollection;
use swe_zones::ZoneId;

use crate::config::PipelineConfig;

/// Column suffix for SWANN series read through stored masks.
pub const SWANN_SUFFIX: &str = "_SWANN";

/// IDs of the requested zones, or of every zone when `names` is empty.
/// Names missing from the collection are logged and skipped.
pub fn select_zones(zones: &ZoneCollection, names: &[String]) -> BTreeSet<ZoneId> {
    if names.is_empty() {
        return zones.zones().iter().map(|zone| zone.id).collect();
    }
    let found = zones.target_zones(names);
    if found.len() < names.len() {
        let missing: Vec<&str> = names
            .iter()
            .filter(|name| !found.contains_key(name.as_str()))
            .map(String::as_str)
            .collect();
        log::warn!("Zones not found in the zone file: {}", missing.join(", "));
    }
    found.into_values().collect()
}

/// Rasterize `zones` onto `reference` and average `source` over each
/// selected zone. Series are named after their zones.
pub fn zonal_mean_table(
    zones: &ZoneCollection,
    reference: &ReferenceGrid,
    source: &dyn GriddedSource,
    names: &[String],
    config: &PipelineConfig,
) -> anyhow::Result<Vec<DailySeries>> {
    let ids = select_zones(zones, names);
    if ids.is_empty() {
        bail!("none of the requested zones are in the zone file");
    }
    let grid = rasterize_zones(zones, reference, &config.rasterize_options())?;
    let mask = ZoneMask::from_zone_grid(&grid, reference)?;
    let means = zonal_mean(source, &mask, &ids)?;
    if means.is_all_missing() {
        log::warn!("Zonal means are entirely missing; check that the dataset covers the zones");
    }
    Ok(means.named_series(zones))
}

/// Average `source` over the stored mask of each named zone. Series are
/// named `<zone>_SWANN`.
pub fn db_zonal_mean_table(
    db: &ZoneDb,
    names: &[String],
    source: &dyn GriddedSource,
) -> anyhow::Result<Vec<DailySeries>> {
    let names = if names.is_empty() {
        db.zone_names()?
    } else {
        names.to_vec()
    };
    names
        .iter()
        .map(|name| {
            let raster = db.zone_raster(name)?;
            Ok(binary_mask_mean(source, &raster, &format!("{name}{SWANN_SUFFIX}"))?)
        })
        .collect()
}

#[cfg_attr(not(feature = "netcdf"), allow(dead_code))]
fn write_table(output: &Path, series: &[DailySeries]) -> anyhow::Result<()> {
    let file = File::create(output)?;
    write_wide_csv(file, series)?;
    log::info!(
        "Wrote {} zone series to {}",
        series.len(),
        output.display()
    );
    Ok(())
}

#[cfg(feature = "netcdf")]
fn open_swann(files: &[PathBuf], config: &PipelineConfig) -> anyhow::Result<swe_grid::MultiFileDataset> {
    if files.is_empty() {
        bail!("no SWANN files given");
    }
    Ok(swe_grid::MultiFileDataset::open_netcdf(files, &config.reader)?)
}

#[cfg(all(feature = "gdal", feature = "netcdf"))]
pub fn run_zonal_mean(
    zones_path: &Path,
    reference_path: &Path,
    swann_files: &[PathBuf],
    names: &[String],
    output: &Path,
    config: &PipelineConfig,
) -> anyhow::Result<()> {
    let zones = ZoneCollection::from_vector_path(zones_path, &config.name_field)?;
    let reference = ReferenceGrid::from_raster_path(reference_path)?;
    log::info!(
        "Loaded {} zones from {} and a {}x{} reference grid",
        zones.len(),
        zones_path.display(),
        reference.width,
        reference.height
    );
    let source = open_swann(swann_files, config)?;
    let series = zonal_mean_table(&zones, &reference, &source, names, config)?;
    write_table(output, &series)
}

#[cfg(not(all(feature = "gdal", feature = "netcdf")))]
pub fn run_zonal_mean(
    _zones_path: &Path,
    _reference_path: &Path,
    _swann_files: &[PathBuf],
    _names: &[String],
    _output: &Path,
    _config: &PipelineConfig,
) -> anyhow::Result<()> {
    bail!("zonal-mean needs the `gdal` and `netcdf` features")
}

#[cfg(feature = "netcdf")]
pub fn run_db_zonal_mean(
    db_path: &Path,
    names: &[String],
    swann_files: &[PathBuf],
    output: &Path,
    config: &PipelineConfig,
) -> anyhow::Result<()> {
    let db = ZoneDb::open(db_path)?;
    let source = open_swann(swann_files, config)?;
    let series = db_zonal_mean_table(&db, names, &source)?;
    write_table(output, &series)
}

#[cfg(not(feature = "netcdf"))]
pub fn run_db_zonal_mean(
    _db_path: &Path,
    _names: &[String],
    _swann_files: &[PathBuf],
    _output: &Path,
    _config: &PipelineConfig,
) -> anyhow::Result<()> {
    bail!("db-zonal-mean needs the `netcdf` feature")
}
