//! Zonal mean of a gridded dataset over a labeled zone mask.
//!
//! A [`ZonalPlan`] is built from coordinates alone: the padded bounding box
//! of the requested zones, the dataset window inside it, and the
//! nearest-neighbour mapping from mask cells to window cells. Values are only
//! read by [`ZonalPlan::compute`].

use chrono::NaiveDate;
use ndarray::{Array2, ArrayView2, Axis};
use rayon::prelude::*;
use serde::Serialize;
use std::collections::BTreeSet;
use std::ops::Range;
use swe_calendar::DailySeries;
use swe_zones::bbox::BoundingBox;
use swe_zones::mask::ZoneMask;
use swe_zones::zone::ZoneCollection;
use swe_zones::zone_raster::{ZoneRaster, IN_ZONE};
use swe_zones::ZoneId;

use crate::error::{GridError, Result};
use crate::select::{coordinate_window, nearest_indices};
use crate::source::{is_valid_f32, GriddedSource};

/// A mask cell joined to the dataset window.
#[derive(Debug, Clone, Copy, PartialEq)]
struct JoinedCell {
    row: usize,
    col: usize,
    slot: usize,
}

#[derive(Debug, Clone, PartialEq)]
struct Window {
    lat: Range<usize>,
    lon: Range<usize>,
}

/// Deferred zonal mean of one dataset over one zone mask.
#[derive(Debug, Clone, PartialEq)]
pub struct ZonalPlan {
    zone_ids: Vec<ZoneId>,
    bounding_box: Option<BoundingBox>,
    window: Option<Window>,
    cells: Vec<JoinedCell>,
}

impl ZonalPlan {
    /// Plan the mean of `source` over the zones `ids` of `mask`.
    pub fn new(source: &dyn GriddedSource, mask: &ZoneMask, ids: &BTreeSet<ZoneId>) -> ZonalPlan {
        let zone_ids: Vec<ZoneId> = ids.iter().copied().collect();
        let mask = mask.retain_zones(ids);
        let bounding_box = mask.padded_bounding_box();

        let window = bounding_box.and_then(|bbox| {
            let lat = coordinate_window(source.lat(), bbox.min_lat, bbox.max_lat)?;
            let lon = coordinate_window(source.lon(), bbox.min_lon, bbox.max_lon)?;
            Some(Window { lat, lon })
        });

        let cells = match &window {
            Some(window) => {
                let lat_index = nearest_indices(&source.lat()[window.lat.clone()], mask.lat());
                let lon_index = nearest_indices(&source.lon()[window.lon.clone()], mask.lon());
                mask.zones()
                    .indexed_iter()
                    .filter_map(|((i, j), zone)| {
                        let slot = zone_ids.binary_search(&(*zone)?).ok()?;
                        Some(JoinedCell {
                            row: lat_index[i]?,
                            col: lon_index[j]?,
                            slot,
                        })
                    })
                    .collect()
            }
            None => Vec::new(),
        };

        match (&bounding_box, &window) {
            (Some(bbox), None) => log::warn!(
                "Dataset does not overlap the zone bounding box {bbox:?}; zonal means will be missing"
            ),
            (None, _) => log::warn!("None of the {} requested zones are in the mask", zone_ids.len()),
            _ => log::debug!(
                "Planned zonal mean over {} zones from {} joined cells",
                zone_ids.len(),
                cells.len()
            ),
        }

        ZonalPlan {
            zone_ids,
            bounding_box,
            window,
            cells,
        }
    }

    /// The padded bounding box used to subset the dataset.
    pub fn bounding_box(&self) -> Option<BoundingBox> {
        self.bounding_box
    }

    pub fn zone_ids(&self) -> &[ZoneId] {
        &self.zone_ids
    }

    /// No mask cell could be joined to the dataset.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Read the planned window from `source` and average each zone per time
    /// step. Zones without a valid cell at a time step get `NaN`.
    pub fn compute(&self, source: &dyn GriddedSource) -> Result<ZonalSeries> {
        let times = source.times().to_vec();
        let mut values = Array2::from_elem((times.len(), self.zone_ids.len()), f64::NAN);

        let Some(window) = self.window.as_ref().filter(|_| !self.cells.is_empty()) else {
            return Ok(ZonalSeries {
                zone_ids: self.zone_ids.clone(),
                times,
                values,
            });
        };

        let data = source.read_window(window.lat.clone(), window.lon.clone())?;
        if data.len_of(Axis(0)) != times.len() {
            return Err(GridError::GridMismatch(format!(
                "source returned {} time steps, expected {}",
                data.len_of(Axis(0)),
                times.len()
            )));
        }

        let rows: Vec<Vec<f64>> = (0..times.len())
            .into_par_iter()
            .map(|t| self.reduce_frame(data.index_axis(Axis(0), t)))
            .collect();
        for (t, row) in rows.into_iter().enumerate() {
            for (z, value) in row.into_iter().enumerate() {
                values[[t, z]] = value;
            }
        }

        log::info!(
            "Computed zonal means for {} zones over {} time steps",
            self.zone_ids.len(),
            times.len()
        );
        Ok(ZonalSeries {
            zone_ids: self.zone_ids.clone(),
            times,
            values,
        })
    }

    fn reduce_frame(&self, frame: ArrayView2<f32>) -> Vec<f64> {
        let mut means = vec![MeanAccumulator::default(); self.zone_ids.len()];
        for cell in &self.cells {
            let value = frame[[cell.row, cell.col]];
            if is_valid_f32(value) {
                means[cell.slot].push(value as f64);
            }
        }
        means.iter().map(MeanAccumulator::mean).collect()
    }
}

/// Running arithmetic mean. A constant input yields that constant exactly.
#[derive(Debug, Clone, Copy, Default)]
struct MeanAccumulator {
    count: u64,
    mean: f64,
}

impl MeanAccumulator {
    fn push(&mut self, value: f64) {
        self.count += 1;
        self.mean += (value - self.mean) / self.count as f64;
    }

    fn mean(&self) -> f64 {
        if self.count == 0 {
            f64::NAN
        } else {
            self.mean
        }
    }
}

/// Per-zone, per-time-step means.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ZonalSeries {
    pub zone_ids: Vec<ZoneId>,
    pub times: Vec<NaiveDate>,
    /// Shaped `(times, zones)`.
    pub values: Array2<f64>,
}

impl ZonalSeries {
    pub fn get(&self, zone: ZoneId, time: usize) -> Option<f64> {
        let z = self.zone_ids.iter().position(|id| *id == zone)?;
        self.values.get([time, z]).copied()
    }

    /// One zone's means as a daily series named by its ID.
    pub fn series_for(&self, zone: ZoneId) -> Option<DailySeries> {
        let z = self.zone_ids.iter().position(|id| *id == zone)?;
        Some(DailySeries::from_points(
            zone.to_string(),
            self.times
                .iter()
                .copied()
                .zip(self.values.column(z).iter().copied()),
        ))
    }

    /// Every zone's means, named after the zone in `zones`.
    pub fn named_series(&self, zones: &ZoneCollection) -> Vec<DailySeries> {
        self.zone_ids
            .iter()
            .filter_map(|id| {
                let series = self.series_for(*id)?;
                Some(match zones.name_of(*id) {
                    Some(name) => series.with_name(name),
                    None => series,
                })
            })
            .collect()
    }

    pub fn is_all_missing(&self) -> bool {
        self.values.iter().all(|v| v.is_nan())
    }
}

/// Plan and compute in one step.
pub fn zonal_mean(
    source: &dyn GriddedSource,
    mask: &ZoneMask,
    ids: &BTreeSet<ZoneId>,
) -> Result<ZonalSeries> {
    ZonalPlan::new(source, mask, ids).compute(source)
}

/// Mean of `source` over the cells of a single-zone binary raster, per time
/// step.
///
/// The dataset is subset to the raster's outer extent, which must yield
/// exactly the raster's shape. Raster rows run north to south, so the mask
/// is flipped when the dataset's latitude ascends.
pub fn binary_mask_mean(
    source: &dyn GriddedSource,
    raster: &ZoneRaster,
    name: &str,
) -> Result<DailySeries> {
    let bbox = raster.bounding_box();
    let window = coordinate_window(source.lat(), bbox.min_lat, bbox.max_lat).zip(
        coordinate_window(source.lon(), bbox.min_lon, bbox.max_lon),
    );
    let Some((lat, lon)) = window else {
        log::warn!("Dataset does not overlap the extent {bbox:?} of zone {name}");
        return Ok(DailySeries::new(name));
    };

    if (lat.len(), lon.len()) != (raster.height(), raster.width()) {
        return Err(GridError::GridMismatch(format!(
            "zone {name}: dataset subset is {} x {}, stored mask is {} x {}",
            lat.len(),
            lon.len(),
            raster.height(),
            raster.width()
        )));
    }

    let lats = &source.lat()[lat.clone()];
    let ascending = lats.len() < 2 || lats[0] < lats[lats.len() - 1];
    let mask = if ascending {
        raster.flipped_data()
    } else {
        raster.data.clone()
    };

    let data = source.read_window(lat, lon)?;
    let means: Vec<f64> = (0..data.len_of(Axis(0)))
        .into_par_iter()
        .map(|t| {
            let frame = data.index_axis(Axis(0), t);
            let mut mean = MeanAccumulator::default();
            for (value, cell) in frame.iter().zip(mask.iter()) {
                if *cell == IN_ZONE && is_valid_f32(*value) {
                    mean.push(*value as f64);
                }
            }
            mean.mean()
        })
        .collect();

    log::debug!(
        "Zone {name}: {} mask cells over {} time steps",
        raster.cell_count(),
        means.len()
    );
    Ok(DailySeries::from_points(
        name,
        source.times().iter().copied().zip(means),
    ))
}
