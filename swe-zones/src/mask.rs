//! Labeled lat/lon zone masks derived from rasterized zone grids.

use ndarray::{s, Array2, Axis};
use std::collections::BTreeSet;

use crate::bbox::BoundingBox;
use crate::error::{Result, ZoneError};
use crate::rasterize::{label, ZoneGrid};
use crate::transform::ReferenceGrid;
use crate::zone::ZoneId;

/// A 2D zone label grid keyed by ascending latitude and longitude.
///
/// Cells outside every zone are `None`, so that selection and averaging
/// treat them as absent rather than as a zone of their own.
#[derive(Debug, Clone, PartialEq)]
pub struct ZoneMask {
    lat: Vec<f64>,
    lon: Vec<f64>,
    zones: Array2<Option<ZoneId>>,
}

impl ZoneMask {
    pub fn new(lat: Vec<f64>, lon: Vec<f64>, zones: Array2<Option<ZoneId>>) -> Result<ZoneMask> {
        if zones.dim() != (lat.len(), lon.len()) {
            return Err(ZoneError::GridMismatch(format!(
                "labels of shape {:?} do not match {} lats x {} lons",
                zones.dim(),
                lat.len(),
                lon.len()
            )));
        }
        Ok(ZoneMask { lat, lon, zones })
    }

    /// Adapt a rasterized zone grid into a labeled mask.
    ///
    /// Coordinates are pixel centres of `reference`. Rows are reordered so
    /// latitude ascends, since rasters store the northernmost row first.
    pub fn from_zone_grid(grid: &ZoneGrid, reference: &ReferenceGrid) -> Result<ZoneMask> {
        if grid.cells.dim() != reference.shape() {
            return Err(ZoneError::GridMismatch(format!(
                "zone grid shape {:?} differs from reference raster shape {:?}",
                grid.cells.dim(),
                reference.shape()
            )));
        }
        if !grid.grid.transform.approx_eq(&reference.transform) {
            return Err(ZoneError::GridMismatch(format!(
                "zone grid transform {:?} differs from reference raster transform {:?}",
                grid.grid.transform.0, reference.transform.0
            )));
        }

        let no_zone = grid.no_zone;
        let zones = grid.cells.mapv(|value| label(value, no_zone));
        let mask = ZoneMask::new(reference.lats(), reference.lons(), zones)?;
        if mask.lat_descending() {
            Ok(mask.flip_lat())
        } else {
            Ok(mask)
        }
    }

    pub fn lat(&self) -> &[f64] {
        &self.lat
    }

    pub fn lon(&self) -> &[f64] {
        &self.lon
    }

    pub fn zones(&self) -> &Array2<Option<ZoneId>> {
        &self.zones
    }

    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }

    /// Reverse the latitude axis along with its labels.
    pub fn flip_lat(&self) -> ZoneMask {
        ZoneMask {
            lat: self.lat.iter().rev().copied().collect(),
            lon: self.lon.clone(),
            zones: self.zones.slice(s![..;-1, ..]).to_owned(),
        }
    }

    fn lat_descending(&self) -> bool {
        self.lat.len() > 1 && self.lat[0] > self.lat[self.lat.len() - 1]
    }

    /// Distinct zone IDs present in the mask.
    pub fn zone_ids(&self) -> BTreeSet<ZoneId> {
        self.zones.iter().flatten().copied().collect()
    }

    /// Keep only the requested zones, then drop every latitude row and
    /// longitude column left without a label.
    pub fn retain_zones(&self, ids: &BTreeSet<ZoneId>) -> ZoneMask {
        let kept = self
            .zones
            .mapv(|cell| cell.filter(|id| ids.contains(id)));

        let rows: Vec<usize> = kept
            .axis_iter(Axis(0))
            .enumerate()
            .filter(|(_, row)| row.iter().any(Option::is_some))
            .map(|(i, _)| i)
            .collect();
        let cols: Vec<usize> = kept
            .axis_iter(Axis(1))
            .enumerate()
            .filter(|(_, col)| col.iter().any(Option::is_some))
            .map(|(j, _)| j)
            .collect();
        if rows.is_empty() || cols.is_empty() {
            return ZoneMask {
                lat: Vec::new(),
                lon: Vec::new(),
                zones: Array2::from_elem((0, 0), None),
            };
        }

        let zones = kept.select(Axis(0), &rows).select(Axis(1), &cols);
        ZoneMask {
            lat: rows.iter().map(|&i| self.lat[i]).collect(),
            lon: cols.iter().map(|&j| self.lon[j]).collect(),
            zones,
        }
    }

    /// Extent of the mask's coordinates; `None` for an empty mask.
    pub fn bounding_box(&self) -> Option<BoundingBox> {
        BoundingBox::from_coords(&self.lat, &self.lon)
    }

    /// The floor/ceil padded extent used to subset gridded data.
    pub fn padded_bounding_box(&self) -> Option<BoundingBox> {
        self.bounding_box().map(|bbox| bbox.padded())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rasterize::{rasterize_zones, RasterizeOptions, MASK_NO_ZONE};
    use crate::transform::GeoTransform;
    use crate::zone::ZoneCollection;
    use geo_types::polygon;
    use ndarray::array;

    fn reference() -> ReferenceGrid {
        ReferenceGrid::new(GeoTransform::north_up(-109.0, 0.5, 39.0, -0.5), 4, 3)
    }

    fn zone_grid() -> ZoneGrid {
        ZoneGrid {
            cells: array![
                [0, 0, MASK_NO_ZONE, MASK_NO_ZONE],
                [MASK_NO_ZONE, 1, 1, MASK_NO_ZONE],
                [MASK_NO_ZONE, MASK_NO_ZONE, MASK_NO_ZONE, 2],
            ],
            grid: reference(),
            no_zone: MASK_NO_ZONE,
        }
    }

    #[test]
    fn latitude_is_strictly_ascending() {
        let mask = ZoneMask::from_zone_grid(&zone_grid(), &reference()).unwrap();
        assert_eq!(mask.lat(), &[37.75, 38.25, 38.75]);
        assert!(mask.lat().windows(2).all(|w| w[0] < w[1]));
        assert_eq!(mask.lon(), &[-108.75, -108.25, -107.75, -107.25]);
    }

    #[test]
    fn rows_follow_flipped_latitude() {
        let mask = ZoneMask::from_zone_grid(&zone_grid(), &reference()).unwrap();
        // Northernmost raster row is now last.
        assert_eq!(mask.zones()[[2, 0]], Some(ZoneId(0)));
        assert_eq!(mask.zones()[[0, 3]], Some(ZoneId(2)));
        assert_eq!(mask.zones()[[0, 0]], None);
    }

    #[test]
    fn south_up_reference_keeps_row_order() {
        let south_up = ReferenceGrid::new(GeoTransform::north_up(-109.0, 0.5, 37.5, 0.5), 4, 3);
        let grid = ZoneGrid {
            grid: south_up,
            ..zone_grid()
        };
        let mask = ZoneMask::from_zone_grid(&grid, &south_up).unwrap();
        assert_eq!(mask.lat(), &[37.75, 38.25, 38.75]);
        // first raster row is already the southernmost
        assert_eq!(mask.zones()[[0, 0]], Some(ZoneId(0)));
        assert_eq!(mask.zones()[[0, 1]], Some(ZoneId(0)));
        assert_eq!(mask.zones()[[2, 3]], Some(ZoneId(2)));
        assert_eq!(mask.zones()[[2, 0]], None);
    }

    #[test]
    fn flip_twice_restores_orientation() {
        let mask = ZoneMask::from_zone_grid(&zone_grid(), &reference()).unwrap();
        let flipped = mask.flip_lat();
        assert_eq!(flipped.lat(), &[38.75, 38.25, 37.75]);
        assert_eq!(flipped.flip_lat(), mask);
    }

    #[test]
    fn sentinel_cells_become_missing() {
        let mask = ZoneMask::from_zone_grid(&zone_grid(), &reference()).unwrap();
        assert_eq!(mask.zones().iter().filter(|c| c.is_none()).count(), 7);
        assert_eq!(
            mask.zone_ids(),
            BTreeSet::from([ZoneId(0), ZoneId(1), ZoneId(2)])
        );
    }

    #[test]
    fn mismatched_reference_is_rejected() {
        let other = ReferenceGrid::new(GeoTransform::north_up(-109.0, 0.5, 39.0, -0.5), 3, 3);
        assert!(matches!(
            ZoneMask::from_zone_grid(&zone_grid(), &other),
            Err(ZoneError::GridMismatch(_))
        ));

        let shifted = ReferenceGrid::new(GeoTransform::north_up(-110.0, 0.5, 39.0, -0.5), 4, 3);
        assert!(matches!(
            ZoneMask::from_zone_grid(&zone_grid(), &shifted),
            Err(ZoneError::GridMismatch(_))
        ));
    }

    #[test]
    fn retain_zones_drops_unlabeled_rows_and_columns() {
        let mask = ZoneMask::from_zone_grid(&zone_grid(), &reference()).unwrap();
        let kept = mask.retain_zones(&BTreeSet::from([ZoneId(1)]));
        assert_eq!(kept.lat(), &[38.25]);
        assert_eq!(kept.lon(), &[-108.25, -107.75]);
        assert_eq!(kept.zone_ids(), BTreeSet::from([ZoneId(1)]));

        let none = mask.retain_zones(&BTreeSet::from([ZoneId(9)]));
        assert!(none.is_empty());
        assert!(none.bounding_box().is_none());
    }

    #[test]
    fn padded_box_covers_retained_zone() {
        let mask = ZoneMask::from_zone_grid(&zone_grid(), &reference()).unwrap();
        let bbox = mask
            .retain_zones(&BTreeSet::from([ZoneId(0), ZoneId(2)]))
            .padded_bounding_box()
            .unwrap();
        assert_eq!(bbox.min_lat, 37.0);
        assert_eq!(bbox.max_lat, 39.0);
        assert_eq!(bbox.min_lon, -109.0);
        assert_eq!(bbox.max_lon, -107.0);
    }

    #[test]
    fn rasterized_polygons_adapt_end_to_end() {
        let zones = ZoneCollection::from_features(vec![(
            "NORTH".to_string(),
            polygon![
                (x: -109.0, y: 38.5),
                (x: -108.0, y: 38.5),
                (x: -108.0, y: 39.0),
                (x: -109.0, y: 39.0),
                (x: -109.0, y: 38.5),
            ],
        )])
        .unwrap();
        let grid = rasterize_zones(&zones, &reference(), &RasterizeOptions::default()).unwrap();
        let mask = ZoneMask::from_zone_grid(&grid, &reference()).unwrap();
        let kept = mask.retain_zones(&BTreeSet::from([ZoneId(0)]));
        assert_eq!(kept.lat(), &[38.75]);
        assert_eq!(kept.lon(), &[-108.75, -108.25]);
    }
}
