//! Burning zone polygons into a raster that matches a reference grid.

use geo::{Area, BooleanOps, BoundingRect, Contains, Intersects};
use geo_types::{MultiPolygon, Point, Rect};
use ndarray::Array2;
use std::collections::{BTreeMap, BTreeSet};

use crate::error::{Result, ZoneError};
use crate::transform::ReferenceGrid;
use crate::zone::{ZoneCollection, ZoneId};

/// Fill value for pixels that no zone touches.
pub const MASK_NO_ZONE: i16 = -999;

/// Overlap area, as a fraction of a pixel, below which a pixel counts as
/// untouched. Absorbs slivers from polygon edges lying on pixel boundaries.
const TOUCH_TOLERANCE: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RasterizeOptions {
    /// Value of pixels outside every zone. Must be negative.
    pub no_zone: i16,
    /// Burn every pixel a polygon overlaps, not only those whose centre it
    /// contains.
    pub all_touched: bool,
}

impl Default for RasterizeOptions {
    fn default() -> Self {
        RasterizeOptions {
            no_zone: MASK_NO_ZONE,
            all_touched: true,
        }
    }
}

impl RasterizeOptions {
    pub fn validate(&self) -> Result<()> {
        if self.no_zone >= 0 {
            return Err(ZoneError::Config(format!(
                "no-zone sentinel must be negative, got {}",
                self.no_zone
            )));
        }
        Ok(())
    }
}

/// Rasterized zones: one zone ID or the sentinel per reference pixel.
#[derive(Debug, Clone, PartialEq)]
pub struct ZoneGrid {
    pub cells: Array2<i16>,
    pub grid: ReferenceGrid,
    pub no_zone: i16,
}

impl ZoneGrid {
    pub fn zone_at(&self, row: usize, col: usize) -> Option<ZoneId> {
        self.cells
            .get((row, col))
            .and_then(|&value| label(value, self.no_zone))
    }

    /// Distinct zone IDs present in the grid.
    pub fn zone_ids(&self) -> BTreeSet<ZoneId> {
        self.cells
            .iter()
            .filter_map(|&value| label(value, self.no_zone))
            .collect()
    }

    /// Pixel count per zone.
    pub fn cell_counts(&self) -> BTreeMap<ZoneId, usize> {
        let mut counts = BTreeMap::new();
        for id in self.cells.iter().filter_map(|&v| label(v, self.no_zone)) {
            *counts.entry(id).or_insert(0) += 1;
        }
        counts
    }
}

pub(crate) fn label(value: i16, no_zone: i16) -> Option<ZoneId> {
    if value == no_zone || value < 0 {
        None
    } else {
        Some(ZoneId(value as u16))
    }
}

/// Burn every zone's ID into the pixels of `grid` it touches.
///
/// Zones are burned in ID order, so where polygons overlap the zone with the
/// higher ID owns the shared pixels.
pub fn rasterize_zones(
    zones: &ZoneCollection,
    grid: &ReferenceGrid,
    options: &RasterizeOptions,
) -> Result<ZoneGrid> {
    options.validate()?;
    if !grid.transform.is_north_up() {
        return Err(ZoneError::Config(format!(
            "rotated or sheared transforms are not supported: {:?}",
            grid.transform.0
        )));
    }

    let mut cells = Array2::from_elem(grid.shape(), options.no_zone);
    for zone in zones.zones() {
        let value = i16::try_from(zone.id.0).map_err(|_| ZoneError::TooManyZones(zones.len()))?;
        let Some(bounds) = zone.geometry.bounding_rect() else {
            log::warn!("rasterize: zone {} ({}) has an empty geometry", zone.id, zone.name);
            continue;
        };
        let Some((cols, rows)) = grid.pixel_window(&bounds)? else {
            log::debug!("rasterize: zone {} ({}) lies outside the grid", zone.id, zone.name);
            continue;
        };

        let mut burned = 0usize;
        for row in rows {
            for col in cols.clone() {
                let cell = grid.transform.cell_rect(col, row);
                if pixel_touched(&zone.geometry, &cell, options.all_touched) {
                    cells[[row, col]] = value;
                    burned += 1;
                }
            }
        }
        log::debug!(
            "rasterize: zone {} ({}) burned {} pixels",
            zone.id,
            zone.name,
            burned
        );
    }

    Ok(ZoneGrid {
        cells,
        grid: *grid,
        no_zone: options.no_zone,
    })
}

fn pixel_touched(geometry: &MultiPolygon<f64>, cell: &Rect<f64>, all_touched: bool) -> bool {
    if !all_touched {
        return geometry.contains(&Point::from(cell.center()));
    }
    let cell_polygon = cell.to_polygon();
    let mut overlap = 0.0;
    for polygon in &geometry.0 {
        if !polygon.intersects(cell) {
            continue;
        }
        if polygon.contains(&cell_polygon) {
            return true;
        }
        // boundary cell
        overlap += polygon.intersection(&cell_polygon).unsigned_area();
    }
    overlap > cell.width() * cell.height() * TOUCH_TOLERANCE
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::GeoTransform;
    use geo_types::{polygon, Polygon};

    fn grid_3x3() -> ReferenceGrid {
        ReferenceGrid::new(GeoTransform::north_up(0.0, 1.0, 3.0, -1.0), 3, 3)
    }

    fn rect_polygon(x0: f64, y0: f64, x1: f64, y1: f64) -> Polygon<f64> {
        polygon![
            (x: x0, y: y0),
            (x: x1, y: y0),
            (x: x1, y: y1),
            (x: x0, y: y1),
            (x: x0, y: y0),
        ]
    }

    #[test]
    fn cells_hold_only_zone_ids_or_sentinel() {
        let zones = ZoneCollection::from_features(vec![
            ("A".to_string(), rect_polygon(0.0, 2.0, 1.0, 3.0)),
            ("B".to_string(), rect_polygon(1.0, 1.0, 2.0, 2.0)),
            ("C".to_string(), rect_polygon(2.0, 0.0, 3.0, 1.0)),
        ])
        .unwrap();
        let grid = rasterize_zones(&zones, &grid_3x3(), &RasterizeOptions::default()).unwrap();

        let ids: BTreeSet<u16> = grid.zone_ids().iter().map(|id| id.0).collect();
        assert_eq!(ids, BTreeSet::from([0, 1, 2]));
        assert!(grid
            .cells
            .iter()
            .all(|&v| v == MASK_NO_ZONE || (0..3).contains(&v)));
        assert_eq!(grid.cells.iter().filter(|&&v| v == MASK_NO_ZONE).count(), 6);
    }

    #[test]
    fn exact_cell_polygon_claims_only_that_cell() {
        let zones =
            ZoneCollection::from_features(vec![("CENTER".to_string(), rect_polygon(1.0, 1.0, 2.0, 2.0))])
                .unwrap();
        let grid = rasterize_zones(&zones, &grid_3x3(), &RasterizeOptions::default()).unwrap();
        assert_eq!(grid.zone_at(1, 1), Some(ZoneId(0)));
        assert_eq!(grid.cell_counts()[&ZoneId(0)], 1);
    }

    #[test]
    fn all_touched_labels_partially_covered_pixels() {
        // Covers the centre of pixel (row 1, col 1) and a sliver of its right neighbour.
        let zones =
            ZoneCollection::from_features(vec![("Z".to_string(), rect_polygon(1.2, 1.2, 2.1, 1.8))])
                .unwrap();

        let touched = rasterize_zones(&zones, &grid_3x3(), &RasterizeOptions::default()).unwrap();
        assert_eq!(touched.zone_at(1, 1), Some(ZoneId(0)));
        assert_eq!(touched.zone_at(1, 2), Some(ZoneId(0)));
        assert_eq!(touched.zone_at(0, 1), None);

        let centre_only = RasterizeOptions {
            all_touched: false,
            ..RasterizeOptions::default()
        };
        let centres = rasterize_zones(&zones, &grid_3x3(), &centre_only).unwrap();
        assert_eq!(centres.zone_at(1, 1), Some(ZoneId(0)));
        assert_eq!(centres.zone_at(1, 2), None);
    }

    #[test]
    fn touched_cells_of_a_multipolygon() {
        let geometry = MultiPolygon::new(vec![
            rect_polygon(0.0, 0.0, 2.0, 2.0),
            rect_polygon(10.0, 10.0, 11.0, 11.0),
            rect_polygon(2.6, 2.6, 2.9, 2.9),
        ]);
        let cell = |x: f64, y: f64| Rect::new((x, y), (x + 1.0, y + 1.0));

        // fully inside the first part
        assert!(pixel_touched(&geometry, &cell(0.0, 0.0), true));
        assert!(pixel_touched(&geometry, &cell(1.0, 1.0), true));
        // holds the small part but not its centre
        assert!(pixel_touched(&geometry, &cell(2.0, 2.0), true));
        assert!(!pixel_touched(&geometry, &cell(2.0, 2.0), false));
        // shares only an edge with the first part
        assert!(!pixel_touched(&geometry, &cell(2.0, 0.0), true));
        // disjoint from every part
        assert!(!pixel_touched(&geometry, &cell(5.0, 5.0), true));
    }

    #[test]
    fn later_zone_overwrites_overlap() {
        let zones = ZoneCollection::from_features(vec![
            ("FIRST".to_string(), rect_polygon(0.0, 0.0, 2.0, 3.0)),
            ("SECOND".to_string(), rect_polygon(1.0, 0.0, 3.0, 3.0)),
        ])
        .unwrap();
        let grid = rasterize_zones(&zones, &grid_3x3(), &RasterizeOptions::default()).unwrap();
        assert_eq!(grid.zone_at(0, 0), Some(ZoneId(0)));
        assert_eq!(grid.zone_at(0, 1), Some(ZoneId(1)));
        assert_eq!(grid.zone_at(2, 2), Some(ZoneId(1)));
    }

    #[test]
    fn custom_sentinel_fills_untouched_pixels() {
        let zones =
            ZoneCollection::from_features(vec![("Z".to_string(), rect_polygon(0.0, 0.0, 1.0, 1.0))])
                .unwrap();
        let options = RasterizeOptions {
            no_zone: -1,
            all_touched: true,
        };
        let grid = rasterize_zones(&zones, &grid_3x3(), &options).unwrap();
        assert_eq!(grid.cells[[0, 0]], -1);
        assert_eq!(grid.cells[[2, 0]], 0);
    }

    #[test]
    fn non_negative_sentinel_is_rejected() {
        let options = RasterizeOptions {
            no_zone: 0,
            all_touched: true,
        };
        let zones = ZoneCollection::default();
        assert!(matches!(
            rasterize_zones(&zones, &grid_3x3(), &options),
            Err(ZoneError::Config(_))
        ));
    }

    #[test]
    fn rotated_transform_is_rejected() {
        let grid = ReferenceGrid::new(GeoTransform([0.0, 1.0, 0.1, 3.0, 0.0, -1.0]), 3, 3);
        let zones = ZoneCollection::default();
        assert!(rasterize_zones(&zones, &grid, &RasterizeOptions::default()).is_err());
    }
}
