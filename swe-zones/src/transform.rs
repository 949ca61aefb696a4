//! Affine pixel/world transforms and reference grid geometry.

use geo_types::{coord, Rect};
use serde::{Deserialize, Serialize};
use std::ops::Range;

use crate::error::{Result, ZoneError};

/// GDAL-ordered affine transform: `[x0, dx, rx, y0, ry, dy]`.
///
/// World coordinates of the fractional pixel position `(col, row)` are
/// `x = x0 + col*dx + row*rx` and `y = y0 + col*ry + row*dy`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoTransform(pub [f64; 6]);

impl GeoTransform {
    /// A north-up transform with the given upper-left origin and pixel size.
    /// `pixel_height` is negative for rasters stored top-to-bottom.
    pub fn north_up(origin_x: f64, pixel_width: f64, origin_y: f64, pixel_height: f64) -> Self {
        GeoTransform([origin_x, pixel_width, 0.0, origin_y, 0.0, pixel_height])
    }

    pub fn pixel_width(&self) -> f64 {
        self.0[1]
    }

    pub fn pixel_height(&self) -> f64 {
        self.0[5]
    }

    /// True when the transform has no rotation or shear terms.
    pub fn is_north_up(&self) -> bool {
        self.0[2] == 0.0 && self.0[4] == 0.0
    }

    /// World coordinate of a fractional pixel position.
    pub fn apply(&self, col: f64, row: f64) -> (f64, f64) {
        let t = &self.0;
        let x = t[0] + col * t[1] + row * t[2];
        let y = t[3] + col * t[4] + row * t[5];
        (x, y)
    }

    /// World coordinate of the centre of pixel `(col, row)`.
    pub fn pixel_center(&self, col: usize, row: usize) -> (f64, f64) {
        self.apply(col as f64 + 0.5, row as f64 + 0.5)
    }

    /// The rectangle covered by pixel `(col, row)` in a north-up raster.
    pub fn cell_rect(&self, col: usize, row: usize) -> Rect<f64> {
        let (x0, y0) = self.apply(col as f64, row as f64);
        let (x1, y1) = self.apply(col as f64 + 1.0, row as f64 + 1.0);
        Rect::new(coord! { x: x0, y: y0 }, coord! { x: x1, y: y1 })
    }

    /// Inverse transform, mapping world coordinates to fractional pixels.
    /// `None` when the transform is singular.
    pub fn inverse(&self) -> Option<GeoTransform> {
        let t = &self.0;
        let det = t[1] * t[5] - t[2] * t[4];
        if det == 0.0 {
            return None;
        }
        Some(GeoTransform([
            -t[0] * t[5] / det + t[2] * t[3] / det,
            t[5] / det,
            -t[2] / det,
            t[0] * t[4] / det - t[1] * t[3] / det,
            -t[4] / det,
            t[1] / det,
        ]))
    }

    /// Approximate equality, tolerant of float noise from file round trips.
    pub fn approx_eq(&self, other: &GeoTransform) -> bool {
        self.0
            .iter()
            .zip(other.0.iter())
            .all(|(a, b)| (a - b).abs() <= 1e-9 * a.abs().max(b.abs()).max(1.0))
    }
}

/// Pixel geometry of a reference raster: transform plus dimensions.
///
/// Only the grid geometry is used; the reference raster's pixel values never
/// enter the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReferenceGrid {
    pub transform: GeoTransform,
    pub width: usize,
    pub height: usize,
}

impl ReferenceGrid {
    pub fn new(transform: GeoTransform, width: usize, height: usize) -> Self {
        ReferenceGrid {
            transform,
            width,
            height,
        }
    }

    /// Array shape as `(rows, cols)`.
    pub fn shape(&self) -> (usize, usize) {
        (self.height, self.width)
    }

    /// Pixel-centre longitudes along the first row, left to right.
    pub fn lons(&self) -> Vec<f64> {
        (0..self.width)
            .map(|col| self.transform.pixel_center(col, 0).0)
            .collect()
    }

    /// Pixel-centre latitudes down the first column, in storage order.
    pub fn lats(&self) -> Vec<f64> {
        (0..self.height)
            .map(|row| self.transform.pixel_center(0, row).1)
            .collect()
    }

    /// Column and row index ranges of every pixel that may overlap `bounds`,
    /// clipped to the grid. `None` when `bounds` lies entirely outside.
    pub fn pixel_window(&self, bounds: &Rect<f64>) -> Result<Option<(Range<usize>, Range<usize>)>> {
        let inverse = self.transform.inverse().ok_or_else(|| {
            ZoneError::Config(format!("singular transform {:?}", self.transform.0))
        })?;
        let (c0, r0) = inverse.apply(bounds.min().x, bounds.min().y);
        let (c1, r1) = inverse.apply(bounds.max().x, bounds.max().y);

        let clip = |a: f64, b: f64, len: usize| -> Option<Range<usize>> {
            let lo = a.min(b).floor().max(0.0);
            let hi = a.max(b).ceil().min(len as f64);
            if hi <= lo {
                None
            } else {
                Some(lo as usize..hi as usize)
            }
        };

        match (clip(c0, c1, self.width), clip(r0, r1, self.height)) {
            (Some(cols), Some(rows)) => Ok(Some((cols, rows))),
            _ => Ok(None),
        }
    }
}
