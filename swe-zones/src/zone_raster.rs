//! Single-zone binary mask rasters, as kept in the zone mask store.

use ndarray::{s, Array2};

use crate::bbox::BoundingBox;
use crate::error::{Result, ZoneError};
use crate::rasterize::ZoneGrid;
use crate::transform::GeoTransform;
use crate::zone::ZoneId;

/// Cell value marking pixels inside the zone.
pub const IN_ZONE: u8 = 1;

/// A binary raster for one zone: `1` inside, `0` outside, stored
/// top-to-bottom with its affine transform.
#[derive(Debug, Clone, PartialEq)]
pub struct ZoneRaster {
    pub transform: GeoTransform,
    pub data: Array2<u8>,
}

impl ZoneRaster {
    pub fn new(transform: GeoTransform, data: Array2<u8>) -> ZoneRaster {
        ZoneRaster { transform, data }
    }

    /// Rebuild a raster from row-major bytes.
    pub fn from_bytes(
        transform: GeoTransform,
        width: usize,
        height: usize,
        bytes: Vec<u8>,
    ) -> Result<ZoneRaster> {
        let len = bytes.len();
        let data = Array2::from_shape_vec((height, width), bytes).map_err(|_| {
            ZoneError::RasterSize {
                width,
                height,
                len,
            }
        })?;
        Ok(ZoneRaster { transform, data })
    }

    /// Extract the pixels of one zone from a rasterized zone grid.
    pub fn from_zone_grid(grid: &ZoneGrid, id: ZoneId) -> ZoneRaster {
        let data = Array2::from_shape_fn(grid.cells.dim(), |(row, col)| {
            if grid.zone_at(row, col) == Some(id) {
                IN_ZONE
            } else {
                0
            }
        });
        ZoneRaster {
            transform: grid.grid.transform,
            data,
        }
    }

    pub fn width(&self) -> usize {
        self.data.ncols()
    }

    pub fn height(&self) -> usize {
        self.data.nrows()
    }

    /// Row-major cell bytes.
    pub fn to_bytes(&self) -> Vec<u8> {
        self.data.iter().copied().collect()
    }

    /// Outer extent of the raster: from the upper-left corner of the first
    /// pixel to the lower-right corner of the last one.
    pub fn bounding_box(&self) -> BoundingBox {
        let (ul_x, ul_y) = self.transform.apply(0.0, 0.0);
        let (lr_x, lr_y) = self
            .transform
            .apply(self.width() as f64, self.height() as f64);
        BoundingBox {
            min_lat: lr_y.min(ul_y),
            max_lat: lr_y.max(ul_y),
            min_lon: ul_x.min(lr_x),
            max_lon: ul_x.max(lr_x),
        }
    }

    /// Cells with the row order reversed, so the first row is the
    /// southernmost one, matching ascending-latitude datasets.
    pub fn flipped_data(&self) -> Array2<u8> {
        self.data.slice(s![..;-1, ..]).to_owned()
    }

    pub fn cell_count(&self) -> usize {
        self.data.iter().filter(|&&v| v == IN_ZONE).count()
    }
}
