//! GDAL-backed readers for zone shapefiles and reference rasters.

use gdal::raster::ResampleAlg;
use gdal::vector::LayerAccess;
use gdal::Dataset;
use geo_types::{Geometry, MultiPolygon};
use ndarray::Array2;
use std::path::Path;

use crate::error::{Result, ZoneError};
use crate::transform::{GeoTransform, ReferenceGrid};
use crate::zone::ZoneCollection;
use crate::zone_raster::ZoneRaster;

impl ReferenceGrid {
    /// Read the transform and pixel dimensions of a raster file.
    pub fn from_raster_path(path: &Path) -> Result<ReferenceGrid> {
        let dataset = Dataset::open(path)?;
        let transform = GeoTransform(dataset.geo_transform()?);
        let (width, height) = dataset.raster_size();
        log::info!(
            "io: reference grid {}x{} from {}",
            width,
            height,
            path.display()
        );
        Ok(ReferenceGrid::new(transform, width, height))
    }
}

impl ZoneCollection {
    /// Load the first layer of a vector file, naming each zone by the
    /// `name_field` attribute and assigning IDs in stored feature order.
    pub fn from_vector_path(path: &Path, name_field: &str) -> Result<ZoneCollection> {
        let dataset = Dataset::open(path)?;
        let mut layer = dataset.layer(0)?;

        let mut features: Vec<(String, MultiPolygon<f64>)> = Vec::new();
        for (index, feature) in layer.features().enumerate() {
            let name = feature
                .field_as_string_by_name(name_field)?
                .unwrap_or_default();
            let geometry = feature
                .geometry()
                .ok_or(ZoneError::MissingGeometry { index })?
                .to_geo()?;
            let polygons = match geometry {
                Geometry::Polygon(polygon) => MultiPolygon::from(polygon),
                Geometry::MultiPolygon(polygons) => polygons,
                _ => return Err(ZoneError::MissingGeometry { index }),
            };
            features.push((name, polygons));
        }
        log::info!(
            "io: loaded {} zones from {}",
            features.len(),
            path.display()
        );
        ZoneCollection::from_features(features)
    }
}

impl ZoneRaster {
    /// Read band 1 of a binary mask GeoTIFF.
    pub fn from_raster_path(path: &Path) -> Result<ZoneRaster> {
        let dataset = Dataset::open(path)?;
        let transform = GeoTransform(dataset.geo_transform()?);
        let band = dataset.rasterband(1)?;
        let (width, height) = band.size();

        let mut data = vec![0u8; width * height];
        band.read_into_slice(
            (0, 0),
            (width, height),
            (width, height),
            &mut data,
            Some(ResampleAlg::NearestNeighbour),
        )?;
        let len = data.len();
        let data = Array2::from_shape_vec((height, width), data).map_err(|_| {
            ZoneError::RasterSize {
                width,
                height,
                len,
            }
        })?;
        Ok(ZoneRaster::new(transform, data))
    }
}
