/// Error types for zone loading, rasterization and masking
use thiserror::Error;

/// Main error type for zone operations
#[derive(Error, Debug)]
pub enum ZoneError {
    /// Invalid options or inputs
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Zone grid and reference raster disagree on shape or transform
    #[error("Grid mismatch: {0}")]
    GridMismatch(String),

    /// Zone IDs must fit in an `i16` raster
    #[error("Too many zones for an i16 raster (found: {0}, max: 32767)")]
    TooManyZones(usize),

    /// A vector feature without a polygonal geometry
    #[error("Zone feature {index} has no polygon geometry")]
    MissingGeometry { index: usize },

    /// Raster bytes do not fill the declared dimensions
    #[error("Raster of {width}x{height} cannot hold {len} bytes")]
    RasterSize {
        width: usize,
        height: usize,
        len: usize,
    },

    /// GDAL failed to read a vector or raster file
    #[cfg(feature = "gdal")]
    #[error("GDAL error: {0}")]
    Gdal(#[from] gdal::errors::GdalError),
}

/// Type alias for Results using ZoneError
pub type Result<T> = std::result::Result<T, ZoneError>;
