/// Error types for gridded datasets and zonal reduction
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GridError {
    /// Zone mask or raster problem
    #[error(transparent)]
    Zone(#[from] swe_zones::ZoneError),

    /// Sources, masks or windows disagree on coordinates or shape
    #[error("Grid mismatch: {0}")]
    GridMismatch(String),

    /// A required variable is absent from a source file
    #[error("Variable '{name}' not found in {source_name}")]
    MissingVariable { name: String, source_name: String },

    /// CF time units that cannot be decoded
    #[error("Invalid time units: {0}")]
    TimeUnits(String),

    /// Data that does not fit the declared dimensions
    #[error("Array shape error: {0}")]
    Shape(#[from] ndarray::ShapeError),

    /// A multi-file dataset needs at least one file
    #[error("No gridded sources given")]
    NoSources,

    /// NetCDF library error
    #[cfg(feature = "netcdf")]
    #[error("NetCDF error: {0}")]
    Netcdf(#[from] netcdf::Error),
}

/// Type alias for Results using GridError
pub type Result<T> = std::result::Result<T, GridError>;
