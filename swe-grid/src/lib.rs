//! Gridded SWE datasets reduced to per-zone daily means.
//!
//! A [`source::GriddedSource`] exposes coordinates up front and reads values
//! per window. [`zonal::ZonalPlan`] subsets a source to the padded bounding
//! box of a [`swe_zones::mask::ZoneMask`], resamples it onto the mask's
//! coordinates by nearest neighbour, and averages each zone per time step.
//!
//! Reading NetCDF files requires the `netcdf` feature.

pub mod error;
pub mod netcdf_source;
pub mod select;
pub mod source;
pub mod time_units;
pub mod zonal;

pub use error::{GridError, Result};
pub use netcdf_source::ReaderConfig;
pub use source::{GriddedSource, InMemoryGrid, MultiFileDataset};
pub use zonal::{binary_mask_mean, zonal_mean, ZonalPlan, ZonalSeries};

#[cfg(feature = "netcdf")]
pub use netcdf_source::NetcdfSource;
