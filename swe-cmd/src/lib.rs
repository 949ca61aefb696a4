//! Command implementations for the SWE zone comparison CLI.
//!
//! Subcommands build zone masks, average SWANN grids over zones, find
//! the date of peak SWE per water year, and compare Snow-17 output against
//! SWANN.

use clap::Subcommand;
use std::path::PathBuf;

pub mod compare;
pub mod config;
pub mod peaks;
pub mod store;
pub mod zonal;

pub use config::PipelineConfig;

#[derive(Subcommand)]
pub enum Command {
    /// Rasterize zone polygons and write daily SWANN zonal means as wide CSV
    ZonalMean {
        /// Zone polygons (shapefile or any OGR vector format)
        #[arg(short = 'z', long)]
        zones: PathBuf,

        /// GeoTIFF whose grid the zones are rasterized onto
        #[arg(short = 'g', long)]
        reference: PathBuf,

        /// SWANN NetCDF files, one per water year
        #[arg(short = 's', long, num_args = 1.., required = true)]
        swann: Vec<PathBuf>,

        /// Zones to average (all zones when omitted)
        #[arg(long)]
        zone: Vec<String>,

        /// Output path for the date-by-zone CSV
        #[arg(short = 'o', long)]
        output: PathBuf,
    },

    /// Daily SWANN means over zone masks stored in the database
    DbZonalMean {
        /// Zone mask database
        #[arg(short = 'd', long)]
        db: PathBuf,

        /// SWANN NetCDF files, one per water year
        #[arg(short = 's', long, num_args = 1.., required = true)]
        swann: Vec<PathBuf>,

        /// Zones to average (all stored zones when omitted)
        #[arg(long)]
        zone: Vec<String>,

        /// Output path for the date-by-zone CSV
        #[arg(short = 'o', long)]
        output: PathBuf,
    },

    /// Date of peak SWE per zone and water year from a wide zonal CSV
    Peaks {
        /// Date-by-zone CSV as written by zonal-mean
        #[arg(short = 'i', long)]
        input: PathBuf,

        /// Output path for the long-form peak table
        #[arg(short = 'o', long)]
        output: PathBuf,
    },

    /// Compare Snow-17 SWE against SWANN for one zone
    Compare {
        /// Snow-17 CSV with year, month and day columns, SWE in inches
        #[arg(long)]
        snow17: PathBuf,

        /// Date-by-zone SWANN CSV as written by zonal-mean or db-zonal-mean
        #[arg(short = 's', long)]
        swann: PathBuf,

        /// Zone to compare
        #[arg(long)]
        zone: String,

        /// Output path for the paired values
        #[arg(short = 'o', long)]
        output: PathBuf,
    },

    /// Store a single-zone binary mask GeoTIFF in the database
    StoreMask {
        /// Zone mask database (created if missing)
        #[arg(short = 'd', long)]
        db: PathBuf,

        /// Zone name to store the mask under
        #[arg(long)]
        name: String,

        /// Binary mask GeoTIFF (cells equal to 1 belong to the zone)
        #[arg(short = 'm', long)]
        mask: PathBuf,
    },

    /// Rasterize zone polygons and store one mask per zone in the database
    StoreZones {
        /// Zone mask database (created if missing)
        #[arg(short = 'd', long)]
        db: PathBuf,

        /// Zone polygons (shapefile or any OGR vector format)
        #[arg(short = 'z', long)]
        zones: PathBuf,

        /// GeoTIFF whose grid the zones are rasterized onto
        #[arg(short = 'g', long)]
        reference: PathBuf,
    },

    /// List the zone masks stored in the database
    ListMasks {
        #[arg(short = 'd', long)]
        db: PathBuf,
    },
}

pub fn run(command: Command, config: &PipelineConfig) -> anyhow::Result<()> {
    match command {
        Command::ZonalMean {
            zones,
            reference,
            swann,
            zone,
            output,
        } => zonal::run_zonal_mean(&zones, &reference, &swann, &zone, &output, config),
        Command::DbZonalMean {
            db,
            swann,
            zone,
            output,
        } => zonal::run_db_zonal_mean(&db, &zone, &swann, &output, config),
        Command::Peaks { input, output } => peaks::run_peaks(&input, &output, config),
        Command::Compare {
            snow17,
            swann,
            zone,
            output,
        } => compare::run_compare(&snow17, &swann, &zone, &output, config),
        Command::StoreMask { db, name, mask } => store::run_store_mask(&db, &name, &mask),
        Command::StoreZones {
            db,
            zones,
            reference,
        } => store::run_store_zones(&db, &zones, &reference, config),
        Command::ListMasks { db } => store::run_list_masks(&db),
    }
}
