//! `peaks`: date of peak SWE per zone and water year.

use std::fs::File;
use std::path::Path;
use swe_calendar::series::read_wide_csv;
use swe_calendar::{peak_swe_table, PeakTable};

use crate::config::PipelineConfig;

pub fn run_peaks(input: &Path, output: &Path, config: &PipelineConfig) -> anyhow::Result<()> {
    let series = read_wide_csv(File::open(input)?)?;
    log::info!(
        "Read {} zone series from {}",
        series.len(),
        input.display()
    );
    let table: PeakTable = peak_swe_table(&series, config.reference_year)?;
    table.write_csv(File::create(output)?)?;
    log::info!(
        "Wrote peak dates for {} water years to {}",
        table.years.len(),
        output.display()
    );
    Ok(())
}
