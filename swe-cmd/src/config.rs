//! Pipeline configuration, loaded from JSON and passed into each command.

use anyhow::{bail, Context};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::ops::Range;
use std::path::Path;
use swe_calendar::align::{ANNUAL_COMPARISON_DAY, ANNUAL_COMPARISON_MONTH, ANNUAL_COMPARISON_YEARS};
use swe_calendar::ReferenceYear;
use swe_grid::ReaderConfig;
use swe_zones::rasterize::{RasterizeOptions, MASK_NO_ZONE};
use swe_zones::zone::DEFAULT_NAME_FIELD;

/// Settings shared by every command. Missing keys take their defaults.
///
/// ```json
/// { "no_zone": -999, "name_field": "zone", "reference_year": 1880,
///   "reader": { "variable": "SWE" },
///   "annual_month": 3, "annual_day": 1, "annual_first_year": 1992, "annual_last_year": 2019 }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Sentinel for pixels outside every zone; must be negative.
    pub no_zone: i16,
    pub all_touched: bool,
    /// Attribute holding zone names in the vector file.
    pub name_field: String,
    pub reader: ReaderConfig,
    /// Leap year onto which peak dates are normalized.
    pub reference_year: ReferenceYear,
    pub annual_month: u32,
    pub annual_day: u32,
    pub annual_first_year: i32,
    /// Inclusive.
    pub annual_last_year: i32,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            no_zone: MASK_NO_ZONE,
            all_touched: true,
            name_field: DEFAULT_NAME_FIELD.to_string(),
            reader: ReaderConfig::default(),
            reference_year: ReferenceYear::default(),
            annual_month: ANNUAL_COMPARISON_MONTH,
            annual_day: ANNUAL_COMPARISON_DAY,
            annual_first_year: ANNUAL_COMPARISON_YEARS.start,
            annual_last_year: ANNUAL_COMPARISON_YEARS.end - 1,
        }
    }
}

impl PipelineConfig {
    /// Read and validate a JSON config file.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config: PipelineConfig = serde_json::from_str(&text)
            .with_context(|| format!("parsing config {}", path.display()))?;
        config.validate()?;
        log::info!("Loaded pipeline config from {}", path.display());
        Ok(config)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        self.rasterize_options().validate()?;
        if self.name_field.trim().is_empty() {
            bail!("name_field must not be empty");
        }
        if self.reader.variable.trim().is_empty() {
            bail!("reader.variable must not be empty");
        }
        // leap year so Feb 29 is accepted
        if NaiveDate::from_ymd_opt(2000, self.annual_month, self.annual_day).is_none() {
            bail!(
                "annual comparison day {}-{} is not a calendar day",
                self.annual_month,
                self.annual_day
            );
        }
        if self.annual_first_year > self.annual_last_year {
            bail!(
                "annual comparison years {}..={} are empty",
                self.annual_first_year,
                self.annual_last_year
            );
        }
        Ok(())
    }

    pub fn rasterize_options(&self) -> RasterizeOptions {
        RasterizeOptions {
            no_zone: self.no_zone,
            all_touched: self.all_touched,
        }
    }

    pub fn annual_years(&self) -> Range<i32> {
        self.annual_first_year..self.annual_last_year + 1
    }
}
