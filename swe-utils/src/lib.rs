//! Shared utility functions for SWE crates.

/// Date utility functions
pub mod dates {
    use chrono::{Datelike, NaiveDate};

    /// First month of the water year.
    pub const WATER_YEAR_START_MONTH: u32 = 10;

    /// Format a NaiveDate as "YYYY-MM-DD"
    pub fn format_date(date: &NaiveDate) -> String {
        date.format("%Y-%m-%d").to_string()
    }

    /// Parse a date string in "YYYY-MM-DD" format
    pub fn parse_date(s: &str) -> anyhow::Result<NaiveDate> {
        Ok(NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")?)
    }

    /// Get the water year label for a given date.
    /// Water year Y runs Oct 1 of Y-1 to Sep 30 of Y.
    /// e.g., Oct 1 2022 -> water year 2023, Sep 30 2023 -> water year 2023
    pub fn water_year_for_date(date: &NaiveDate) -> i32 {
        if date.month() >= WATER_YEAR_START_MONTH {
            date.year() + 1
        } else {
            date.year()
        }
    }

    /// First day of water year `year` (Oct 1 of `year - 1`).
    pub fn water_year_start(year: i32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(year - 1, WATER_YEAR_START_MONTH, 1)
    }

    /// Last day of water year `year` (Sep 30 of `year`).
    pub fn water_year_end(year: i32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(year, 9, 30)
    }

    /// Get the day-of-water-year for a given date.
    /// Oct 1 = day 0; Sep 30 = day 364, or 365 in a water year holding Feb 29.
    pub fn day_of_water_year(date: &NaiveDate) -> i32 {
        match water_year_start(water_year_for_date(date)) {
            Some(start) => (*date - start).num_days() as i32,
            None => 0,
        }
    }

}
