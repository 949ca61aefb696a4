use crate::date_range::DateRange;
use crate::error::{CalendarError, Result};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::ops::Range;
use swe_utils::dates::{water_year_end, water_year_start};

/// A water year runs from October 1 to September 30 and is labeled by the
/// calendar year in which it ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WaterYear(pub i32);

impl WaterYear {
    pub fn start(&self) -> Result<NaiveDate> {
        water_year_start(self.0)
            .ok_or_else(|| CalendarError::InvalidDate(format!("water year {} start", self.0)))
    }

    pub fn end(&self) -> Result<NaiveDate> {
        water_year_end(self.0)
            .ok_or_else(|| CalendarError::InvalidDate(format!("water year {} end", self.0)))
    }

    /// Every day of the water year, Oct 1 through Sep 30.
    pub fn days(&self) -> Result<DateRange> {
        Ok(DateRange(self.start()?, self.end()?))
    }
}

/// Water years fully spanned by a record from `first` to `last`: the year
/// after the first date's calendar year up to, but excluding, the last
/// date's calendar year.
pub fn year_range(first: &NaiveDate, last: &NaiveDate) -> Range<i32> {
    (first.year() + 1)..last.year()
}
