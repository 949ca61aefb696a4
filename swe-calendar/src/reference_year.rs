use crate::error::{CalendarError, Result};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// Year onto which peak dates from every water year are projected so they can
/// share a single day-of-year axis.
pub const DEFAULT_REFERENCE_YEAR: i32 = 1880;

/// A leap year used for date normalization. Only leap years are accepted, so
/// Feb 29 always survives normalization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub struct ReferenceYear(i32);

impl ReferenceYear {
    pub fn new(year: i32) -> Result<ReferenceYear> {
        if NaiveDate::from_ymd_opt(year, 2, 29).is_some() {
            Ok(ReferenceYear(year))
        } else {
            Err(CalendarError::NonLeapReferenceYear(year))
        }
    }

    pub fn year(&self) -> i32 {
        self.0
    }

    /// Replace the year of `date`, keeping month and day.
    pub fn normalize(&self, date: &NaiveDate) -> NaiveDate {
        // a leap reference year can hold every month/day pair
        date.with_year(self.0).unwrap_or(*date)
    }
}

impl Default for ReferenceYear {
    fn default() -> Self {
        ReferenceYear(DEFAULT_REFERENCE_YEAR)
    }
}

impl TryFrom<i32> for ReferenceYear {
    type Error = CalendarError;

    fn try_from(value: i32) -> Result<Self> {
        ReferenceYear::new(value)
    }
}

impl From<ReferenceYear> for i32 {
    fn from(value: ReferenceYear) -> Self {
        value.0
    }
}
