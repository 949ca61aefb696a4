/// Error types for series, calendar and Snow-17 operations
use chrono::NaiveDate;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CalendarError {
    /// A water year window holds no values, so it has no maximum
    #[error("No data in water year {year} ({start} to {end})")]
    NoDataInWindow {
        year: i32,
        start: NaiveDate,
        end: NaiveDate,
    },

    /// Reference years must be leap years so Feb 29 stays representable
    #[error("Reference year {0} is not a leap year")]
    NonLeapReferenceYear(i32),

    /// Year/month/day columns that do not form a calendar date
    #[error("Invalid date: {0}")]
    InvalidDate(String),

    /// A required CSV column is missing
    #[error("Missing column '{0}'")]
    MissingColumn(String),

    /// Failed to read or parse CSV data
    #[error("Failed to parse CSV: {0}")]
    Csv(#[from] csv::Error),

    /// Failed to read a file
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Type alias for Results using CalendarError
pub type Result<T> = std::result::Result<T, CalendarError>;
