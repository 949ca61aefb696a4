//! CF-convention time coordinates (`<unit> since <epoch>`).

use chrono::{NaiveDate, NaiveDateTime, TimeDelta};

use crate::error::{GridError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeUnit {
    Days,
    Hours,
    Minutes,
    Seconds,
}

impl TimeUnit {
    fn seconds(&self) -> f64 {
        match self {
            TimeUnit::Days => 86_400.0,
            TimeUnit::Hours => 3_600.0,
            TimeUnit::Minutes => 60.0,
            TimeUnit::Seconds => 1.0,
        }
    }

    fn parse(s: &str) -> Option<TimeUnit> {
        match s.to_ascii_lowercase().as_str() {
            "days" | "day" | "d" => Some(TimeUnit::Days),
            "hours" | "hour" | "hrs" | "hr" | "h" => Some(TimeUnit::Hours),
            "minutes" | "minute" | "mins" | "min" => Some(TimeUnit::Minutes),
            "seconds" | "second" | "secs" | "sec" | "s" => Some(TimeUnit::Seconds),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeUnits {
    pub unit: TimeUnit,
    pub epoch: NaiveDateTime,
}

const EPOCH_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%d",
];

fn parse_epoch(raw: &str) -> Option<NaiveDateTime> {
    let trimmed = raw
        .trim()
        .trim_end_matches("UTC")
        .trim_end_matches('Z')
        .trim_end_matches("+00:00")
        .trim();
    // fractional seconds carry no information at daily resolution
    let trimmed = trimmed.split('.').next().unwrap_or(trimmed);
    EPOCH_FORMATS.iter().find_map(|format| {
        if *format == "%Y-%m-%d" {
            NaiveDate::parse_from_str(trimmed, format)
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        } else {
            NaiveDateTime::parse_from_str(trimmed, format).ok()
        }
    })
}

impl TimeUnits {
    /// Parse a `units` attribute such as `days since 1900-01-01 00:00:00`.
    pub fn parse(units: &str) -> Result<TimeUnits> {
        let (unit, epoch) = units
            .split_once(" since ")
            .ok_or_else(|| GridError::TimeUnits(units.to_string()))?;
        let unit = TimeUnit::parse(unit.trim())
            .ok_or_else(|| GridError::TimeUnits(units.to_string()))?;
        let epoch = parse_epoch(epoch).ok_or_else(|| GridError::TimeUnits(units.to_string()))?;
        Ok(TimeUnits { unit, epoch })
    }

    /// The date `offset` units after the epoch, rounded to the nearest day.
    pub fn to_date(&self, offset: f64) -> Option<NaiveDate> {
        if !offset.is_finite() {
            return None;
        }
        let millis = (offset * self.unit.seconds() * 1000.0).round() as i64;
        let instant = self
            .epoch
            .checked_add_signed(TimeDelta::try_milliseconds(millis)?)?;
        let rounded = instant.checked_add_signed(TimeDelta::try_hours(12)?)?;
        Some(rounded.date())
    }

    /// Decode every offset; any undecodable offset is an error.
    pub fn decode(&self, offsets: &[f64]) -> Result<Vec<NaiveDate>> {
        offsets
            .iter()
            .map(|&offset| {
                self.to_date(offset)
                    .ok_or_else(|| GridError::TimeUnits(format!("offset {offset} out of range")))
            })
            .collect()
    }
}
