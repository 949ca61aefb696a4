//! Snow-17 model output: `year,month,day,ztime,<ZONE>...`, SWE in inches.

use crate::error::{CalendarError, Result};
use crate::series::DailySeries;
use chrono::NaiveDate;
use csv::{ReaderBuilder, StringRecord};
use std::fs::File;
use std::io::Read;
use std::path::Path;

pub const INCH_TO_MM: f64 = 25.4;

const YEAR: &str = "year";
const MONTH: &str = "month";
const DAY: &str = "day";
const ZTIME: &str = "ztime";

/// Snow-17 SWE per zone, converted to millimetres.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Snow17Swe {
    zones: Vec<DailySeries>,
}

fn column(headers: &StringRecord, name: &str) -> Result<usize> {
    headers
        .iter()
        .position(|h| h.trim() == name)
        .ok_or_else(|| CalendarError::MissingColumn(name.to_string()))
}

fn field<'r>(record: &'r StringRecord, index: usize) -> &'r str {
    record.get(index).unwrap_or("").trim()
}

impl Snow17Swe {
    pub fn parse_csv<R: Read>(reader: R) -> Result<Snow17Swe> {
        let mut rdr = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);

        let headers = rdr.headers()?.clone();
        let year = column(&headers, YEAR)?;
        let month = column(&headers, MONTH)?;
        let day = column(&headers, DAY)?;
        let ztime = headers.iter().position(|h| h.trim() == ZTIME);

        let mut zones: Vec<(usize, DailySeries)> = headers
            .iter()
            .enumerate()
            .filter(|(i, _)| ![year, month, day].contains(i) && Some(*i) != ztime)
            .map(|(i, name)| (i, DailySeries::new(name.trim())))
            .collect();

        for result in rdr.records() {
            let record = result?;
            let (y, m, d) = (field(&record, year), field(&record, month), field(&record, day));
            let date = match (y.parse::<i32>(), m.parse::<u32>(), d.parse::<u32>()) {
                (Ok(y), Ok(m), Ok(d)) => NaiveDate::from_ymd_opt(y, m, d),
                _ => None,
            }
            .ok_or_else(|| CalendarError::InvalidDate(format!("{y}-{m}-{d}")))?;

            for (i, series) in zones.iter_mut() {
                if let Ok(inches) = field(&record, *i).parse::<f64>() {
                    series.insert(date, inches * INCH_TO_MM);
                }
            }
        }

        log::debug!("Parsed Snow-17 SWE for {} zones", zones.len());
        Ok(Snow17Swe {
            zones: zones.into_iter().map(|(_, series)| series).collect(),
        })
    }

    pub fn from_path(path: &Path) -> Result<Snow17Swe> {
        let file = File::open(path)?;
        let parsed = Snow17Swe::parse_csv(file)?;
        log::info!(
            "Loaded Snow-17 SWE from {} ({} zones)",
            path.display(),
            parsed.zones.len()
        );
        Ok(parsed)
    }

    pub fn zone(&self, name: &str) -> Option<&DailySeries> {
        self.zones.iter().find(|series| series.name() == name)
    }

    /// Series in header order.
    pub fn zones(&self) -> &[DailySeries] {
        &self.zones
    }

    pub fn zone_names(&self) -> Vec<&str> {
        self.zones.iter().map(DailySeries::name).collect()
    }
}
