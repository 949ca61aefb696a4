//! Date of peak SWE per water year.

use crate::error::{CalendarError, Result};
use crate::reference_year::ReferenceYear;
use crate::series::DailySeries;
use crate::water_year::{year_range, WaterYear};
use chrono::NaiveDate;
use csv::Writer;
use serde::{Deserialize, Serialize};
use std::io::Write;
use swe_utils::dates::day_of_water_year;

/// The maximum of one zone's series within one water year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeakSwe {
    pub water_year: i32,
    /// Actual date of the maximum.
    pub date: NaiveDate,
    /// `date` moved into the reference year, for overlaying years.
    pub normalized_date: NaiveDate,
    pub day_of_water_year: i32,
    pub value: f64,
}

#[derive(Debug, Serialize)]
struct PeakRow<'a> {
    zone: &'a str,
    water_year: i32,
    date: NaiveDate,
    normalized_date: NaiveDate,
    day_of_water_year: i32,
    value: f64,
}

/// The peak of `series` in water year `year`, or `None` when the window
/// holds no values.
pub fn peak_for_water_year(
    series: &DailySeries,
    year: i32,
    reference: ReferenceYear,
) -> Result<Option<PeakSwe>> {
    let days = WaterYear(year).days()?;
    Ok(series.idxmax(days.0, days.1).map(|(date, value)| PeakSwe {
        water_year: year,
        date,
        normalized_date: reference.normalize(&date),
        day_of_water_year: day_of_water_year(&date),
        value,
    }))
}

/// Find the peak of `series` in each requested water year.
///
/// A year whose window holds no values fails with
/// [`CalendarError::NoDataInWindow`].
pub fn peak_swe_for_zone<I>(
    series: &DailySeries,
    years: I,
    reference: ReferenceYear,
) -> Result<Vec<PeakSwe>>
where
    I: IntoIterator<Item = i32>,
{
    years
        .into_iter()
        .map(|year| match peak_for_water_year(series, year, reference)? {
            Some(peak) => Ok(peak),
            None => {
                let days = WaterYear(year).days()?;
                Err(CalendarError::NoDataInWindow {
                    year,
                    start: days.0,
                    end: days.1,
                })
            }
        })
        .collect()
}

/// Peak dates for a set of zones over a shared range of water years.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PeakTable {
    pub years: Vec<i32>,
    pub zones: Vec<(String, Vec<PeakSwe>)>,
}

impl PeakTable {
    pub fn zone(&self, name: &str) -> Option<&[PeakSwe]> {
        self.zones
            .iter()
            .find(|(zone, _)| zone == name)
            .map(|(_, peaks)| peaks.as_slice())
    }

    pub fn is_empty(&self) -> bool {
        self.years.is_empty()
    }

    /// Long-form CSV: one row per zone and water year.
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<()> {
        let mut wtr = Writer::from_writer(writer);
        for (zone, peaks) in &self.zones {
            for peak in peaks {
                wtr.serialize(PeakRow {
                    zone,
                    water_year: peak.water_year,
                    date: peak.date,
                    normalized_date: peak.normalized_date,
                    day_of_water_year: peak.day_of_water_year,
                    value: peak.value,
                })?;
            }
        }
        wtr.flush()?;
        Ok(())
    }
}

/// Peak dates for every series. The water years run from the year after the
/// earliest date to the year before the latest one, across all series, and
/// are applied to every zone.
pub fn peak_swe_table(series_set: &[DailySeries], reference: ReferenceYear) -> Result<PeakTable> {
    let first = series_set.iter().filter_map(DailySeries::first_date).min();
    let last = series_set.iter().filter_map(DailySeries::last_date).max();
    let (first, last) = match (first, last) {
        (Some(first), Some(last)) => (first, last),
        _ => {
            log::warn!("No dated values; peak table is empty");
            return Ok(PeakTable::default());
        }
    };

    let years: Vec<i32> = year_range(&first, &last).collect();
    log::info!(
        "Extracting peak SWE for {} zones over water years {:?}..{:?}",
        series_set.len(),
        years.first(),
        years.last()
    );

    let zones = series_set
        .iter()
        .map(|series| {
            let peaks = peak_swe_for_zone(series, years.iter().copied(), reference)?;
            Ok((series.name().to_string(), peaks))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(PeakTable { years, zones })
}
