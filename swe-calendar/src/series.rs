//! Named daily series and their wide CSV form.

use chrono::NaiveDate;
use csv::{ReaderBuilder, WriterBuilder};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::io::{Read, Write};
use swe_utils::dates::{format_date, parse_date};

use crate::error::{CalendarError, Result};

/// Header of the date column in wide series CSVs.
pub const DATE_COLUMN: &str = "date";

/// A named, date-ordered series of daily values.
///
/// Missing values are never stored: inserting `NaN` leaves the date absent,
/// so every stored point is a real observation.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct DailySeries {
    name: String,
    points: BTreeMap<NaiveDate, f64>,
}

impl DailySeries {
    pub fn new(name: impl Into<String>) -> DailySeries {
        DailySeries {
            name: name.into(),
            points: BTreeMap::new(),
        }
    }

    pub fn from_points<I>(name: impl Into<String>, points: I) -> DailySeries
    where
        I: IntoIterator<Item = (NaiveDate, f64)>,
    {
        let mut series = DailySeries::new(name);
        for (date, value) in points {
            series.insert(date, value);
        }
        series
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn with_name(mut self, name: impl Into<String>) -> DailySeries {
        self.name = name.into();
        self
    }

    /// Store a value; a later value for the same date replaces the earlier one.
    pub fn insert(&mut self, date: NaiveDate, value: f64) {
        if value.is_nan() {
            return;
        }
        self.points.insert(date, value);
    }

    pub fn get(&self, date: &NaiveDate) -> Option<f64> {
        self.points.get(date).copied()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.points.keys().next().copied()
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.points.keys().next_back().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (NaiveDate, f64)> + '_ {
        self.points.iter().map(|(date, value)| (*date, *value))
    }

    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.points.keys().copied()
    }

    /// Points within `[start, end]`, in date order.
    pub fn window(&self, start: NaiveDate, end: NaiveDate) -> impl Iterator<Item = (NaiveDate, f64)> + '_ {
        let range = if start <= end {
            self.points.range(start..=end)
        } else {
            self.points.range(start..start)
        };
        range.map(|(date, value)| (*date, *value))
    }

    /// Date and value of the maximum within `[start, end]`. The earliest
    /// date wins when several share the maximum.
    pub fn idxmax(&self, start: NaiveDate, end: NaiveDate) -> Option<(NaiveDate, f64)> {
        self.window(start, end).fold(None, |best, (date, value)| match best {
            Some((_, best_value)) if value <= best_value => best,
            _ => Some((date, value)),
        })
    }
}

/// Write series side by side: `date,<name>...`, one row per date present in
/// any series. Missing values are written as empty cells.
pub fn write_wide_csv<W: Write>(writer: W, series: &[DailySeries]) -> Result<()> {
    let mut wtr = WriterBuilder::new().has_headers(false).from_writer(writer);

    let mut header = vec![DATE_COLUMN.to_string()];
    header.extend(series.iter().map(|s| s.name().to_string()));
    wtr.write_record(&header)?;

    let dates: BTreeSet<NaiveDate> = series.iter().flat_map(|s| s.dates()).collect();
    for date in dates {
        let mut row = vec![format_date(&date)];
        row.extend(
            series
                .iter()
                .map(|s| s.get(&date).map_or(String::new(), |v| v.to_string())),
        );
        wtr.write_record(&row)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Read a wide CSV written by [`write_wide_csv`] back into one series per
/// value column. Empty or non-numeric cells are skipped.
pub fn read_wide_csv<R: Read>(reader: R) -> Result<Vec<DailySeries>> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let headers = rdr.headers()?.clone();
    let date_index = headers
        .iter()
        .position(|h| h.trim() == DATE_COLUMN)
        .ok_or_else(|| CalendarError::MissingColumn(DATE_COLUMN.to_string()))?;

    let mut series: Vec<(usize, DailySeries)> = headers
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != date_index)
        .map(|(i, name)| (i, DailySeries::new(name.trim())))
        .collect();

    for result in rdr.records() {
        let record = result?;
        let raw_date = record.get(date_index).unwrap_or("");
        let date = parse_date(raw_date)
            .map_err(|e| CalendarError::InvalidDate(format!("{raw_date}: {e}")))?;
        for (i, s) in series.iter_mut() {
            if let Some(value) = record.get(*i).and_then(|v| v.trim().parse::<f64>().ok()) {
                s.insert(date, value);
            }
        }
    }

    Ok(series.into_iter().map(|(_, s)| s).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn nan_values_are_not_stored() {
        let series = DailySeries::from_points(
            "GBRW4U",
            vec![(d(2020, 1, 1), 1.0), (d(2020, 1, 2), f64::NAN), (d(2020, 1, 3), 3.0)],
        );
        assert_eq!(series.len(), 2);
        assert_eq!(series.get(&d(2020, 1, 2)), None);
    }

    #[test]
    fn idxmax_prefers_first_of_ties() {
        let series = DailySeries::from_points(
            "Z",
            vec![
                (d(2020, 3, 1), 5.0),
                (d(2020, 3, 2), 7.0),
                (d(2020, 3, 3), 7.0),
                (d(2020, 3, 4), 2.0),
            ],
        );
        assert_eq!(
            series.idxmax(d(2020, 1, 1), d(2020, 12, 31)),
            Some((d(2020, 3, 2), 7.0))
        );
        assert_eq!(series.idxmax(d(2021, 1, 1), d(2021, 12, 31)), None);
        assert_eq!(series.idxmax(d(2020, 12, 31), d(2020, 1, 1)), None);
    }

    #[test]
    fn wide_csv_round_trip_keeps_gaps() {
        let a = DailySeries::from_points("A", vec![(d(2020, 1, 1), 1.5), (d(2020, 1, 2), 2.0)]);
        let b = DailySeries::from_points("B_SWANN", vec![(d(2020, 1, 2), 4.25)]);

        let mut buffer = Vec::new();
        write_wide_csv(&mut buffer, &[a.clone(), b.clone()]).unwrap();
        let text = String::from_utf8(buffer.clone()).unwrap();
        assert_eq!(text, "date,A,B_SWANN\n2020-01-01,1.5,\n2020-01-02,2,4.25\n");

        let restored = read_wide_csv(buffer.as_slice()).unwrap();
        assert_eq!(restored, vec![a, b]);
    }

    #[test]
    fn read_requires_date_column() {
        let csv = "day,A\n2020-01-01,1\n";
        assert!(matches!(
            read_wide_csv(csv.as_bytes()),
            Err(CalendarError::MissingColumn(_))
        ));
    }
}
