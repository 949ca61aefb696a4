//! Aligning a sparse series with a dense one for comparison.

use crate::error::Result;
use crate::peak::{peak_for_water_year, peak_swe_for_zone, PeakSwe};
use crate::reference_year::ReferenceYear;
use crate::series::DailySeries;
use crate::water_year::year_range;
use chrono::NaiveDate;
use serde::Serialize;
use std::ops::Range;

/// Default calendar day for the annual comparison: March 1st.
pub const ANNUAL_COMPARISON_MONTH: u32 = 3;
pub const ANNUAL_COMPARISON_DAY: u32 = 1;
/// Default years for the annual comparison, 1992 through 2019.
pub const ANNUAL_COMPARISON_YEARS: Range<i32> = 1992..2020;

/// Values of both series on one shared date.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AlignedPair {
    pub date: NaiveDate,
    pub sparse: f64,
    pub dense: f64,
}

/// Pair both series on `dates`, keeping only dates where both hold a value.
pub fn align_on_dates<I>(dates: I, sparse: &DailySeries, dense: &DailySeries) -> Vec<AlignedPair>
where
    I: IntoIterator<Item = NaiveDate>,
{
    dates
        .into_iter()
        .filter_map(|date| {
            Some(AlignedPair {
                date,
                sparse: sparse.get(&date)?,
                dense: dense.get(&date)?,
            })
        })
        .collect()
}

/// Align on the dates of `sparse`. Dates before the first date of `dense`
/// are dropped; the remaining dates are inner-joined.
pub fn align_sparse_dense(sparse: &DailySeries, dense: &DailySeries) -> Vec<AlignedPair> {
    let Some(dense_start) = dense.first_date() else {
        return Vec::new();
    };
    align_on_dates(
        sparse.dates().filter(|date| *date >= dense_start),
        sparse,
        dense,
    )
}

/// Pearson correlation of `(x, y)` pairs. `None` for fewer than two pairs or
/// when either side has no variance.
pub fn pearson_correlation<I>(pairs: I) -> Option<f64>
where
    I: IntoIterator<Item = (f64, f64)>,
{
    let pairs: Vec<(f64, f64)> = pairs.into_iter().collect();
    if pairs.len() < 2 {
        return None;
    }
    let n = pairs.len() as f64;
    let mean_x = pairs.iter().map(|(x, _)| x).sum::<f64>() / n;
    let mean_y = pairs.iter().map(|(_, y)| y).sum::<f64>() / n;

    let (mut cov, mut var_x, mut var_y) = (0.0, 0.0, 0.0);
    for (x, y) in &pairs {
        let dx = x - mean_x;
        let dy = y - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }
    if var_x == 0.0 || var_y == 0.0 {
        return None;
    }
    Some(cov / (var_x.sqrt() * var_y.sqrt()))
}

/// Paired values and their correlation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonResult {
    pub zone: String,
    pub pairs: Vec<AlignedPair>,
    pub correlation: Option<f64>,
}

impl ComparisonResult {
    fn new(zone: &str, pairs: Vec<AlignedPair>) -> ComparisonResult {
        let correlation = pearson_correlation(pairs.iter().map(|p| (p.sparse, p.dense)));
        ComparisonResult {
            zone: zone.to_string(),
            pairs,
            correlation,
        }
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

/// Peak of each source within one water year.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeakDatePair {
    pub water_year: i32,
    pub snow17: PeakSwe,
    pub swann: PeakSwe,
}

impl PeakDatePair {
    /// Days from the Snow-17 peak to the SWANN peak; positive when SWANN
    /// peaks later.
    pub fn day_difference(&self) -> i64 {
        (self.swann.date - self.snow17.date).num_days()
    }
}

/// Snow-17 against SWANN for a single zone.
#[derive(Debug, Clone)]
pub struct Comparison {
    pub zone: String,
    pub snow17: DailySeries,
    pub swann: DailySeries,
}

impl Comparison {
    pub fn new(zone: impl Into<String>, snow17: DailySeries, swann: DailySeries) -> Comparison {
        Comparison {
            zone: zone.into(),
            snow17,
            swann,
        }
    }

    /// Values of both series on the Snow-17 peak date of each water year.
    /// Peak dates before the first SWANN date are dropped.
    pub fn peak_swe_values(&self, reference: ReferenceYear) -> Result<ComparisonResult> {
        let (Some(first), Some(last)) = (self.snow17.first_date(), self.snow17.last_date()) else {
            log::warn!("No Snow-17 values for zone {}", self.zone);
            return Ok(ComparisonResult::new(&self.zone, Vec::new()));
        };
        let peaks = peak_swe_for_zone(&self.snow17, year_range(&first, &last), reference)?;

        let peak_dates = DailySeries::from_points(
            self.snow17.name(),
            peaks.iter().map(|peak| (peak.date, peak.value)),
        );
        let pairs = align_sparse_dense(&peak_dates, &self.swann);
        log::debug!(
            "Zone {}: {} peak dates, {} paired with SWANN",
            self.zone,
            peaks.len(),
            pairs.len()
        );
        Ok(ComparisonResult::new(&self.zone, pairs))
    }

    /// Peak date of each source per water year of the Snow-17 record.
    /// Years in which SWANN has no values are skipped.
    pub fn peak_dates(&self, reference: ReferenceYear) -> Result<Vec<PeakDatePair>> {
        let (Some(first), Some(last)) = (self.snow17.first_date(), self.snow17.last_date()) else {
            log::warn!("No Snow-17 values for zone {}", self.zone);
            return Ok(Vec::new());
        };
        let years = year_range(&first, &last);
        let snow17 = peak_swe_for_zone(&self.snow17, years.clone(), reference)?;

        let mut pairs = Vec::with_capacity(snow17.len());
        for peak in snow17 {
            match peak_for_water_year(&self.swann, peak.water_year, reference)? {
                Some(swann) => pairs.push(PeakDatePair {
                    water_year: peak.water_year,
                    snow17: peak,
                    swann,
                }),
                None => log::debug!(
                    "Zone {}: no SWANN values in water year {}",
                    self.zone,
                    peak.water_year
                ),
            }
        }
        log::debug!(
            "Zone {}: {} of {} water years have peaks in both sources",
            self.zone,
            pairs.len(),
            years.len()
        );
        Ok(pairs)
    }

    /// Values of both series on `month`/`day` of each year in `years`.
    pub fn on_annual_date(&self, month: u32, day: u32, years: Range<i32>) -> ComparisonResult {
        let dates = years.filter_map(|year| NaiveDate::from_ymd_opt(year, month, day));
        ComparisonResult::new(&self.zone, align_on_dates(dates, &self.snow17, &self.swann))
    }

    /// [`Comparison::on_annual_date`] on March 1st, 1992 through 2019.
    pub fn on_march_first(&self) -> ComparisonResult {
        self.on_annual_date(
            ANNUAL_COMPARISON_MONTH,
            ANNUAL_COMPARISON_DAY,
            ANNUAL_COMPARISON_YEARS,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::date_range::DateRange;
    use chrono::Datelike;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn sparse_dates_before_dense_start_are_dropped() {
        let sparse = DailySeries::from_points(
            "snow17",
            vec![
                (d(2001, 3, 1), 1.0),
                (d(2002, 3, 1), 2.0),
                (d(2003, 3, 1), 3.0),
                (d(2004, 3, 1), 4.0),
                (d(2005, 3, 1), 5.0),
            ],
        );
        let dense = DailySeries::from_points(
            "swann",
            DateRange(d(2001, 6, 1), d(2005, 12, 31)).map(|date| (date, date.year() as f64)),
        );
        let pairs = align_sparse_dense(&sparse, &dense);
        assert_eq!(pairs.len(), 4);
        assert_eq!(pairs[0].date, d(2002, 3, 1));
        assert_eq!(pairs[0].dense, 2002.0);
    }

    #[test]
    fn dense_start_date_is_kept() {
        let sparse = DailySeries::from_points("a", vec![(d(2001, 3, 1), 1.0)]);
        let dense = DailySeries::from_points("b", vec![(d(2001, 3, 1), 7.0)]);
        assert_eq!(align_sparse_dense(&sparse, &dense).len(), 1);
        assert!(align_sparse_dense(&sparse, &DailySeries::new("empty")).is_empty());
    }

    #[test]
    fn correlation_edge_cases() {
        assert_eq!(pearson_correlation(vec![(1.0, 2.0)]), None);
        assert_eq!(pearson_correlation(vec![(1.0, 2.0), (1.0, 3.0)]), None);
        let r = pearson_correlation(vec![(1.0, 2.0), (2.0, 4.0), (3.0, 6.0)]).unwrap();
        assert!((r - 1.0).abs() < 1e-12);
        let r = pearson_correlation(vec![(1.0, 3.0), (2.0, 2.0), (3.0, 1.0)]).unwrap();
        assert!((r + 1.0).abs() < 1e-12);
    }

    #[test]
    fn peak_values_pair_with_swann() {
        let days = DateRange(d(2000, 10, 1), d(2004, 9, 30));
        let hump = |date: NaiveDate| {
            let centre = d(date.year(), 3, 15);
            400.0 - (date - centre).num_days().abs() as f64
        };
        let snow17 = DailySeries::from_points("GBRW4U", days.map(|date| (date, hump(date))));
        // SWANN starts in the second water year, at 90% of Snow-17
        let swann = DailySeries::from_points(
            "GBRW4U_SWANN",
            DateRange(d(2001, 10, 1), d(2004, 9, 30)).map(|date| (date, 0.9 * hump(date))),
        );
        let comparison = Comparison::new("GBRW4U", snow17, swann);
        let result = comparison.peak_swe_values(ReferenceYear::default()).unwrap();
        // water years 2001..2003 from the Snow-17 record; 2001 predates SWANN
        assert_eq!(result.len(), 2);
        assert_eq!(result.pairs[0].date, d(2002, 3, 15));
        assert_eq!(result.pairs[0].sparse, 400.0);
        assert!((result.pairs[0].dense - 360.0).abs() < 1e-9);
        // identical peaks every year leave no variance to correlate
        assert_eq!(result.correlation, None);
    }

    #[test]
    fn annual_date_comparison_skips_missing_years() {
        let snow17 = DailySeries::from_points(
            "Z",
            (1992..2000).map(|year| (d(year, 3, 1), year as f64)),
        );
        let swann = DailySeries::from_points(
            "Z_SWANN",
            (1994..2020).map(|year| (d(year, 3, 1), 2.0 * year as f64)),
        );
        let result = Comparison::new("Z", snow17, swann).on_march_first();
        assert_eq!(result.len(), 6);
        assert_eq!(result.pairs[0].date, d(1994, 3, 1));
        let r = result.correlation.unwrap();
        assert!((r - 1.0).abs() < 1e-12);
    }

    #[test]
    fn peak_dates_compare_both_sources() {
        let days = DateRange(d(2000, 10, 1), d(2003, 9, 30));
        let hump = |date: NaiveDate, centre: NaiveDate| 400.0 - (date - centre).num_days().abs() as f64;
        let snow17 = DailySeries::from_points(
            "GBRW4U",
            days.map(|date| (date, hump(date, d(date.year(), 3, 15)))),
        );
        // SWANN covers water years 2002 and 2003 and peaks ten days later
        let swann = DailySeries::from_points(
            "GBRW4U_SWANN",
            DateRange(d(2001, 10, 1), d(2003, 9, 30))
                .map(|date| (date, hump(date, d(date.year(), 3, 25)))),
        );
        let comparison = Comparison::new("GBRW4U", snow17, swann);
        let pairs = comparison.peak_dates(ReferenceYear::default()).unwrap();

        // Snow-17 years 2001..2003; 2001 has no SWANN values
        assert_eq!(pairs.len(), 1);
        let pair = &pairs[0];
        assert_eq!(pair.water_year, 2002);
        assert_eq!(pair.snow17.date, d(2002, 3, 15));
        assert_eq!(pair.swann.date, d(2002, 3, 25));
        assert_eq!(pair.snow17.normalized_date, d(1880, 3, 15));
        assert_eq!(pair.swann.normalized_date, d(1880, 3, 25));
        assert_eq!(pair.day_difference(), 10);
    }
}
