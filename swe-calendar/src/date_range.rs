use chrono::{NaiveDate, TimeDelta};
use std::mem::replace;

/// Inclusive range of days from the start date through the end date.
#[derive(Clone, Eq, PartialEq, Copy, Debug)]
pub struct DateRange(pub NaiveDate, pub NaiveDate);

impl Iterator for DateRange {
    type Item = NaiveDate;
    fn next(&mut self) -> Option<Self::Item> {
        if self.0 <= self.1 {
            let next = self.0 + TimeDelta::days(1);
            Some(replace(&mut self.0, next))
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::DateRange;
    use chrono::NaiveDate;

    #[test]
    fn iterates_inclusive_of_both_ends() {
        let start = NaiveDate::from_ymd_opt(2019, 9, 28).unwrap();
        let end = NaiveDate::from_ymd_opt(2019, 10, 2).unwrap();
        let dates: Vec<NaiveDate> = DateRange(start, end).collect();
        assert_eq!(dates.len(), 5);
        assert_eq!(dates[0], start);
        assert_eq!(dates[4], end);
    }

    #[test]
    fn crosses_leap_day() {
        let start = NaiveDate::from_ymd_opt(2020, 2, 28).unwrap();
        let end = NaiveDate::from_ymd_opt(2020, 3, 1).unwrap();
        let dates: Vec<NaiveDate> = DateRange(start, end).collect();
        assert_eq!(dates[1], NaiveDate::from_ymd_opt(2020, 2, 29).unwrap());
    }

    #[test]
    fn reversed_range_is_empty() {
        let start = NaiveDate::from_ymd_opt(2022, 3, 15).unwrap();
        let end = NaiveDate::from_ymd_opt(2022, 3, 14).unwrap();
        assert_eq!(DateRange(start, end).count(), 0);
    }
}
