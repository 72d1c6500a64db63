//! Calendar period arithmetic — truncation and elapsed-index math.
//!
//! RULE: A `Period` is always the truncation of some date at a fixed
//! granularity. Two periods only compare or subtract when their
//! granularities match; mixing granularities is a programming error,
//! not a data-quality issue.

use crate::types::ElapsedIndex;
use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Granularity {
    #[default]
    Month,
    Week,
    Quarter,
}

impl Granularity {
    /// Truncate a date to the period containing it.
    pub fn truncate(self, date: NaiveDate) -> Period {
        let start = match self {
            Granularity::Month => first_of_month(date.year(), date.month()),
            Granularity::Quarter => {
                let quarter_month = ((date.month() - 1) / 3) * 3 + 1;
                first_of_month(date.year(), quarter_month)
            }
            // ISO weeks: anchor on the Monday of the containing week.
            Granularity::Week => {
                date - Duration::days(date.weekday().num_days_from_monday() as i64)
            }
        };
        Period { start, granularity: self }
    }

    pub fn name(self) -> &'static str {
        match self {
            Granularity::Month => "month",
            Granularity::Week => "week",
            Granularity::Quarter => "quarter",
        }
    }
}

/// A calendar period at a fixed granularity, identified by its start date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Period {
    start: NaiveDate,
    granularity: Granularity,
}

impl Period {
    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn granularity(&self) -> Granularity {
        self.granularity
    }

    /// Elapsed periods from `cohort` to `self`, in granularity units.
    /// Returns None when `self` precedes `cohort` (inconsistent data)
    /// or when the granularities differ.
    pub fn index_since(&self, cohort: &Period) -> Option<ElapsedIndex> {
        if self.granularity != cohort.granularity {
            return None;
        }
        let diff: i64 = match self.granularity {
            Granularity::Month => {
                months_since_epoch(self.start) - months_since_epoch(cohort.start)
            }
            Granularity::Quarter => {
                quarters_since_epoch(self.start) - quarters_since_epoch(cohort.start)
            }
            Granularity::Week => (self.start - cohort.start).num_days() / 7,
        };
        usize::try_from(diff).ok()
    }

    /// Human-readable label: "2024-01", "2024-Q1", or "2024-W05".
    pub fn label(&self) -> String {
        match self.granularity {
            Granularity::Month => format!("{:04}-{:02}", self.start.year(), self.start.month()),
            Granularity::Quarter => format!(
                "{:04}-Q{}",
                self.start.year(),
                (self.start.month() - 1) / 3 + 1
            ),
            Granularity::Week => {
                let iso = self.start.iso_week();
                format!("{:04}-W{:02}", iso.year(), iso.week())
            }
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

fn first_of_month(year: i32, month: u32) -> NaiveDate {
    // month comes from a valid NaiveDate, so this cannot fail
    NaiveDate::from_ymd_opt(year, month, 1).expect("valid first-of-month date")
}

fn months_since_epoch(date: NaiveDate) -> i64 {
    date.year() as i64 * 12 + (date.month() as i64 - 1)
}

fn quarters_since_epoch(date: NaiveDate) -> i64 {
    date.year() as i64 * 4 + (date.month() as i64 - 1) / 3
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn month_truncation_and_label() {
        let p = Granularity::Month.truncate(date(2024, 3, 17));
        assert_eq!(p.start(), date(2024, 3, 1));
        assert_eq!(p.label(), "2024-03");
    }

    #[test]
    fn month_index_crosses_year_boundary() {
        let cohort = Granularity::Month.truncate(date(2023, 11, 5));
        let later = Granularity::Month.truncate(date(2024, 2, 28));
        assert_eq!(later.index_since(&cohort), Some(3));
    }

    #[test]
    fn negative_index_is_none() {
        let cohort = Granularity::Month.truncate(date(2024, 2, 1));
        let earlier = Granularity::Month.truncate(date(2024, 1, 31));
        assert_eq!(earlier.index_since(&cohort), None);
    }

    #[test]
    fn same_period_is_index_zero() {
        let a = Granularity::Month.truncate(date(2024, 1, 5));
        let b = Granularity::Month.truncate(date(2024, 1, 30));
        assert_eq!(a.index_since(&b), Some(0));
        assert_eq!(b.index_since(&a), Some(0));
    }

    #[test]
    fn quarter_truncation_and_index() {
        let q4 = Granularity::Quarter.truncate(date(2023, 12, 31));
        assert_eq!(q4.start(), date(2023, 10, 1));
        assert_eq!(q4.label(), "2023-Q4");

        let q2 = Granularity::Quarter.truncate(date(2024, 6, 1));
        assert_eq!(q2.index_since(&q4), Some(2));
    }

    #[test]
    fn week_anchors_on_monday() {
        // 2024-01-03 is a Wednesday; its ISO week starts Monday 2024-01-01.
        let p = Granularity::Week.truncate(date(2024, 1, 3));
        assert_eq!(p.start(), date(2024, 1, 1));

        let next = Granularity::Week.truncate(date(2024, 1, 8));
        assert_eq!(next.index_since(&p), Some(1));
    }

    #[test]
    fn mixed_granularity_is_none() {
        let m = Granularity::Month.truncate(date(2024, 1, 1));
        let w = Granularity::Week.truncate(date(2024, 3, 1));
        assert_eq!(w.index_since(&m), None);
    }
}
