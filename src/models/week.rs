//! ISO-week identifiers, Monday-aligned buckets and per-week totals.

use crate::core::overtime::split_overtime;
use crate::errors::{AppError, AppResult};
use crate::utils::date::{add_days, start_of_iso_week};
use chrono::{Datelike, NaiveDate, Weekday};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// ISO-8601 week-numbering year + week number (1..=53).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct IsoWeek {
    pub year: i32,
    pub week: u32,
}

impl IsoWeek {
    /// Thursday rule: the Thursday of the date's Monday-based week decides the
    /// ISO year, and the week number counts whole weeks from that year's
    /// first Thursday.
    pub fn of(date: NaiveDate) -> Self {
        let thursday = add_days(start_of_iso_week(date), 3);
        Self {
            year: thursday.year(),
            week: thursday.ordinal0() / 7 + 1,
        }
    }

    pub fn monday(&self) -> AppResult<NaiveDate> {
        NaiveDate::from_isoywd_opt(self.year, self.week, Weekday::Mon)
            .ok_or_else(|| AppError::InvalidWeek(self.to_string()))
    }
}

impl fmt::Display for IsoWeek {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}W{:02}", self.year, self.week)
    }
}

/// Accepts `2025W42`, `2025-W42` and lowercase `w`.
impl FromStr for IsoWeek {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bad = || AppError::InvalidWeek(s.to_string());

        let upper = s.trim().to_ascii_uppercase();
        let (y, w) = upper.split_once('W').ok_or_else(bad)?;
        let year: i32 = y.trim_end_matches('-').parse().map_err(|_| bad())?;
        let week: u32 = w.parse().map_err(|_| bad())?;

        let parsed = IsoWeek { year, week };
        parsed.monday().map_err(|_| bad())?;
        Ok(parsed)
    }
}

/// A Monday-to-Sunday span.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WeekBucket {
    pub week_start: NaiveDate,
    pub iso_week: IsoWeek,
}

impl WeekBucket {
    pub fn containing(date: NaiveDate) -> Self {
        let week_start = start_of_iso_week(date);
        Self {
            week_start,
            iso_week: IsoWeek::of(week_start),
        }
    }

    pub fn label(&self) -> String {
        self.iso_week.to_string()
    }

    pub fn week_end_exclusive(&self) -> NaiveDate {
        add_days(self.week_start, 7)
    }

    pub fn last_day(&self) -> NaiveDate {
        add_days(self.week_start, 6)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.week_start && date < self.week_end_exclusive()
    }

    /// e.g. `13 Oct – 19 Oct`
    pub fn span_text(&self) -> String {
        format!(
            "{} – {}",
            self.week_start.format("%d %b"),
            self.last_day().format("%d %b")
        )
    }
}

/// Weekly totals for one bucket (and one group key, when grouped).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct WeekTotals {
    pub total_minutes: i64,
    pub weekend_minutes: i64,
    pub regular_minutes: i64,
    pub overtime_tier1_minutes: i64,
    pub overtime_tier2_minutes: i64,
}

impl WeekTotals {
    pub fn from_minutes(total_minutes: i64, weekend_minutes: i64) -> Self {
        let split = split_overtime(total_minutes);
        Self {
            total_minutes,
            weekend_minutes,
            regular_minutes: split.regular_minutes,
            overtime_tier1_minutes: split.tier1_minutes,
            overtime_tier2_minutes: split.tier2_minutes,
        }
    }

    pub fn weekday_minutes(&self) -> i64 {
        self.total_minutes - self.weekend_minutes
    }

    pub fn is_empty(&self) -> bool {
        self.total_minutes == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn iso_week_year_boundaries() {
        assert_eq!(IsoWeek::of(d(2026, 1, 1)).to_string(), "2026W01");
        assert_eq!(IsoWeek::of(d(2025, 12, 31)).to_string(), "2026W01");
        assert_eq!(IsoWeek::of(d(2025, 12, 28)).to_string(), "2025W52");
        assert_eq!(IsoWeek::of(d(2020, 12, 31)).to_string(), "2020W53");
        assert_eq!(IsoWeek::of(d(2021, 1, 3)).to_string(), "2020W53");
        assert_eq!(IsoWeek::of(d(2021, 1, 4)).to_string(), "2021W01");
        assert_eq!(IsoWeek::of(d(2025, 10, 15)).to_string(), "2025W42");
    }

    #[test]
    fn thursday_rule_agrees_with_chrono_for_a_decade() {
        let mut day = d(2018, 1, 1);
        while day < d(2029, 1, 1) {
            let ours = IsoWeek::of(day);
            let theirs = day.iso_week();
            assert_eq!((ours.year, ours.week), (theirs.year(), theirs.week()), "{day}");
            day = add_days(day, 1);
        }
    }

    #[test]
    fn parse_week_labels() {
        let w: IsoWeek = "2025W42".parse().unwrap();
        assert_eq!(w, IsoWeek { year: 2025, week: 42 });
        assert_eq!("2025-w09".parse::<IsoWeek>().unwrap().week, 9);
        assert_eq!(w.monday().unwrap(), d(2025, 10, 13));

        assert!("2025W54".parse::<IsoWeek>().is_err());
        assert!("2025W53".parse::<IsoWeek>().is_err());
        assert!("2020W53".parse::<IsoWeek>().is_ok());
        assert!("week 4".parse::<IsoWeek>().is_err());
    }

    #[test]
    fn bucket_span_and_bounds() {
        let b = WeekBucket::containing(d(2025, 10, 18));
        assert_eq!(b.week_start, d(2025, 10, 13));
        assert_eq!(b.label(), "2025W42");
        assert_eq!(b.span_text(), "13 Oct – 19 Oct");
        assert!(b.contains(d(2025, 10, 19)));
        assert!(!b.contains(d(2025, 10, 20)));
    }

    #[test]
    fn totals_expose_weekday_share() {
        let t = WeekTotals::from_minutes(2910, 360);
        assert_eq!(t.weekday_minutes(), 2550);
        assert_eq!(t.regular_minutes, 2220);
        assert_eq!(t.overtime_tier1_minutes, 690);
    }
}
