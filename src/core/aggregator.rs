//! Weekly hours aggregation.
//!
//! Turns raw shifts into Monday-aligned ISO-week rows with total, weekend and
//! overtime minutes. Pure and synchronous: the caller supplies the rows, the
//! window and the calendar; nothing here reads the clock or the database.

use crate::models::interval::TimeInterval;
use crate::models::week::{WeekBucket, WeekTotals};
use crate::utils::date::{Calendar, add_days, is_weekend, start_of_iso_week};
use chrono::NaiveDate;
use clap::ValueEnum;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupBy {
    #[default]
    None,
    Worker,
    Site,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Order {
    #[value(name = "oldest")]
    OldestFirst,
    #[default]
    #[value(name = "newest")]
    NewestFirst,
}

/// Longest trailing window a report may ask for (ten years).
pub const MAX_WEEKS: u32 = 520;

/// Half-open date range `[start, end_exclusive)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeekWindow {
    pub start: NaiveDate,
    pub end_exclusive: NaiveDate,
}

impl WeekWindow {
    pub fn new(start: NaiveDate, end_exclusive: NaiveDate) -> Self {
        Self {
            start,
            end_exclusive,
        }
    }

    /// `weeks` whole weeks, the last one being the week that contains `today`.
    /// `weeks` is clamped to `1..=MAX_WEEKS`.
    pub fn trailing_weeks(today: NaiveDate, weeks: u32) -> Self {
        let this_monday = start_of_iso_week(today);
        let weeks = weeks.clamp(1, MAX_WEEKS) as i64;
        Self {
            start: add_days(this_monday, -7 * (weeks - 1)),
            end_exclusive: add_days(this_monday, 7),
        }
    }

    /// From `epoch` through the end of the week containing `today`.
    pub fn since(epoch: NaiveDate, today: NaiveDate) -> Self {
        Self {
            start: epoch,
            end_exclusive: add_days(start_of_iso_week(today), 7),
        }
    }

    /// Exactly one ISO week.
    pub fn single(bucket: &WeekBucket) -> Self {
        Self {
            start: bucket.week_start,
            end_exclusive: bucket.week_end_exclusive(),
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date < self.end_exclusive
    }

    pub fn is_empty(&self) -> bool {
        self.end_exclusive <= self.start
    }
}

/// One bucket of the report.
/// `totals` counts every contributing shift; `groups` only those that carry
/// the grouping key.
#[derive(Debug, Clone, Serialize)]
pub struct WeekRow {
    pub bucket: WeekBucket,
    pub totals: WeekTotals,
    pub groups: BTreeMap<String, WeekTotals>,
}

impl WeekRow {
    pub fn label(&self) -> String {
        self.bucket.label()
    }

    pub fn span_text(&self) -> String {
        self.bucket.span_text()
    }

    pub fn group(&self, key: &str) -> WeekTotals {
        self.groups.get(key).copied().unwrap_or_default()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct WeeklyReport {
    pub group_by: GroupBy,
    pub rows: Vec<WeekRow>,
}

impl WeeklyReport {
    pub fn newest_first(mut self) -> Self {
        self.rows.reverse();
        self
    }

    /// Rows come out of the aggregator oldest first.
    pub fn ordered(self, order: Order) -> Self {
        match order {
            Order::OldestFirst => self,
            Order::NewestFirst => self.newest_first(),
        }
    }

    pub fn group_keys(&self) -> BTreeSet<String> {
        self.rows
            .iter()
            .flat_map(|r| r.groups.keys().cloned())
            .collect()
    }

    pub fn row_for(&self, week_start: NaiveDate) -> Option<&WeekRow> {
        self.rows.iter().find(|r| r.bucket.week_start == week_start)
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct Tally {
    total: i64,
    weekend: i64,
}

impl Tally {
    fn add(&mut self, minutes: i64, weekend: bool) {
        self.total += minutes;
        if weekend {
            self.weekend += minutes;
        }
    }

    fn finish(self) -> WeekTotals {
        WeekTotals::from_minutes(self.total, self.weekend)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct WeeklyHoursAggregator {
    calendar: Calendar,
}

impl WeeklyHoursAggregator {
    pub fn new(calendar: Calendar) -> Self {
        Self { calendar }
    }

    pub fn calendar(&self) -> &Calendar {
        &self.calendar
    }

    /// Consecutive Monday buckets from the Monday on or before
    /// `window.start` while the bucket start is before `window.end_exclusive`.
    pub fn buckets(window: WeekWindow) -> Vec<WeekBucket> {
        let mut out = Vec::new();
        if window.is_empty() {
            return out;
        }

        let mut monday = start_of_iso_week(window.start);
        while monday < window.end_exclusive {
            out.push(WeekBucket::containing(monday));
            monday = add_days(monday, 7);
        }
        out
    }

    pub fn aggregate(
        &self,
        intervals: &[TimeInterval],
        window: WeekWindow,
        group_by: GroupBy,
    ) -> WeeklyReport {
        let buckets = Self::buckets(window);
        let Some(first) = buckets.first().map(|b| b.week_start) else {
            return WeeklyReport {
                group_by,
                rows: Vec::new(),
            };
        };

        let mut grand = vec![Tally::default(); buckets.len()];
        let mut grouped: Vec<BTreeMap<String, Tally>> = vec![BTreeMap::new(); buckets.len()];

        for iv in intervals {
            let minutes = iv.worked_minutes();
            if minutes <= 0 {
                continue;
            }

            let day = self.calendar.date_of(&iv.started_at);
            if !window.contains(day) {
                continue;
            }

            let idx = ((day - first).num_days() / 7) as usize;
            let Some(tally) = grand.get_mut(idx) else {
                continue;
            };

            let weekend = is_weekend(day);
            tally.add(minutes, weekend);

            if let Some(key) = group_key(iv, group_by) {
                grouped[idx]
                    .entry(key.to_string())
                    .or_default()
                    .add(minutes, weekend);
            }
        }

        let rows = buckets
            .into_iter()
            .zip(grand)
            .zip(grouped)
            .map(|((bucket, tally), groups)| WeekRow {
                bucket,
                totals: tally.finish(),
                groups: groups.into_iter().map(|(k, t)| (k, t.finish())).collect(),
            })
            .collect();

        WeeklyReport { group_by, rows }
    }
}

fn group_key(iv: &TimeInterval, group_by: GroupBy) -> Option<&str> {
    let key = match group_by {
        GroupBy::None => return None,
        GroupBy::Worker => Some(iv.subject_id.as_str()),
        GroupBy::Site => iv.site_id.as_deref(),
    };
    key.map(str::trim).filter(|k| !k.is_empty())
}
