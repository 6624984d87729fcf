//! Weekly timesheet for one worker on one site: seven day rows plus a total.

use crate::models::interval::TimeInterval;
use crate::models::week::WeekBucket;
use crate::utils::date::{Calendar, add_days, weekday_name_da};
use crate::utils::time::clock_text;
use chrono::{Datelike, NaiveDate};

#[derive(Debug, Clone, PartialEq)]
pub struct TimesheetDay {
    pub date: NaiveDate,
    pub weekday: &'static str,
    pub start: Option<String>,
    pub end: Option<String>,
    pub break_minutes: i64,
    pub worked_minutes: i64,
    pub notes: String,
}

/// Header fields printed above the grid.
#[derive(Debug, Clone, Default)]
pub struct TimesheetHeader {
    pub worker_id: String,
    pub worker_name: String,
    pub company: String,
    pub site_name: String,
    pub site_line: String,
}

#[derive(Debug, Clone)]
pub struct Timesheet {
    pub header: TimesheetHeader,
    pub bucket: WeekBucket,
    pub days: Vec<TimesheetDay>,
}

/// A logged shift together with its free-text note.
#[derive(Debug, Clone)]
pub struct TimesheetEntry {
    pub interval: TimeInterval,
    pub notes: Option<String>,
}

impl Timesheet {
    pub fn total_minutes(&self) -> i64 {
        self.days.iter().map(|d| d.worked_minutes).sum()
    }

    /// `Anna Holm - 2025W42.pdf`
    pub fn file_name(&self) -> String {
        let name = self.header.worker_name.replace(['/', '\\'], "_");
        format!("{} - {}.pdf", name, self.bucket.label())
    }
}

pub fn build_timesheet(
    calendar: &Calendar,
    header: TimesheetHeader,
    bucket: WeekBucket,
    entries: &[TimesheetEntry],
) -> Timesheet {
    let mine: Vec<&TimesheetEntry> = entries
        .iter()
        .filter(|e| e.interval.subject_id == header.worker_id)
        .collect();

    let days = (0..7)
        .map(|offset| {
            let date = add_days(bucket.week_start, offset);
            let day_rows: Vec<&TimesheetEntry> = mine
                .iter()
                .copied()
                .filter(|e| calendar.date_of(&e.interval.started_at) == date)
                .collect();

            day_row(calendar, date, &day_rows)
        })
        .collect();

    Timesheet {
        header,
        bucket,
        days,
    }
}

fn day_row(calendar: &Calendar, date: NaiveDate, rows: &[&TimesheetEntry]) -> TimesheetDay {
    let weekday = weekday_name_da(date.weekday());

    let start = rows.iter().map(|e| e.interval.started_at).min();
    let end = rows.iter().map(|e| e.interval.ended_at).max();
    let break_minutes = rows
        .iter()
        .map(|e| e.interval.break_minutes.max(0))
        .fold(0i64, i64::saturating_add);
    let worked_minutes = rows.iter().map(|e| e.interval.worked_minutes()).sum();
    let notes = rows
        .iter()
        .filter_map(|e| e.notes.as_deref())
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .collect::<Vec<_>>()
        .join("; ");

    TimesheetDay {
        date,
        weekday,
        start: start.map(|s| clock_text(calendar, &s)),
        end: end.map(|e| clock_text(calendar, &e)),
        break_minutes,
        worked_minutes,
        notes,
    }
}
