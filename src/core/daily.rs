//! Per-day totals for the site calendar and the day drill-down.

use crate::models::interval::TimeInterval;
use crate::utils::date::Calendar;
use chrono::NaiveDate;
use std::collections::{BTreeMap, HashMap};

/// Worked minutes per start date for `first..=last`.
/// Days without activity are absent from the map.
pub fn daily_totals(
    calendar: &Calendar,
    intervals: &[TimeInterval],
    first: NaiveDate,
    last: NaiveDate,
) -> BTreeMap<NaiveDate, i64> {
    let mut out = BTreeMap::new();

    for iv in intervals {
        let day = calendar.date_of(&iv.started_at);
        if day < first || day > last {
            continue;
        }
        let minutes = iv.worked_minutes();
        if minutes > 0 {
            *out.entry(day).or_insert(0) += minutes;
        }
    }

    out
}

/// Minutes per worker on one day, largest first; ties by worker id.
pub fn day_breakdown(
    calendar: &Calendar,
    intervals: &[TimeInterval],
    day: NaiveDate,
) -> Vec<(String, i64)> {
    let mut by_worker: HashMap<&str, i64> = HashMap::new();

    for iv in intervals {
        if calendar.date_of(&iv.started_at) != day {
            continue;
        }
        let minutes = iv.worked_minutes();
        if minutes <= 0 {
            continue;
        }
        *by_worker.entry(iv.subject_id.as_str()).or_insert(0) += minutes;
    }

    let mut list: Vec<(String, i64)> = by_worker
        .into_iter()
        .map(|(id, m)| (id.to_string(), m))
        .collect();
    list.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    list
}
