// src/export/model.rs
use crate::core::aggregator::{GroupBy, WeekRow, WeeklyReport};
use crate::models::week::WeekTotals;
use crate::utils::formatting::hours_decimal;
use serde::Serialize;

/// One flattened weekly row, shared by every export format.
#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct WeekExport {
    pub week: String,
    pub span: String,
    pub week_start: String,
    pub group: String,
    pub group_name: String,
    pub total_minutes: i64,
    pub weekend_minutes: i64,
    pub regular_minutes: i64,
    pub overtime_tier1_minutes: i64,
    pub overtime_tier2_minutes: i64,
    pub hours: f64,
}

impl WeekExport {
    fn new(row: &WeekRow, group: &str, group_name: String, t: &WeekTotals) -> Self {
        Self {
            week: row.label(),
            span: row.span_text(),
            week_start: row.bucket.week_start.format("%Y-%m-%d").to_string(),
            group: group.to_string(),
            group_name,
            total_minutes: t.total_minutes,
            weekend_minutes: t.weekend_minutes,
            regular_minutes: t.regular_minutes,
            overtime_tier1_minutes: t.overtime_tier1_minutes,
            overtime_tier2_minutes: t.overtime_tier2_minutes,
            hours: hours_decimal(t.total_minutes),
        }
    }
}

/// Ungrouped reports give one row per week (empty weeks included);
/// grouped reports give one row per week and group with hours.
pub(crate) fn flatten<F>(report: &WeeklyReport, name_of: F) -> Vec<WeekExport>
where
    F: Fn(&str) -> String,
{
    let mut out = Vec::new();
    for row in &report.rows {
        if report.group_by == GroupBy::None {
            out.push(WeekExport::new(row, "", String::new(), &row.totals));
            continue;
        }
        for (key, totals) in row.groups.iter().filter(|(_, t)| !t.is_empty()) {
            out.push(WeekExport::new(row, key, name_of(key), totals));
        }
    }
    out
}

/// Header for CSV / XLSX / PDF
pub(crate) fn get_headers() -> Vec<&'static str> {
    vec![
        "week",
        "span",
        "week_start",
        "group",
        "group_name",
        "total_minutes",
        "weekend_minutes",
        "regular_minutes",
        "overtime_tier1_minutes",
        "overtime_tier2_minutes",
        "hours",
    ]
}

pub(crate) fn week_to_row(w: &WeekExport) -> Vec<String> {
    vec![
        w.week.clone(),
        w.span.clone(),
        w.week_start.clone(),
        w.group.clone(),
        w.group_name.clone(),
        w.total_minutes.to_string(),
        w.weekend_minutes.to_string(),
        w.regular_minutes.to_string(),
        w.overtime_tier1_minutes.to_string(),
        w.overtime_tier2_minutes.to_string(),
        format!("{:.2}", w.hours),
    ]
}

pub(crate) fn weeks_to_table(weeks: &[WeekExport]) -> Vec<Vec<String>> {
    weeks.iter().map(week_to_row).collect()
}
