//! Report assembly: fetch rows from the store, run the aggregator.
//!
//! Every surface (dashboard, site report, overview, calendar, timesheet)
//! goes through `ReportLogic` so that they all share one calendar.

use crate::core::aggregator::{GroupBy, WeekWindow, WeeklyHoursAggregator, WeeklyReport};
use crate::core::daily::{daily_totals, day_breakdown};
use crate::core::timesheet::{Timesheet, TimesheetEntry, TimesheetHeader, build_timesheet};
use crate::db::intervals::{IntervalQuery, load_intervals, load_raw, parse_all};
use crate::db::profiles::{display_names, get_profile};
use crate::db::workplaces::{list_workplaces, require_workplace};
use crate::errors::{AppError, AppResult};
use crate::models::interval::TimeInterval;
use crate::models::profile::display_name;
use crate::models::week::WeekBucket;
use crate::utils::date::{Calendar, add_days, all_days_of_month, first_of_month};
use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, Utc};
use rusqlite::Connection;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

/// Per-worker and per-site tables over the same rows.
#[derive(Debug, Clone, Serialize)]
pub struct Overview {
    pub by_worker: WeeklyReport,
    pub by_site: WeeklyReport,
}

#[derive(Debug, Clone, Serialize)]
pub struct MonthCalendar {
    pub month: NaiveDate,
    pub days: BTreeMap<NaiveDate, i64>,
}

impl MonthCalendar {
    pub fn total_minutes(&self) -> i64 {
        self.days.values().sum()
    }

    pub fn minutes_on(&self, day: NaiveDate) -> i64 {
        self.days.get(&day).copied().unwrap_or(0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkerMinutes {
    pub user_id: String,
    pub name: String,
    pub minutes: i64,
}

/// Whose shifts a weekly report covers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scope {
    All,
    Worker(String),
    Site(i64),
}

impl Scope {
    pub fn from_args(worker: Option<String>, site: Option<i64>) -> AppResult<Self> {
        match (worker, site) {
            (Some(_), Some(_)) => Err(AppError::Validation(
                "use either --worker or --site, not both".into(),
            )),
            (Some(w), None) => Ok(Scope::Worker(w)),
            (None, Some(s)) => Ok(Scope::Site(s)),
            (None, None) => Ok(Scope::All),
        }
    }

    /// Site reports start at `epoch`; everything else shows the last
    /// `weeks` weeks up to the current one.
    pub fn default_window(&self, today: NaiveDate, weeks: u32, epoch: NaiveDate) -> WeekWindow {
        match self {
            Scope::Site(_) => WeekWindow::since(epoch, today),
            _ => WeekWindow::trailing_weeks(today, weeks.max(1)),
        }
    }
}

/// Instant bounds one day wider than the window on each side, so that no
/// calendar offset can push a shift across the query edge. The aggregator
/// applies the exact window afterwards.
pub fn query_bounds(start: NaiveDate, end_exclusive: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
    let at_midnight = |d: NaiveDate| d.and_time(NaiveTime::MIN).and_utc();
    (
        at_midnight(add_days(start, -1)),
        at_midnight(add_days(end_exclusive, 1)),
    )
}

pub struct ReportLogic<'a> {
    conn: &'a Connection,
    aggregator: WeeklyHoursAggregator,
}

impl<'a> ReportLogic<'a> {
    pub fn new(conn: &'a Connection, calendar: Calendar) -> Self {
        Self {
            conn,
            aggregator: WeeklyHoursAggregator::new(calendar),
        }
    }

    pub fn calendar(&self) -> &Calendar {
        self.aggregator.calendar()
    }

    fn fetch(&self, query: IntervalQuery, window: WeekWindow) -> AppResult<Vec<TimeInterval>> {
        if window.is_empty() {
            return Ok(Vec::new());
        }
        let (from, before) = query_bounds(window.start, window.end_exclusive);
        load_intervals(self.conn, &query.between(from, before))
    }

    pub fn weeks(&self, scope: &Scope, window: WeekWindow, group_by: GroupBy) -> AppResult<WeeklyReport> {
        match scope {
            Scope::All => self.all_weeks(window, group_by),
            Scope::Worker(id) => self.worker_weeks(id, window, group_by),
            Scope::Site(id) => self.site_weeks(*id, window, group_by),
        }
    }

    /// Display names for the group keys of `group_by`.
    pub fn group_names(&self, group_by: GroupBy) -> AppResult<HashMap<String, String>> {
        match group_by {
            GroupBy::None => Ok(HashMap::new()),
            GroupBy::Worker => display_names(self.conn),
            GroupBy::Site => Ok(list_workplaces(self.conn, true)?
                .into_iter()
                .map(|w| (w.site_key(), w.name))
                .collect()),
        }
    }

    /// A single worker's weeks (dashboard).
    pub fn worker_weeks(
        &self,
        worker_id: &str,
        window: WeekWindow,
        group_by: GroupBy,
    ) -> AppResult<WeeklyReport> {
        if get_profile(self.conn, worker_id)?.is_none() {
            return Err(AppError::NotFound(format!("worker '{worker_id}'")));
        }
        let rows = self.fetch(IntervalQuery::for_subject(worker_id), window)?;
        Ok(self.aggregator.aggregate(&rows, window, group_by))
    }

    /// One site's weeks, approved workers only.
    pub fn site_weeks(
        &self,
        site_id: i64,
        window: WeekWindow,
        group_by: GroupBy,
    ) -> AppResult<WeeklyReport> {
        require_workplace(self.conn, site_id)?;
        let rows = self.fetch(site_query(site_id), window)?;
        Ok(self.aggregator.aggregate(&rows, window, group_by))
    }

    /// Every logged shift.
    pub fn all_weeks(&self, window: WeekWindow, group_by: GroupBy) -> AppResult<WeeklyReport> {
        let rows = self.fetch(IntervalQuery::default(), window)?;
        Ok(self.aggregator.aggregate(&rows, window, group_by))
    }

    /// Two independent aggregator passes over the same rows.
    pub fn overview(&self, window: WeekWindow) -> AppResult<Overview> {
        let rows = self.fetch(IntervalQuery::default(), window)?;
        Ok(Overview {
            by_worker: self.aggregator.aggregate(&rows, window, GroupBy::Worker),
            by_site: self.aggregator.aggregate(&rows, window, GroupBy::Site),
        })
    }

    /// Worked minutes per day of the month containing `month`.
    pub fn month_calendar(&self, site_id: i64, month: NaiveDate) -> AppResult<MonthCalendar> {
        require_workplace(self.conn, site_id)?;

        let first = first_of_month(month);
        let days = all_days_of_month(first.year(), first.month());
        let last = days.last().copied().unwrap_or(first);

        let window = WeekWindow::new(first, add_days(last, 1));
        let rows = self.fetch(site_query(site_id), window)?;

        Ok(MonthCalendar {
            month: first,
            days: daily_totals(self.calendar(), &rows, first, last),
        })
    }

    /// Per-worker minutes on one day at a site, largest first.
    pub fn day_detail(&self, site_id: i64, day: NaiveDate) -> AppResult<Vec<WorkerMinutes>> {
        require_workplace(self.conn, site_id)?;

        let window = WeekWindow::new(day, add_days(day, 1));
        let rows = self.fetch(site_query(site_id), window)?;
        let names = display_names(self.conn)?;

        Ok(day_breakdown(self.calendar(), &rows, day)
            .into_iter()
            .map(|(user_id, minutes)| WorkerMinutes {
                name: name_of(&names, &user_id),
                user_id,
                minutes,
            })
            .collect())
    }

    /// Workers with hours at the site in one ISO week, by display name.
    pub fn week_workers(&self, site_id: i64, bucket: &WeekBucket) -> AppResult<Vec<WorkerMinutes>> {
        let report = self.site_weeks(site_id, WeekWindow::single(bucket), GroupBy::Worker)?;
        let names = display_names(self.conn)?;

        let mut out: Vec<WorkerMinutes> = report
            .row_for(bucket.week_start)
            .map(|row| {
                row.groups
                    .iter()
                    .filter(|(_, t)| t.total_minutes > 0)
                    .map(|(id, t)| WorkerMinutes {
                        user_id: id.clone(),
                        name: name_of(&names, id),
                        minutes: t.total_minutes,
                    })
                    .collect()
            })
            .unwrap_or_default();

        out.sort_by(|a, b| {
            a.name
                .to_lowercase()
                .cmp(&b.name.to_lowercase())
                .then_with(|| a.user_id.cmp(&b.user_id))
        });
        Ok(out)
    }

    /// The weekly timesheet of one worker at one site.
    pub fn timesheet(
        &self,
        site_id: i64,
        worker_id: &str,
        bucket: WeekBucket,
        company: &str,
    ) -> AppResult<Timesheet> {
        let site = require_workplace(self.conn, site_id)?;
        let worker = get_profile(self.conn, worker_id)?
            .ok_or_else(|| AppError::NotFound(format!("worker '{worker_id}'")))?;

        let (from, before) = query_bounds(bucket.week_start, bucket.week_end_exclusive());
        let query = IntervalQuery {
            subjects: Some(vec![worker_id.to_string()]),
            site: Some(site_id.to_string()),
            ..Default::default()
        }
        .between(from, before);

        let raw = load_raw(self.conn, &query)?;
        let entries: Vec<TimesheetEntry> = parse_all(&raw)
            .into_iter()
            .map(|(r, interval)| TimesheetEntry {
                interval,
                notes: r.notes.clone(),
            })
            .collect();

        let header = TimesheetHeader {
            worker_id: worker.user_id.clone(),
            worker_name: worker.display_name(),
            company: site
                .company_name
                .clone()
                .unwrap_or_else(|| company.to_string()),
            site_name: site.name.clone(),
            site_line: site.site_line(),
        };

        Ok(build_timesheet(self.calendar(), header, bucket, &entries))
    }
}

fn site_query(site_id: i64) -> IntervalQuery {
    IntervalQuery::for_site(&site_id.to_string()).approved()
}

pub fn name_of(names: &HashMap<String, String>, id: &str) -> String {
    names
        .get(id)
        .cloned()
        .unwrap_or_else(|| display_name(id, None, None))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::intervals::insert_entry;
    use crate::db::migrate::run_pending_migrations;
    use crate::db::profiles::{insert_profile, set_status};
    use crate::db::workplaces::insert_workplace;
    use crate::models::interval::NewTimeEntry;
    use crate::models::profile::ProfileStatus;
    use crate::models::workplace::WorkplaceDraft;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn setup() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        run_pending_migrations(&conn).unwrap();

        insert_profile(&conn, "w1", Some("Ole"), Some("Berg"), None).unwrap();
        insert_profile(&conn, "w2", Some("Anna"), Some("Holm"), None).unwrap();
        insert_profile(&conn, "w3", Some("Pending"), Some("Person"), None).unwrap();
        set_status(&conn, "w1", ProfileStatus::Approved).unwrap();
        set_status(&conn, "w2", ProfileStatus::Approved).unwrap();

        insert_workplace(
            &conn,
            &WorkplaceDraft {
                name: Some("Harbour".into()),
                company_name: Some("Byg ApS".into()),
                site_number: Some("S-1".into()),
                ..Default::default()
            },
        )
        .unwrap();
        conn
    }

    fn shift(conn: &Connection, user: &str, start: &str, end: &str, brk: i64) {
        insert_entry(
            conn,
            &NewTimeEntry {
                user_id: user.into(),
                workplace_id: Some(1),
                started_at: DateTime::parse_from_rfc3339(start).unwrap(),
                ended_at: DateTime::parse_from_rfc3339(end).unwrap(),
                break_minutes: brk,
                notes: None,
            },
        )
        .unwrap();
    }

    #[test]
    fn scope_windows_and_conflicts() {
        let today = d(2025, 10, 16);
        let epoch = d(2025, 9, 1);

        let site = Scope::from_args(None, Some(1)).unwrap();
        assert_eq!(site.default_window(today, 8, epoch), WeekWindow::new(epoch, d(2025, 10, 20)));

        let worker = Scope::from_args(Some("w1".into()), None).unwrap();
        assert_eq!(
            worker.default_window(today, 2, epoch),
            WeekWindow::new(d(2025, 10, 6), d(2025, 10, 20))
        );

        assert_eq!(Scope::from_args(None, None).unwrap(), Scope::All);
        assert!(matches!(
            Scope::from_args(Some("w1".into()), Some(1)),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn group_names_resolve_sites_and_workers() {
        let conn = setup();
        let logic = ReportLogic::new(&conn, Calendar::utc());

        let sites = logic.group_names(GroupBy::Site).unwrap();
        assert_eq!(sites.get("1").map(String::as_str), Some("Harbour"));

        let workers = logic.group_names(GroupBy::Worker).unwrap();
        assert_eq!(name_of(&workers, "w2"), "Anna Holm");
        assert_eq!(name_of(&workers, "ghost"), "ghost");
    }

    #[test]
    fn bounds_are_one_day_wider() {
        let (from, before) = query_bounds(d(2025, 10, 13), d(2025, 10, 20));
        assert_eq!(from.to_rfc3339(), "2025-10-12T00:00:00+00:00");
        assert_eq!(before.to_rfc3339(), "2025-10-21T00:00:00+00:00");
    }

    #[test]
    fn site_report_skips_unapproved_workers() {
        let conn = setup();
        shift(&conn, "w1", "2025-10-13T07:00:00Z", "2025-10-13T15:00:00Z", 0);
        shift(&conn, "w3", "2025-10-13T07:00:00Z", "2025-10-13T15:00:00Z", 0);

        let logic = ReportLogic::new(&conn, Calendar::utc());
        let window = WeekWindow::new(d(2025, 10, 13), d(2025, 10, 20));

        let site = logic.site_weeks(1, window, GroupBy::None).unwrap();
        assert_eq!(site.rows[0].totals.total_minutes, 480);

        let all = logic.all_weeks(window, GroupBy::None).unwrap();
        assert_eq!(all.rows[0].totals.total_minutes, 960);
    }

    #[test]
    fn zone_decides_which_week_a_late_shift_lands_in() {
        let conn = setup();
        // Sunday 23:30 UTC is already Monday in Copenhagen.
        shift(&conn, "w1", "2025-10-19T23:30:00Z", "2025-10-20T03:30:00Z", 0);

        let window = WeekWindow::new(d(2025, 10, 13), d(2025, 10, 27));

        let utc = ReportLogic::new(&conn, Calendar::utc())
            .worker_weeks("w1", window, GroupBy::None)
            .unwrap();
        assert_eq!(utc.rows[0].totals.weekend_minutes, 240);
        assert_eq!(utc.rows[1].totals.total_minutes, 0);

        let cph = ReportLogic::new(&conn, Calendar::parse("Europe/Copenhagen").unwrap())
            .worker_weeks("w1", window, GroupBy::None)
            .unwrap();
        assert_eq!(cph.rows[0].totals.total_minutes, 0);
        assert_eq!(cph.rows[1].totals.total_minutes, 240);
        assert_eq!(cph.rows[1].totals.weekend_minutes, 0);
    }

    #[test]
    fn overview_passes_agree_on_grand_totals() {
        let conn = setup();
        shift(&conn, "w1", "2025-10-13T07:00:00Z", "2025-10-13T15:00:00Z", 30);
        shift(&conn, "w2", "2025-10-14T07:00:00Z", "2025-10-14T12:00:00Z", 0);

        let logic = ReportLogic::new(&conn, Calendar::utc());
        let ov = logic
            .overview(WeekWindow::new(d(2025, 10, 13), d(2025, 10, 20)))
            .unwrap();

        assert_eq!(ov.by_worker.rows[0].totals, ov.by_site.rows[0].totals);
        assert_eq!(ov.by_worker.rows[0].group("w1").total_minutes, 450);
        assert_eq!(ov.by_site.rows[0].group("1").total_minutes, 750);
    }

    #[test]
    fn week_workers_sorted_by_name() {
        let conn = setup();
        shift(&conn, "w1", "2025-10-13T07:00:00Z", "2025-10-13T15:00:00Z", 0);
        shift(&conn, "w2", "2025-10-15T07:00:00Z", "2025-10-15T09:00:00Z", 0);

        let logic = ReportLogic::new(&conn, Calendar::utc());
        let list = logic
            .week_workers(1, &WeekBucket::containing(d(2025, 10, 16)))
            .unwrap();

        let names: Vec<&str> = list.iter().map(|w| w.name.as_str()).collect();
        assert_eq!(names, vec!["Anna Holm", "Ole Berg"]);
        assert_eq!(list[1].minutes, 480);
    }

    #[test]
    fn calendar_and_day_detail() {
        let conn = setup();
        shift(&conn, "w1", "2025-10-01T07:00:00Z", "2025-10-01T15:00:00Z", 0);
        shift(&conn, "w2", "2025-10-01T07:00:00Z", "2025-10-01T17:00:00Z", 0);
        shift(&conn, "w1", "2025-11-01T07:00:00Z", "2025-11-01T08:00:00Z", 0);

        let logic = ReportLogic::new(&conn, Calendar::utc());
        let cal = logic.month_calendar(1, d(2025, 10, 17)).unwrap();
        assert_eq!(cal.month, d(2025, 10, 1));
        assert_eq!(cal.total_minutes(), 1080);
        assert_eq!(cal.minutes_on(d(2025, 10, 2)), 0);

        let day = logic.day_detail(1, d(2025, 10, 1)).unwrap();
        assert_eq!(day[0].name, "Anna Holm");
        assert_eq!(day[0].minutes, 600);
        assert_eq!(day[1].user_id, "w1");
    }

    #[test]
    fn timesheet_total_matches_weekly_total() {
        let conn = setup();
        for day in 13..=17 {
            shift(
                &conn,
                "w2",
                &format!("2025-10-{day}T07:00:00Z"),
                &format!("2025-10-{day}T16:00:00Z"),
                30,
            );
        }

        let logic = ReportLogic::new(&conn, Calendar::utc());
        let bucket = WeekBucket::containing(d(2025, 10, 13));
        let ts = logic.timesheet(1, "w2", bucket, "Fallback A/S").unwrap();
        let weekly = logic
            .worker_weeks("w2", WeekWindow::single(&bucket), GroupBy::None)
            .unwrap();

        assert_eq!(ts.total_minutes(), 2550);
        assert_eq!(ts.total_minutes(), weekly.rows[0].totals.total_minutes);
        assert_eq!(ts.header.company, "Byg ApS");
        assert_eq!(ts.header.site_line, "S-1");
        assert_eq!(ts.file_name(), "Anna Holm - 2025W42.pdf");
    }

    #[test]
    fn unknown_site_or_worker_is_not_found() {
        let conn = setup();
        let logic = ReportLogic::new(&conn, Calendar::utc());
        let window = WeekWindow::new(d(2025, 10, 13), d(2025, 10, 20));

        assert!(matches!(
            logic.site_weeks(99, window, GroupBy::None),
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            logic.worker_weeks("ghost", window, GroupBy::None),
            Err(AppError::NotFound(_))
        ));
    }
}
