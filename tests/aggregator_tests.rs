use chrono::{DateTime, FixedOffset, NaiveDate};
use sitehours::core::aggregator::{GroupBy, WeekWindow, WeeklyHoursAggregator};
use sitehours::core::overtime::split_overtime;
use sitehours::models::interval::TimeInterval;
use sitehours::models::week::{IsoWeek, WeekBucket};
use sitehours::utils::date::Calendar;

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn ts(s: &str) -> DateTime<FixedOffset> {
    DateTime::parse_from_rfc3339(s).unwrap()
}

fn shift(worker: &str, site: &str, start: &str, end: &str, brk: i64) -> TimeInterval {
    TimeInterval::new(worker, Some(site.to_string()), ts(start), ts(end), brk)
}

fn aggregator() -> WeeklyHoursAggregator {
    WeeklyHoursAggregator::new(Calendar::utc())
}

/// Mon 13 Oct to Fri 17 Oct 2025, 07:00-16:00 with a 30 minute break.
fn working_week(worker: &str) -> Vec<TimeInterval> {
    (13..=17)
        .map(|day| {
            shift(
                worker,
                "1",
                &format!("2025-10-{day}T07:00:00Z"),
                &format!("2025-10-{day}T16:00:00Z"),
                30,
            )
        })
        .collect()
}

fn week_42() -> WeekWindow {
    WeekWindow::new(d(2025, 10, 13), d(2025, 10, 20))
}

#[test]
fn split_partitions_every_boundary() {
    for total in [0, 1, 2219, 2220, 2221, 3119, 3120, 3121, 10000] {
        assert_eq!(split_overtime(total).total(), total, "total {total}");
    }
}

#[test]
fn split_components_never_decrease() {
    let mut prev = split_overtime(0);
    for total in 1..=4000 {
        let s = split_overtime(total);
        assert!(s.regular_minutes >= prev.regular_minutes);
        assert!(s.tier1_minutes >= prev.tier1_minutes);
        assert!(s.tier2_minutes >= prev.tier2_minutes);
        prev = s;
    }
}

#[test]
fn reversed_or_empty_shifts_count_nothing() {
    let reversed = shift("w1", "1", "2025-10-13T16:00:00Z", "2025-10-13T07:00:00Z", 0);
    let zero = shift("w1", "1", "2025-10-13T07:00:00Z", "2025-10-13T07:00:00Z", 0);
    let neg_break = shift("w1", "1", "2025-10-13T16:00:00Z", "2025-10-13T07:00:00Z", -30);
    for iv in [&reversed, &zero, &neg_break] {
        assert_eq!(iv.worked_minutes(), 0);
    }

    let report = aggregator().aggregate(&[reversed, zero, neg_break], week_42(), GroupBy::None);
    assert_eq!(report.rows.len(), 1);
    assert_eq!(report.rows[0].totals.total_minutes, 0);
}

#[test]
fn break_longer_than_shift_clamps_to_zero() {
    let iv = shift("w1", "1", "2025-10-13T07:00:00Z", "2025-10-13T15:00:00Z", 600);
    assert_eq!(iv.worked_minutes(), 0);
}

#[test]
fn saturday_counts_as_weekend_monday_does_not() {
    let rows = [
        shift("w1", "1", "2025-10-18T08:00:00Z", "2025-10-18T10:00:00Z", 0),
        shift("w1", "1", "2025-10-13T08:00:00Z", "2025-10-13T09:00:00Z", 0),
    ];
    let t = aggregator().aggregate(&rows, week_42(), GroupBy::None).rows[0].totals;
    assert_eq!(t.total_minutes, 180);
    assert_eq!(t.weekend_minutes, 120);
    assert_eq!(t.weekday_minutes(), 60);
}

#[test]
fn eight_week_window_without_rows_gives_eight_zero_buckets() {
    let window = WeekWindow::trailing_weeks(d(2025, 10, 15), 8);
    let report = aggregator().aggregate(&[], window, GroupBy::None);

    assert_eq!(report.rows.len(), 8);
    let mondays: Vec<NaiveDate> = report.rows.iter().map(|r| r.bucket.week_start).collect();
    assert_eq!(mondays[0], d(2025, 8, 25));
    assert_eq!(mondays[7], d(2025, 10, 13));
    assert!(mondays.windows(2).all(|w| (w[1] - w[0]).num_days() == 7));
    assert!(report.rows.iter().all(|r| r.totals.is_empty()));
}

#[test]
fn iso_labels_follow_the_thursday_rule() {
    let label = |date| WeekBucket::containing(date).label();
    assert_eq!(label(d(2026, 1, 1)), "2026W01");
    assert_eq!(label(d(2025, 12, 31)), "2026W01");
    assert_eq!(label(d(2020, 12, 31)), "2020W53");
    assert_eq!(label(d(2021, 1, 3)), "2020W53");
    assert_eq!(label(d(2025, 10, 13)), "2025W42");
    assert_eq!(WeekBucket::containing(d(2025, 10, 15)).span_text(), "13 Oct – 19 Oct");

    let wk: IsoWeek = "2020W53".parse().unwrap();
    assert_eq!(wk.monday().unwrap(), d(2020, 12, 28));
    assert!("2025W53".parse::<IsoWeek>().is_err());
}

#[test]
fn full_week_overtime() {
    let t = aggregator()
        .aggregate(&working_week("w1"), week_42(), GroupBy::None)
        .rows[0]
        .totals;
    assert_eq!(t.total_minutes, 2550);
    assert_eq!(t.regular_minutes, 2220);
    assert_eq!(t.overtime_tier1_minutes, 330);
    assert_eq!(t.overtime_tier2_minutes, 0);
    assert_eq!(t.weekend_minutes, 0);
}

#[test]
fn full_week_plus_saturday() {
    let mut rows = working_week("w1");
    rows.push(shift("w1", "1", "2025-10-18T08:00:00Z", "2025-10-18T14:00:00Z", 0));

    let t = aggregator().aggregate(&rows, week_42(), GroupBy::None).rows[0].totals;
    assert_eq!(t.total_minutes, 2910);
    assert_eq!(t.weekend_minutes, 360);
    assert_eq!(t.overtime_tier1_minutes, 690);
    assert_eq!(t.overtime_tier2_minutes, 0);
}

#[test]
fn per_worker_totals_add_up_to_the_site() {
    let mut rows = working_week("w1");
    rows.push(shift("w2", "1", "2025-10-14T06:00:00Z", "2025-10-14T18:00:00Z", 45));
    rows.push(shift("w2", "1", "2025-10-19T09:00:00Z", "2025-10-19T12:00:00Z", 0));

    let agg = aggregator();
    let by_site = agg.aggregate(&rows, week_42(), GroupBy::Site);
    let by_worker = agg.aggregate(&rows, week_42(), GroupBy::Worker);

    let site_total = by_site.rows[0].group("1");
    let worker_sum: i64 = by_worker.rows[0]
        .groups
        .values()
        .map(|t| t.total_minutes)
        .sum();
    let weekend_sum: i64 = by_worker.rows[0]
        .groups
        .values()
        .map(|t| t.weekend_minutes)
        .sum();

    assert_eq!(worker_sum, site_total.total_minutes);
    assert_eq!(weekend_sum, site_total.weekend_minutes);
    assert_eq!(by_site.rows[0].totals, by_worker.rows[0].totals);
    assert_eq!(site_total.total_minutes, 2550 + 675 + 180);
}

#[test]
fn shifts_outside_the_window_are_excluded() {
    // window starts on a Wednesday; Monday's shift is in the bucket but not the window
    let window = WeekWindow::new(d(2025, 10, 15), d(2025, 10, 20));
    let rows = working_week("w1");
    let report = aggregator().aggregate(&rows, window, GroupBy::None);

    assert_eq!(report.rows.len(), 1);
    assert_eq!(report.rows[0].bucket.week_start, d(2025, 10, 13));
    assert_eq!(report.rows[0].totals.total_minutes, 3 * 510);
}

#[test]
fn reversed_window_is_empty() {
    let window = WeekWindow::new(d(2025, 10, 20), d(2025, 10, 13));
    assert!(aggregator().aggregate(&working_week("w1"), window, GroupBy::None).rows.is_empty());
}

#[test]
fn newest_first_reverses_the_rows() {
    let window = WeekWindow::new(d(2025, 10, 6), d(2025, 10, 27));
    let oldest = aggregator().aggregate(&working_week("w1"), window, GroupBy::None);
    let labels: Vec<String> = oldest.rows.iter().map(|r| r.label()).collect();
    let mut newest: Vec<String> = oldest.newest_first().rows.iter().map(|r| r.label()).collect();
    newest.reverse();
    assert_eq!(labels, newest);
    assert_eq!(labels, ["2025W41", "2025W42", "2025W43"]);
}

#[test]
fn local_calendar_moves_late_shifts_to_the_next_day() {
    let cph = Calendar::parse("Europe/Copenhagen").unwrap();
    // Sunday 23:30 UTC is Monday 01:30 in Copenhagen (CEST)
    let rows = [shift("w1", "1", "2025-10-12T23:30:00Z", "2025-10-13T03:30:00Z", 0)];

    let utc = aggregator().aggregate(&rows, week_42(), GroupBy::None);
    let local = WeeklyHoursAggregator::new(cph).aggregate(&rows, week_42(), GroupBy::None);

    assert_eq!(utc.rows[0].totals.total_minutes, 0);
    assert_eq!(local.rows[0].totals.total_minutes, 240);
    assert_eq!(local.rows[0].totals.weekend_minutes, 0);
}
