use crate::cli::commands::{open_db, print_json};
use crate::cli::parser::{Commands, ReportCmd};
use crate::config::Config;
use crate::core::aggregator::{GroupBy, WeekWindow, WeeklyReport};
use crate::core::report::{ReportLogic, Scope, WorkerMinutes, name_of};
use crate::errors::{AppError, AppResult};
use crate::models::week::{IsoWeek, WeekBucket, WeekTotals};
use crate::ui::messages::{header, info, use_color};
use crate::utils::colors::{RESET, color_for_overtime, colorize_optional};
use crate::utils::date::{add_days, first_of_month, parse_date, parse_month};
use crate::utils::formatting::{hhmm, hours_short};
use crate::utils::table::{Column, Table};
use std::collections::HashMap;

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    let Commands::Report { action } = cmd else {
        return Ok(());
    };
    let pool = open_db(cfg)?;
    let logic = ReportLogic::new(&pool.conn, cfg.calendar()?);
    let today = logic.calendar().today();

    match action {
        ReportCmd::Weekly {
            worker,
            site,
            by,
            weeks,
            from,
            to,
            order,
            json,
        } => {
            let scope = Scope::from_args(worker.clone(), *site)?;
            let window = match (from, to, weeks) {
                (Some(f), Some(t), _) => explicit_window(f, t)?,
                (_, _, Some(n)) => WeekWindow::trailing_weeks(today, (*n).max(1)),
                _ => scope.default_window(today, cfg.default_weeks, cfg.report_epoch),
            };

            let report = logic.weeks(&scope, window, *by)?.ordered(*order);
            if *json {
                return print_json(&report);
            }

            let names = logic.group_names(*by)?;
            header(format!("Weekly hours: {}", scope_title(&scope, &names)));
            print!("{}", render_weekly(&report, &names, use_color()));
        }

        ReportCmd::Overview { weeks, json } => {
            let window =
                WeekWindow::trailing_weeks(today, weeks.unwrap_or(cfg.default_weeks).max(1));
            let ov = logic.overview(window)?;
            if *json {
                return print_json(&ov);
            }

            let workers = logic.group_names(GroupBy::Worker)?;
            let sites = logic.group_names(GroupBy::Site)?;

            header("Hours per worker");
            print!("{}", render_matrix(&ov.by_worker, &workers));
            println!();
            header("Hours per site");
            print!("{}", render_matrix(&ov.by_site, &sites));
        }

        ReportCmd::Calendar { site, month, json } => {
            let month = match month {
                Some(m) => parse_month(m)?,
                None => first_of_month(today),
            };
            if month < first_of_month(cfg.report_epoch) {
                return Err(AppError::Validation(format!(
                    "{} is before the first reported month {}",
                    month.format("%Y-%m"),
                    cfg.report_epoch.format("%Y-%m")
                )));
            }

            let cal = logic.month_calendar(*site, month)?;
            if *json {
                return print_json(&cal);
            }

            header(format!("Site #{} – {}", site, cal.month.format("%B %Y")));
            let mut t = Table::new(vec![
                Column::left("Date"),
                Column::left("Day"),
                Column::right("Worked"),
            ]);
            let color = use_color();
            for (day, minutes) in &cal.days {
                let cell = hhmm(*minutes);
                t.add_row(vec![
                    day.to_string(),
                    day.format("%a").to_string(),
                    if color { colorize_optional(&cell) } else { cell },
                ]);
            }
            print!("{}", t.render());
            println!("\nMonth total: {}", hhmm(cal.total_minutes()));
        }

        ReportCmd::Day { site, date, json } => {
            let day = parse_date(date).ok_or_else(|| AppError::InvalidDate(date.clone()))?;
            let rows = logic.day_detail(*site, day)?;
            if *json {
                return print_json(&rows);
            }
            header(format!("Site #{site} – {day}"));
            print_workers(&rows);
        }

        ReportCmd::WeekWorkers { site, week, json } => {
            let iso: IsoWeek = week.parse()?;
            let bucket = WeekBucket::containing(iso.monday()?);
            let rows = logic.week_workers(*site, &bucket)?;
            if *json {
                return print_json(&rows);
            }
            header(format!("Site #{site} – {} ({})", bucket.label(), bucket.span_text()));
            print_workers(&rows);
        }
    }

    Ok(())
}

/// `--from`/`--to` as an inclusive day range.
fn explicit_window(from: &str, to: &str) -> AppResult<WeekWindow> {
    let first = parse_date(from).ok_or_else(|| AppError::InvalidDate(from.to_string()))?;
    let last = parse_date(to).ok_or_else(|| AppError::InvalidDate(to.to_string()))?;
    if last < first {
        return Err(AppError::InvalidDate(format!("{to} is before {from}")));
    }
    Ok(WeekWindow::new(first, add_days(last, 1)))
}

fn scope_title(scope: &Scope, names: &HashMap<String, String>) -> String {
    match scope {
        Scope::All => "all sites".to_string(),
        Scope::Worker(id) if names.contains_key(id) => name_of(names, id),
        Scope::Worker(id) => format!("worker {id}"),
        Scope::Site(id) => format!("site #{id} (approved workers)"),
    }
}

fn totals_cells(t: &WeekTotals, color: bool) -> Vec<String> {
    let mut cells = vec![
        hhmm(t.total_minutes),
        hhmm(t.weekend_minutes),
        hhmm(t.regular_minutes),
        hhmm(t.overtime_tier1_minutes),
        hhmm(t.overtime_tier2_minutes),
    ];
    if color {
        let ot = color_for_overtime(t.overtime_tier1_minutes, t.overtime_tier2_minutes);
        for c in cells.iter_mut().skip(1) {
            *c = colorize_optional(c);
        }
        if ot != RESET {
            cells[0] = format!("{ot}{}{RESET}", cells[0]);
        } else {
            cells[0] = colorize_optional(&cells[0]);
        }
    }
    cells
}

/// Week table; grouped reports list each group under the week total.
fn render_weekly(report: &WeeklyReport, names: &HashMap<String, String>, color: bool) -> String {
    let grouped = report.group_by != GroupBy::None;

    let mut columns = vec![Column::left("Week"), Column::left("Span")];
    if grouped {
        columns.push(Column::left(match report.group_by {
            GroupBy::Site => "Site",
            _ => "Worker",
        }));
    }
    columns.extend([
        Column::right("Total"),
        Column::right("Weekend"),
        Column::right("Regular"),
        Column::right("OT 1"),
        Column::right("OT 2"),
    ]);

    let mut t = Table::new(columns);
    for row in &report.rows {
        let mut line = vec![row.label(), row.span_text()];
        if grouped {
            line.push("all".to_string());
        }
        line.extend(totals_cells(&row.totals, color));
        t.add_row(line);

        if grouped {
            for (key, totals) in row.groups.iter().filter(|(_, t)| !t.is_empty()) {
                let mut line = vec![String::new(), String::new(), name_of(names, key)];
                line.extend(totals_cells(totals, color));
                t.add_row(line);
            }
        }
    }
    t.render()
}

/// Groups down, weeks across (oldest first), one decimal.
fn render_matrix(report: &WeeklyReport, names: &HashMap<String, String>) -> String {
    let keys = report.group_keys();
    if keys.is_empty() {
        return "No hours in this period.\n".to_string();
    }

    let mut columns = vec![Column::left("Name")];
    columns.extend(report.rows.iter().map(|r| Column::right(&r.label())));
    columns.push(Column::right("Total"));

    let mut named: Vec<(String, &String)> = keys.iter().map(|k| (name_of(names, k), k)).collect();
    named.sort_by_key(|(n, k)| (n.to_lowercase(), (*k).clone()));

    let mut t = Table::new(columns);
    for (name, key) in named {
        let mut line = vec![name];
        let mut total = 0;
        for row in &report.rows {
            let m = row.group(key).total_minutes;
            total += m;
            line.push(hours_short(m));
        }
        line.push(hours_short(total));
        t.add_row(line);
    }

    let mut line = vec!["Total".to_string()];
    line.extend(report.rows.iter().map(|r| hours_short(r.totals.total_minutes)));
    line.push(hours_short(report.rows.iter().map(|r| r.totals.total_minutes).sum()));
    t.add_row(line);

    t.render()
}

fn print_workers(rows: &[WorkerMinutes]) {
    if rows.is_empty() {
        info("No hours recorded.");
        return;
    }
    let mut t = Table::new(vec![
        Column::left("Worker"),
        Column::left("ID"),
        Column::right("Worked"),
    ]);
    for w in rows {
        t.add_row(vec![w.name.clone(), w.user_id.clone(), hhmm(w.minutes)]);
    }
    print!("{}", t.render());
    println!(
        "\nTotal: {}",
        hhmm(rows.iter().map(|w| w.minutes).sum())
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::aggregator::WeeklyHoursAggregator;
    use crate::models::interval::TimeInterval;
    use crate::utils::date::Calendar;
    use chrono::{DateTime, NaiveDate};

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn report(group_by: GroupBy) -> WeeklyReport {
        let rows = [TimeInterval::new(
            "w1",
            Some("1".into()),
            DateTime::parse_from_rfc3339("2025-10-18T07:00:00Z").unwrap(),
            DateTime::parse_from_rfc3339("2025-10-18T11:00:00Z").unwrap(),
            0,
        )];
        WeeklyHoursAggregator::new(Calendar::utc()).aggregate(
            &rows,
            WeekWindow::new(d(2025, 10, 13), d(2025, 10, 27)),
            group_by,
        )
    }

    #[test]
    fn weekly_table_plain() {
        let out = render_weekly(&report(GroupBy::None), &HashMap::new(), false);
        let lines: Vec<&str> = out.lines().collect();
        assert!(lines[0].starts_with("Week"));
        assert!(lines[2].starts_with("2025W42"));
        assert!(lines[2].contains("4h 0m"));
        assert_eq!(lines.len(), 4);
    }

    #[test]
    fn weekly_table_grouped_shows_names() {
        let names = HashMap::from([("w1".to_string(), "Anna Holm".to_string())]);
        let out = render_weekly(&report(GroupBy::Worker), &names, false);
        assert!(out.contains("Anna Holm"));
        assert!(out.lines().nth(2).is_some_and(|l| l.contains(" all ")));
    }

    #[test]
    fn matrix_has_total_row() {
        let out = render_matrix(&report(GroupBy::Site), &HashMap::new());
        let last = out.lines().last().unwrap();
        assert!(last.starts_with("Total"));
        assert!(last.ends_with("4.0 h"));
    }

    #[test]
    fn explicit_window_is_inclusive() {
        let w = explicit_window("2025-10-13", "2025-10-19").unwrap();
        assert_eq!(w, WeekWindow::new(d(2025, 10, 13), d(2025, 10, 20)));
        assert!(explicit_window("2025-10-19", "2025-10-13").is_err());
    }
}
