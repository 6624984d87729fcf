use crate::cli::commands::{open_db, print_json};
use crate::cli::parser::{Commands, EntryCmd};
use crate::config::Config;
use crate::core::entries::{EntryLogic, EntryRequest};
use crate::core::report::query_bounds;
use crate::db::intervals::{IntervalQuery, load_raw, parse_all};
use crate::errors::AppResult;
use crate::export::range_window;
use crate::ui::messages::{info, success};
use crate::utils::date::Calendar;
use crate::utils::formatting::hhmm;
use crate::utils::table::{Column, Table};
use crate::utils::time::clock_text;
use serde::Serialize;

/// A stored shift as listed by `entry list`.
#[derive(Debug, Serialize)]
struct EntryLine {
    id: i64,
    worker: String,
    site: Option<String>,
    date: String,
    start: String,
    end: String,
    break_minutes: i64,
    worked_minutes: i64,
    notes: Option<String>,
}

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    let Commands::Entry { action } = cmd else {
        return Ok(());
    };
    let pool = open_db(cfg)?;
    let conn = &pool.conn;
    let calendar = cfg.calendar()?;

    match action {
        EntryCmd::Add {
            worker,
            site,
            date,
            start,
            end,
            break_minutes,
            notes,
            append,
        } => {
            let req = EntryRequest {
                worker: worker.clone(),
                site: *site,
                date: date.clone(),
                start: start.clone(),
                end: end.clone(),
                break_minutes: *break_minutes,
                notes: notes.clone(),
                append: *append,
            };
            let r = EntryLogic::register(conn, &calendar, &req)?;

            let mut msg = format!(
                "Entry #{} saved: {} {} {}-{} ({})",
                r.id,
                worker,
                date.trim(),
                start.trim(),
                end.trim(),
                hhmm(r.interval.worked_minutes())
            );
            if r.replaced > 0 {
                msg.push_str(&format!(", replaced {} earlier on that day", r.replaced));
            }
            success(msg);
        }

        EntryCmd::List {
            worker,
            site,
            range,
            json,
        } => {
            let lines = list_entries(
                conn,
                &calendar,
                worker.as_deref(),
                *site,
                range.as_deref(),
            )?;

            if *json {
                return print_json(&lines);
            }
            if lines.is_empty() {
                info("No time entries found.");
                return Ok(());
            }

            let mut t = Table::new(vec![
                Column::right("ID"),
                Column::left("Date"),
                Column::left("Worker"),
                Column::right("Site"),
                Column::left("Start"),
                Column::left("End"),
                Column::right("Break"),
                Column::right("Worked"),
                Column::left("Notes"),
            ]);
            let mut total = 0;
            for l in &lines {
                total += l.worked_minutes;
                t.add_row(vec![
                    l.id.to_string(),
                    l.date.clone(),
                    l.worker.clone(),
                    l.site.clone().unwrap_or_default(),
                    l.start.clone(),
                    l.end.clone(),
                    l.break_minutes.to_string(),
                    hhmm(l.worked_minutes),
                    l.notes.clone().unwrap_or_default(),
                ]);
            }
            print!("{}", t.render());
            println!("\nTotal worked: {}", hhmm(total));
        }

        EntryCmd::Del { id } => {
            let gone = EntryLogic::delete(conn, *id)?;
            success(format!("Entry #{id} of {} deleted", gone.subject_id));
        }
    }

    Ok(())
}

fn list_entries(
    conn: &rusqlite::Connection,
    calendar: &Calendar,
    worker: Option<&str>,
    site: Option<i64>,
    range: Option<&str>,
) -> AppResult<Vec<EntryLine>> {
    let mut query = IntervalQuery {
        subjects: worker.map(|w| vec![w.to_string()]),
        site: site.map(|s| s.to_string()),
        ..Default::default()
    };

    let window = range_window(range)?;
    if let Some(w) = window {
        let (from, before) = query_bounds(w.start, w.end_exclusive);
        query = query.between(from, before);
    }

    let raw = load_raw(conn, &query)?;
    Ok(parse_all(&raw)
        .into_iter()
        .filter(|(_, iv)| window.is_none_or(|w| w.contains(calendar.date_of(&iv.started_at))))
        .map(|(r, iv)| EntryLine {
            id: r.id,
            worker: iv.subject_id.clone(),
            site: iv.site_id.clone(),
            date: calendar.date_of(&iv.started_at).to_string(),
            start: clock_text(calendar, &iv.started_at),
            end: clock_text(calendar, &iv.ended_at),
            break_minutes: iv.break_minutes,
            worked_minutes: iv.worked_minutes(),
            notes: r.notes.clone(),
        })
        .collect())
}
