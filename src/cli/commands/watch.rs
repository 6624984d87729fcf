use crate::cli::commands::open_db;
use crate::cli::parser::Commands;
use crate::config::Config;
use crate::core::aggregator::{WeekRow, WeekWindow};
use crate::core::changes::{CancelToken, StatusSnapshot, Subscription};
use crate::core::report::ReportLogic;
use crate::db::profiles::status_snapshot;
use crate::errors::AppResult;
use crate::models::change::ChangeEvent;
use crate::models::week::WeekBucket;
use crate::ui::messages::{info, warning};
use crate::utils::formatting::hhmm;
use std::time::Duration;

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    let Commands::Watch { interval, once } = cmd else {
        return Ok(());
    };
    let pool = open_db(cfg)?;
    let conn = &pool.conn;
    let logic = ReportLogic::new(conn, cfg.calendar()?);

    let source = || -> AppResult<StatusSnapshot> { status_snapshot(conn) };
    let mut sub = Subscription::new(source, Duration::from_secs(*interval), CancelToken::new())?;

    if *once {
        std::thread::sleep(Duration::from_secs(*interval));
        let events = sub.poll()?;
        if events.is_empty() {
            info("No status changes.");
        }
        for ev in &events {
            print_event(ev);
        }
        return print_current_week(&logic);
    }

    info(format!("Watching profile statuses every {interval}s (Ctrl-C to stop)"));
    for ev in sub {
        match ev {
            Ok(ev) => {
                print_event(&ev);
                print_current_week(&logic)?;
            }
            Err(e) => warning(format!("Status poll failed: {e}")),
        }
    }
    Ok(())
}

fn print_event(ev: &ChangeEvent) {
    match ev.previous {
        Some(prev) => info(format!("{}: {} → {}", ev.user_id, prev, ev.current)),
        None => info(format!("{}: new profile ({})", ev.user_id, ev.current)),
    }
}

/// One-line recap of the current week, recomputed from the store.
fn print_current_week(logic: &ReportLogic) -> AppResult<()> {
    let bucket = WeekBucket::containing(logic.calendar().today());
    let ov = logic.overview(WeekWindow::single(&bucket))?;

    let (total, workers, sites) = ov
        .by_worker
        .row_for(bucket.week_start)
        .zip(ov.by_site.row_for(bucket.week_start))
        .map(|(w, s)| {
            let active = |r: &WeekRow| {
                r.groups.values().filter(|t| !t.is_empty()).count()
            };
            (w.totals.total_minutes, active(w), active(s))
        })
        .unwrap_or_default();

    info(format!(
        "{}: {} across {} worker(s) on {} site(s)",
        bucket.label(),
        hhmm(total),
        workers,
        sites
    ));
    Ok(())
}
