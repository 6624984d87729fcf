use crate::cli::commands::open_db;
use crate::cli::parser::Commands;
use crate::config::Config;
use crate::core::report::ReportLogic;
use crate::db::log::ttlog;
use crate::errors::AppResult;
use crate::export::export_timesheet;
use crate::export::fs_utils::ensure_writable;
use crate::models::week::{IsoWeek, WeekBucket};
use crate::utils::formatting::hhmm;
use crate::utils::path::expand_tilde;
use std::env;

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Timesheet {
        site,
        worker,
        week,
        file,
        force,
    } = cmd
    {
        let pool = open_db(cfg)?;
        let logic = ReportLogic::new(&pool.conn, cfg.calendar()?);

        let iso: IsoWeek = week.parse()?;
        let bucket = WeekBucket::containing(iso.monday()?);
        let ts = logic.timesheet(*site, worker, bucket, &cfg.company_name)?;

        let path = match file {
            Some(f) => expand_tilde(f),
            None => env::current_dir()?.join(ts.file_name()),
        };
        ensure_writable(&path, *force)?;
        export_timesheet(&ts, &path)?;

        ttlog(
            &pool.conn,
            "timesheet",
            &path.to_string_lossy(),
            &format!(
                "{} {} at site #{}: {}",
                ts.header.worker_name,
                ts.bucket.label(),
                site,
                hhmm(ts.total_minutes())
            ),
        )?;
    }

    Ok(())
}
