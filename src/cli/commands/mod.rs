pub mod backup;
pub mod config;
pub mod doc;
pub mod entry;
pub mod export;
pub mod init;
pub mod log;
pub mod report;
pub mod site;
pub mod timesheet;
pub mod watch;
pub mod worker;

use crate::config::Config;
use crate::db::migrate::run_pending_migrations;
use crate::db::pool::DbPool;
use crate::errors::{AppError, AppResult};
use serde::Serialize;
use std::path::Path;

/// Open the configured database and bring its schema up to date.
pub(crate) fn open_db(cfg: &Config) -> AppResult<DbPool> {
    if !Path::new(&cfg.database).exists() {
        return Err(AppError::NotFound(format!(
            "database {} (run `sitehours init` first)",
            cfg.database
        )));
    }
    let pool = DbPool::new(&cfg.database)?;
    run_pending_migrations(&pool.conn)?;
    Ok(pool)
}

pub(crate) fn print_json<T: Serialize + ?Sized>(value: &T) -> AppResult<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
