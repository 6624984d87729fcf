use crate::cli::commands::open_db;
use crate::cli::parser::Commands;
use crate::config::Config;
use crate::core::report::Scope;
use crate::db::log::ttlog;
use crate::errors::AppResult;
use crate::export::{ExportLogic, ExportRequest};

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Export {
        format,
        file,
        worker,
        site,
        by,
        range,
        force,
    } = cmd
    {
        let pool = open_db(cfg)?;
        let req = ExportRequest {
            format: *format,
            file: file.clone(),
            scope: Scope::from_args(worker.clone(), *site)?,
            group_by: *by,
            range: range.clone(),
            force: *force,
        };

        if let Some(path) = ExportLogic::export(&pool.conn, cfg, &req)? {
            ttlog(
                &pool.conn,
                "export",
                &path.to_string_lossy(),
                &format!(
                    "{} export, range {}",
                    format.as_str(),
                    range.as_deref().unwrap_or("default")
                ),
            )?;
        }
    }
    Ok(())
}
