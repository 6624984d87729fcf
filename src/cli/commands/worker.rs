use crate::cli::commands::{open_db, print_json};
use crate::cli::parser::{Commands, WorkerCmd};
use crate::config::Config;
use crate::core::workers::WorkerLogic;
use crate::db::log::ttlog;
use crate::db::profiles::{insert_profile, list_profiles, set_status};
use crate::errors::AppResult;
use crate::models::profile::ProfileStatus;
use crate::ui::messages::{info, success, use_color};
use crate::utils::colors::colorize_status;
use crate::utils::table::{Column, Table};

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    let Commands::Worker { action } = cmd else {
        return Ok(());
    };
    let pool = open_db(cfg)?;
    let conn = &pool.conn;

    match action {
        WorkerCmd::Add {
            id,
            first,
            last,
            email,
        } => {
            let p = insert_profile(conn, id, first.as_deref(), last.as_deref(), email.as_deref())?;
            ttlog(conn, "worker_add", &p.user_id, &format!("Added {}", p.display_name()))?;
            success(format!(
                "Worker '{}' added ({}), status {}",
                p.user_id,
                p.display_name(),
                p.status
            ));
        }

        WorkerCmd::Status { id, status } => {
            let status: ProfileStatus = status.parse()?;
            let previous = set_status(conn, id, status)?;
            ttlog(conn, "worker_status", id, &format!("{previous} -> {status}"))?;
            success(format!("Worker '{id}': {previous} → {status}"));
        }

        WorkerCmd::List { status, json } => {
            let filter = status
                .as_deref()
                .map(str::parse::<ProfileStatus>)
                .transpose()?;
            let profiles = list_profiles(conn, filter)?;

            if *json {
                return print_json(&profiles);
            }
            if profiles.is_empty() {
                info("No workers found.");
                return Ok(());
            }

            let color = use_color();
            let mut t = Table::new(vec![
                Column::left("ID"),
                Column::left("Name"),
                Column::left("Email"),
                Column::left("Status"),
            ]);
            for p in &profiles {
                let status = if color {
                    colorize_status(p.status.as_str())
                } else {
                    p.status.to_string()
                };
                t.add_row(vec![
                    p.user_id.clone(),
                    p.display_name(),
                    p.email.clone().unwrap_or_default(),
                    status,
                ]);
            }
            print!("{}", t.render());
        }

        WorkerCmd::Join { id, site } => {
            let (w, created) = WorkerLogic::join(conn, id, *site)?;
            if created {
                success(format!("Worker '{id}' joined workplace #{} '{}'", w.id, w.name));
            } else {
                info(format!("Worker '{id}' already belongs to workplace #{} '{}'", w.id, w.name));
            }
        }

        WorkerCmd::Leave { id, site } => {
            let w = WorkerLogic::leave(conn, id, *site)?;
            success(format!("Worker '{id}' left workplace #{} '{}'", w.id, w.name));
        }

        WorkerCmd::Edit { id, fields } => {
            let p = WorkerLogic::edit(conn, id, fields)?;
            success(format!("Worker '{}' ({}) updated", p.user_id, p.display_name()));
        }

        WorkerCmd::Del { id, with_entries } => {
            let gone = WorkerLogic::delete(conn, id, *with_entries)?;
            success(format!(
                "Worker '{}' ({}) deleted: {} workplace links, {} time entries",
                gone.profile.user_id,
                gone.profile.display_name(),
                gone.links,
                gone.entries
            ));
        }
    }

    Ok(())
}
