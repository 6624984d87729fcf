use crate::cli::commands::{open_db, print_json};
use crate::cli::parser::{Commands, SiteCmd, SiteDetails, Switch};
use crate::config::Config;
use crate::db::log::ttlog;
use crate::db::memberships::worker_workplaces;
use crate::db::profiles::get_profile;
use crate::db::workplaces::{insert_workplace, list_workplaces, set_active, update_workplace};
use crate::errors::{AppError, AppResult};
use crate::models::workplace::WorkplaceDraft;
use crate::ui::messages::{info, success};
use crate::utils::table::{Column, Table};

fn draft(name: Option<&String>, d: &SiteDetails) -> WorkplaceDraft {
    WorkplaceDraft {
        name: name.cloned(),
        company_name: d.company.clone(),
        address: d.address.clone(),
        site_number: d.site_number.clone(),
        project_number: d.project_number.clone(),
    }
}

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    let Commands::Site { action } = cmd else {
        return Ok(());
    };
    let pool = open_db(cfg)?;
    let conn = &pool.conn;

    match action {
        SiteCmd::Add { name, details } => {
            let w = insert_workplace(conn, &draft(Some(name), details))?;
            ttlog(conn, "site_add", &w.site_key(), &format!("Added workplace {}", w.name))?;
            success(format!("Workplace #{} '{}' added", w.id, w.name));
        }

        SiteCmd::List { all, worker, json } => {
            let sites = match worker {
                Some(id) => {
                    if get_profile(conn, id)?.is_none() {
                        return Err(AppError::NotFound(format!("worker '{id}'")));
                    }
                    worker_workplaces(conn, id, *all)?
                }
                None => list_workplaces(conn, *all)?,
            };
            if *json {
                return print_json(&sites);
            }
            if sites.is_empty() {
                info("No workplaces found.");
                return Ok(());
            }

            let mut t = Table::new(vec![
                Column::right("ID"),
                Column::left("Name"),
                Column::left("Company"),
                Column::left("Site no."),
                Column::left("Project no."),
                Column::left("Address"),
                Column::left("Active"),
            ]);
            for w in &sites {
                t.add_row(vec![
                    w.id.to_string(),
                    w.name.clone(),
                    w.company_name.clone().unwrap_or_default(),
                    w.site_number.clone().unwrap_or_default(),
                    w.project_number.clone().unwrap_or_default(),
                    w.address.clone().unwrap_or_default(),
                    if w.is_active { "yes" } else { "no" }.to_string(),
                ]);
            }
            print!("{}", t.render());
        }

        SiteCmd::Active { id, state } => {
            let on = *state == Switch::On;
            let w = set_active(conn, *id, on)?;
            let word = if on { "active" } else { "inactive" };
            ttlog(conn, "site_active", &w.site_key(), &format!("{} is now {word}", w.name))?;
            success(format!("Workplace #{} '{}' is now {word}", w.id, w.name));
        }

        SiteCmd::Edit { id, name, details } => {
            let w = update_workplace(conn, *id, &draft(name.as_ref(), details))?;
            ttlog(conn, "site_edit", &w.site_key(), &format!("Edited workplace {}", w.name))?;
            success(format!("Workplace #{} '{}' updated", w.id, w.name));
        }
    }

    Ok(())
}
