// src/core/workers.rs
//! Worker administration beyond status review: workplace membership,
//! profile edits and deletion. Every change leaves a `log` row.

use crate::db::log::ttlog;
use crate::db::memberships::{join, leave};
use crate::db::profiles::{count_entries, delete_profile, get_profile, update_profile_fields};
use crate::db::workplaces::require_workplace;
use crate::errors::{AppError, AppResult};
use crate::models::profile::{Profile, ProfileStatus, parse_field_update};
use crate::models::workplace::Workplace;
use rusqlite::Connection;

/// What `WorkerLogic::delete` removed.
#[derive(Debug, Clone)]
pub struct Deleted {
    pub profile: Profile,
    pub links: usize,
    pub entries: usize,
}

pub struct WorkerLogic;

impl WorkerLogic {
    fn require_profile(conn: &Connection, user_id: &str) -> AppResult<Profile> {
        get_profile(conn, user_id)?.ok_or_else(|| AppError::NotFound(format!("worker '{user_id}'")))
    }

    /// Link an approved worker to an active workplace.
    /// Returns the workplace and whether a new link was created.
    pub fn join(conn: &Connection, user_id: &str, site: i64) -> AppResult<(Workplace, bool)> {
        let profile = Self::require_profile(conn, user_id)?;
        if profile.status != ProfileStatus::Approved {
            return Err(AppError::Validation(format!(
                "worker '{user_id}' is {}, only approved workers can join a workplace",
                profile.status
            )));
        }
        let w = require_workplace(conn, site)?;
        if !w.is_active {
            return Err(AppError::Validation(format!(
                "workplace '{}' is not active",
                w.name
            )));
        }

        let created = join(conn, user_id, site)?;
        if created {
            ttlog(conn, "worker_join", user_id, &format!("Joined #{} {}", w.id, w.name))?;
        }
        Ok((w, created))
    }

    /// Unlink a worker from a workplace. Shifts already recorded stay.
    pub fn leave(conn: &Connection, user_id: &str, site: i64) -> AppResult<Workplace> {
        Self::require_profile(conn, user_id)?;
        let w = require_workplace(conn, site)?;

        if !leave(conn, user_id, site)? {
            return Err(AppError::NotFound(format!(
                "worker '{user_id}' is not linked to workplace #{site}"
            )));
        }
        ttlog(conn, "worker_leave", user_id, &format!("Left #{} {}", w.id, w.name))?;
        Ok(w)
    }

    /// Apply `KEY=VALUE` edits. A repeated key keeps its last value.
    /// The log row names the changed fields, never their values.
    pub fn edit(conn: &Connection, user_id: &str, raw: &[String]) -> AppResult<Profile> {
        let mut fields: Vec<(&str, Option<String>)> = Vec::new();
        for s in raw {
            let (key, value) = parse_field_update(s)?;
            fields.retain(|(k, _)| *k != key);
            fields.push((key, value));
        }

        let p = update_profile_fields(conn, user_id, &fields)?;
        let names: Vec<&str> = fields.iter().map(|(k, _)| *k).collect();
        ttlog(conn, "worker_edit", user_id, &format!("Edited {}", names.join(", ")))?;
        Ok(p)
    }

    /// Delete a worker. Refused while shifts exist unless `with_entries`,
    /// in which case the shifts go too.
    pub fn delete(conn: &Connection, user_id: &str, with_entries: bool) -> AppResult<Deleted> {
        let profile = Self::require_profile(conn, user_id)?;

        let stored = count_entries(conn, user_id)?;
        if stored > 0 && !with_entries {
            return Err(AppError::Validation(format!(
                "worker '{user_id}' has {stored} time entries; pass --with-entries to delete them too"
            )));
        }

        let tx = conn.unchecked_transaction()?;
        let (links, entries) = delete_profile(&tx, user_id)?;
        ttlog(
            &tx,
            "worker_del",
            user_id,
            &format!(
                "Deleted {} ({links} workplace links, {entries} entries)",
                profile.display_name()
            ),
        )?;
        tx.commit()?;

        Ok(Deleted {
            profile,
            links,
            entries,
        })
    }
}
