//! Shift registration. Unlike aggregation, bad input is rejected here.

use crate::db::intervals::{delete_entries_between, delete_entry, get_entry, insert_entry};
use crate::db::log::ttlog;
use crate::db::memberships::is_member;
use crate::db::profiles::get_profile;
use crate::db::workplaces::require_workplace;
use crate::errors::{AppError, AppResult};
use crate::models::interval::{NewTimeEntry, RawInterval, TimeInterval};
use crate::utils::date::{Calendar, add_days, parse_date};
use crate::utils::formatting::hhmm;
use crate::utils::time::parse_required_time;
use chrono::{NaiveTime, Utc};
use rusqlite::Connection;

/// A shift as typed on the command line, in the configured calendar.
#[derive(Debug, Clone)]
pub struct EntryRequest {
    pub worker: String,
    pub site: i64,
    pub date: String,
    pub start: String,
    pub end: String,
    pub break_minutes: i64,
    pub notes: Option<String>,
    /// Keep other entries of the same worker, site and day.
    pub append: bool,
}

#[derive(Debug, Clone)]
pub struct Registered {
    pub id: i64,
    pub interval: TimeInterval,
    pub replaced: usize,
}

pub struct EntryLogic;

impl EntryLogic {
    /// Validate the request against the calendar, then store it.
    /// By default an entry replaces the worker's entries at the same site
    /// on the same local day.
    pub fn register(
        conn: &Connection,
        calendar: &Calendar,
        req: &EntryRequest,
    ) -> AppResult<Registered> {
        let new = Self::validate(conn, calendar, req)?;

        let tx = conn.unchecked_transaction()?;

        let replaced = if req.append {
            0
        } else {
            let day = calendar.date_of(&new.started_at);
            let from = calendar.to_instant(day, NaiveTime::MIN)?.with_timezone(&Utc);
            let before = calendar
                .to_instant(add_days(day, 1), NaiveTime::MIN)?
                .with_timezone(&Utc);
            delete_entries_between(&tx, &new.user_id, req.site, &from, &before)?
        };

        let id = insert_entry(&tx, &new)?;
        let interval = TimeInterval::new(
            new.user_id.clone(),
            Some(req.site.to_string()),
            new.started_at,
            new.ended_at,
            new.break_minutes,
        );

        let mut msg = format!(
            "{} {} at site #{}: {}",
            new.user_id,
            req.date.trim(),
            req.site,
            hhmm(interval.worked_minutes())
        );
        if replaced > 0 {
            msg.push_str(&format!(" (replaced {replaced})"));
        }
        ttlog(&tx, "entry_add", &id.to_string(), &msg)?;

        tx.commit()?;

        Ok(Registered {
            id,
            interval,
            replaced,
        })
    }

    fn validate(
        conn: &Connection,
        calendar: &Calendar,
        req: &EntryRequest,
    ) -> AppResult<NewTimeEntry> {
        if get_profile(conn, &req.worker)?.is_none() {
            return Err(AppError::NotFound(format!("worker '{}'", req.worker)));
        }
        let site = require_workplace(conn, req.site)?;
        if !site.is_active {
            return Err(AppError::InvalidEntry(format!(
                "workplace '{}' is not active",
                site.name
            )));
        }
        if !is_member(conn, &req.worker, req.site)? {
            return Err(AppError::InvalidEntry(format!(
                "worker '{}' is not a member of workplace '{}'",
                req.worker, site.name
            )));
        }

        let date = parse_date(&req.date).ok_or_else(|| AppError::InvalidDate(req.date.clone()))?;
        let start = parse_required_time(&req.start)?;
        let end = parse_required_time(&req.end)?;

        let started_at = calendar.to_instant(date, start)?;
        let ended_at = calendar.to_instant(date, end)?;

        if ended_at <= started_at {
            return Err(AppError::InvalidEntry(
                "end time must be after start time".into(),
            ));
        }
        if req.break_minutes < 0 {
            return Err(AppError::InvalidEntry("break cannot be negative".into()));
        }

        Ok(NewTimeEntry {
            user_id: req.worker.clone(),
            workplace_id: Some(req.site),
            started_at,
            ended_at,
            break_minutes: req.break_minutes,
            notes: req
                .notes
                .as_deref()
                .map(str::trim)
                .filter(|n| !n.is_empty())
                .map(str::to_string),
        })
    }

    /// Remove one shift and return what was stored.
    pub fn delete(conn: &Connection, id: i64) -> AppResult<RawInterval> {
        let entry = get_entry(conn, id)?
            .ok_or_else(|| AppError::NotFound(format!("time entry #{id}")))?;
        delete_entry(conn, id)?;
        ttlog(
            conn,
            "entry_del",
            &id.to_string(),
            &format!("{} from {}", entry.subject_id, entry.started_at),
        )?;
        Ok(entry)
    }
}
