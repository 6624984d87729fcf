// src/db/memberships.rs
//! Worker ↔ workplace links (`user_workplaces`).

use crate::db::workplaces::{SELECT_WORKPLACE, map_workplace};
use crate::errors::AppResult;
use crate::models::workplace::Workplace;
use chrono::Utc;
use rusqlite::{Connection, params};

/// Link a worker to a workplace. Returns false when the link already existed.
pub fn join(conn: &Connection, user_id: &str, workplace_id: i64) -> AppResult<bool> {
    let n = conn.execute(
        "INSERT OR IGNORE INTO user_workplaces (user_id, workplace_id, joined_at)
         VALUES (?1, ?2, ?3)",
        params![user_id, workplace_id, Utc::now().to_rfc3339()],
    )?;
    Ok(n > 0)
}

/// Remove a link. Returns false when there was none.
pub fn leave(conn: &Connection, user_id: &str, workplace_id: i64) -> AppResult<bool> {
    let n = conn.execute(
        "DELETE FROM user_workplaces WHERE user_id = ?1 AND workplace_id = ?2",
        params![user_id, workplace_id],
    )?;
    Ok(n > 0)
}

pub fn is_member(conn: &Connection, user_id: &str, workplace_id: i64) -> AppResult<bool> {
    let n: i64 = conn.query_row(
        "SELECT COUNT(*) FROM user_workplaces WHERE user_id = ?1 AND workplace_id = ?2",
        params![user_id, workplace_id],
        |r| r.get(0),
    )?;
    Ok(n > 0)
}

/// Workplaces the worker belongs to, by name; inactive ones only when asked.
pub fn worker_workplaces(
    conn: &Connection,
    user_id: &str,
    include_inactive: bool,
) -> AppResult<Vec<Workplace>> {
    let mut stmt = conn.prepare(&format!(
        "{SELECT_WORKPLACE}
         WHERE id IN (SELECT workplace_id FROM user_workplaces WHERE user_id = ?1)
           AND (?2 OR is_active = 1)
         ORDER BY name COLLATE NOCASE, id"
    ))?;
    let rows = stmt.query_map(params![user_id, include_inactive], map_workplace)?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}
