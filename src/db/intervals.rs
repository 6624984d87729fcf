//! `time_entries` access: the raw interval source for every report.

use crate::errors::AppResult;
use crate::models::interval::{NewTimeEntry, RawInterval, TimeInterval};
use crate::ui::messages::warning;
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::types::ValueRef;
use rusqlite::{Connection, Row, params, params_from_iter};

/// Filter for the raw interval source. Bounds apply to `started_at`.
#[derive(Debug, Clone, Default)]
pub struct IntervalQuery {
    pub subjects: Option<Vec<String>>,
    pub site: Option<String>,
    pub started_from: Option<DateTime<Utc>>,
    pub started_before: Option<DateTime<Utc>>,
    pub approved_only: bool,
}

impl IntervalQuery {
    pub fn for_subject(id: &str) -> Self {
        Self {
            subjects: Some(vec![id.to_string()]),
            ..Default::default()
        }
    }

    pub fn for_site(site: &str) -> Self {
        Self {
            site: Some(site.to_string()),
            ..Default::default()
        }
    }

    pub fn between(mut self, from: DateTime<Utc>, before: DateTime<Utc>) -> Self {
        self.started_from = Some(from);
        self.started_before = Some(before);
        self
    }

    pub fn approved(mut self) -> Self {
        self.approved_only = true;
        self
    }
}

/// Instants are stored as UTC RFC 3339 text so that text order is time order.
pub fn to_db_instant(instant: &DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Secs, true)
}

pub fn insert_entry(conn: &Connection, entry: &NewTimeEntry) -> AppResult<i64> {
    conn.execute(
        "INSERT INTO time_entries
             (user_id, workplace_id, started_at, ended_at, break_minutes, notes, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            entry.user_id,
            entry.workplace_id,
            to_db_instant(&entry.started_at.with_timezone(&Utc)),
            to_db_instant(&entry.ended_at.with_timezone(&Utc)),
            entry.break_minutes,
            entry.notes,
            to_db_instant(&Utc::now()),
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn delete_entry(conn: &Connection, id: i64) -> AppResult<bool> {
    let n = conn.execute("DELETE FROM time_entries WHERE id = ?1", [id])?;
    Ok(n > 0)
}

/// Remove a worker's entries at a site starting in `[from, before)`.
pub fn delete_entries_between(
    conn: &Connection,
    user_id: &str,
    workplace_id: i64,
    from: &DateTime<Utc>,
    before: &DateTime<Utc>,
) -> AppResult<usize> {
    let n = conn.execute(
        "DELETE FROM time_entries
         WHERE user_id = ?1 AND workplace_id = ?2 AND started_at >= ?3 AND started_at < ?4",
        params![user_id, workplace_id, to_db_instant(from), to_db_instant(before)],
    )?;
    Ok(n)
}

pub fn get_entry(conn: &Connection, id: i64) -> AppResult<Option<RawInterval>> {
    let mut stmt = conn.prepare(&format!("{SELECT_RAW} WHERE e.id = ?1"))?;
    let mut rows = stmt.query_map([id], map_raw)?;
    Ok(rows.next().transpose()?)
}

const SELECT_RAW: &str = "SELECT e.id, e.user_id, CAST(e.workplace_id AS TEXT),
        e.started_at, e.ended_at, e.break_minutes, e.notes
     FROM time_entries e";

/// Rows matching `query`, oldest start first, timestamps left as text.
pub fn load_raw(conn: &Connection, query: &IntervalQuery) -> AppResult<Vec<RawInterval>> {
    let mut sql = String::from(SELECT_RAW);
    let mut clauses: Vec<String> = Vec::new();
    let mut args: Vec<String> = Vec::new();

    if query.approved_only {
        sql.push_str(" JOIN profiles p ON p.user_id = e.user_id AND p.status = 'approved'");
    }

    if let Some(subjects) = &query.subjects {
        if subjects.is_empty() {
            return Ok(Vec::new());
        }
        let marks = vec!["?"; subjects.len()].join(", ");
        clauses.push(format!("e.user_id IN ({marks})"));
        args.extend(subjects.iter().cloned());
    }
    if let Some(site) = &query.site {
        clauses.push("CAST(e.workplace_id AS TEXT) = ?".into());
        args.push(site.clone());
    }
    if let Some(from) = &query.started_from {
        clauses.push("e.started_at >= ?".into());
        args.push(to_db_instant(from));
    }
    if let Some(before) = &query.started_before {
        clauses.push("e.started_at < ?".into());
        args.push(to_db_instant(before));
    }

    if !clauses.is_empty() {
        sql.push_str(" WHERE ");
        sql.push_str(&clauses.join(" AND "));
    }
    sql.push_str(" ORDER BY e.started_at ASC, e.id ASC");

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params_from_iter(args.iter()), map_raw)?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

/// Parsed intervals. Rows with unreadable timestamps are skipped with a warning.
pub fn load_intervals(conn: &Connection, query: &IntervalQuery) -> AppResult<Vec<TimeInterval>> {
    Ok(parse_all(&load_raw(conn, query)?)
        .into_iter()
        .map(|(_, iv)| iv)
        .collect())
}

/// Pairs every parseable raw row with its parsed interval.
pub fn parse_all(rows: &[RawInterval]) -> Vec<(&RawInterval, TimeInterval)> {
    rows.iter()
        .filter_map(|raw| match raw.parse() {
            Ok(iv) => Some((raw, iv)),
            Err(e) => {
                warning(format!("Skipping time entry #{}: {}", raw.id, e));
                None
            }
        })
        .collect()
}

fn map_raw(row: &Row) -> rusqlite::Result<RawInterval> {
    Ok(RawInterval {
        id: row.get(0)?,
        subject_id: row.get(1)?,
        site_id: row.get(2)?,
        started_at: row.get(3)?,
        ended_at: row.get(4)?,
        break_minutes: break_value(row.get_ref(5)?),
        notes: row.get(6)?,
    })
}

/// Break column as minutes; NULL or non-numeric reads as 0.
fn break_value(v: ValueRef<'_>) -> i64 {
    match v {
        ValueRef::Integer(i) => i,
        ValueRef::Real(f) if f.is_finite() => f.round() as i64,
        ValueRef::Text(t) => std::str::from_utf8(t)
            .ok()
            .and_then(|s| s.trim().parse::<i64>().ok())
            .unwrap_or(0),
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::migrate::run_pending_migrations;
    use chrono::TimeZone;

    fn setup() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        run_pending_migrations(&conn).unwrap();
        conn.execute_batch(
            "INSERT INTO profiles (user_id, status, created_at, updated_at)
                 VALUES ('w1', 'approved', 'x', 'x'), ('w2', 'under_review', 'x', 'x');
             INSERT INTO workplaces (name, created_at) VALUES ('Site A', 'x');",
        )
        .unwrap();
        conn
    }

    fn raw_insert(conn: &Connection, user: &str, start: &str, end: &str, brk: &str) {
        conn.execute(
            &format!(
                "INSERT INTO time_entries (user_id, workplace_id, started_at, ended_at, break_minutes, created_at)
                 VALUES (?1, 1, ?2, ?3, {brk}, 'x')"
            ),
            params![user, start, end],
        )
        .unwrap();
    }

    #[test]
    fn break_column_tolerates_junk() {
        let conn = setup();
        raw_insert(&conn, "w1", "2025-10-13T07:00:00Z", "2025-10-13T15:00:00Z", "NULL");
        raw_insert(&conn, "w1", "2025-10-14T07:00:00Z", "2025-10-14T15:00:00Z", "'abc'");
        raw_insert(&conn, "w1", "2025-10-15T07:00:00Z", "2025-10-15T15:00:00Z", "' 45 '");

        let rows = load_raw(&conn, &IntervalQuery::default()).unwrap();
        let breaks: Vec<i64> = rows.iter().map(|r| r.break_minutes).collect();
        assert_eq!(breaks, vec![0, 0, 45]);
    }

    #[test]
    fn unparseable_timestamps_are_skipped() {
        let conn = setup();
        raw_insert(&conn, "w1", "not a time", "2025-10-13T15:00:00Z", "0");
        raw_insert(&conn, "w1", "2025-10-14T07:00:00Z", "2025-10-14T15:00:00Z", "0");

        let ivs = load_intervals(&conn, &IntervalQuery::default()).unwrap();
        assert_eq!(ivs.len(), 1);
        assert_eq!(ivs[0].worked_minutes(), 480);
    }

    #[test]
    fn filters_by_site_bounds_and_approval() {
        let conn = setup();
        raw_insert(&conn, "w1", "2025-10-13T07:00:00Z", "2025-10-13T15:00:00Z", "0");
        raw_insert(&conn, "w2", "2025-10-13T07:00:00Z", "2025-10-13T15:00:00Z", "0");
        raw_insert(&conn, "w1", "2025-10-20T07:00:00Z", "2025-10-20T15:00:00Z", "0");

        let from = Utc.with_ymd_and_hms(2025, 10, 13, 0, 0, 0).unwrap();
        let before = Utc.with_ymd_and_hms(2025, 10, 20, 0, 0, 0).unwrap();

        let all_in_week = IntervalQuery::for_site("1").between(from, before);
        assert_eq!(load_raw(&conn, &all_in_week).unwrap().len(), 2);

        let approved = all_in_week.approved();
        let rows = load_raw(&conn, &approved).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].subject_id, "w1");
        assert_eq!(rows[0].site_id.as_deref(), Some("1"));

        assert!(load_raw(&conn, &IntervalQuery::for_site("2")).unwrap().is_empty());
    }

    #[test]
    fn insert_stores_utc_and_delete_removes() {
        let conn = setup();
        let entry = NewTimeEntry {
            user_id: "w1".into(),
            workplace_id: Some(1),
            started_at: DateTime::parse_from_rfc3339("2025-10-13T07:00:00+02:00").unwrap(),
            ended_at: DateTime::parse_from_rfc3339("2025-10-13T15:30:00+02:00").unwrap(),
            break_minutes: 30,
            notes: Some("formwork".into()),
        };
        let id = insert_entry(&conn, &entry).unwrap();

        let raw = get_entry(&conn, id).unwrap().unwrap();
        assert_eq!(raw.started_at, "2025-10-13T05:00:00Z");
        assert_eq!(raw.parse().unwrap().worked_minutes(), 480);

        assert!(delete_entry(&conn, id).unwrap());
        assert!(!delete_entry(&conn, id).unwrap());
    }
}
