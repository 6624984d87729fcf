use crate::errors::{AppError, AppResult};
use crate::models::profile::{EDITABLE_FIELDS, Profile, ProfileStatus};
use chrono::Utc;
use rusqlite::{Connection, OptionalExtension, Row, params, params_from_iter};
use std::collections::{BTreeMap, HashMap};

const SELECT_PROFILE: &str = "SELECT user_id, first_name, last_name, email, status, created_at, updated_at,
            team_title, phone_country, phone_number, bank_reg_no, bank_account_no,
            swift, iban, address, city, postal_code
     FROM profiles";

pub fn insert_profile(
    conn: &Connection,
    user_id: &str,
    first_name: Option<&str>,
    last_name: Option<&str>,
    email: Option<&str>,
) -> AppResult<Profile> {
    let user_id = user_id.trim();
    if user_id.is_empty() {
        return Err(AppError::Validation("worker id is required".into()));
    }
    if get_profile(conn, user_id)?.is_some() {
        return Err(AppError::AlreadyExists(format!("worker '{user_id}'")));
    }

    let now = Utc::now().to_rfc3339();
    conn.execute(
        "INSERT INTO profiles (user_id, first_name, last_name, email, status, team_approved, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, 'under_review', 0, ?5, ?5)",
        params![user_id, first_name, last_name, email, now],
    )?;

    get_profile(conn, user_id)?.ok_or_else(|| AppError::NotFound(format!("worker '{user_id}'")))
}

pub fn get_profile(conn: &Connection, user_id: &str) -> AppResult<Option<Profile>> {
    let p = conn
        .query_row(
            &format!("{SELECT_PROFILE} WHERE user_id = ?1"),
            [user_id],
            map_profile,
        )
        .optional()?;
    Ok(p)
}

/// Profiles sorted by display name, optionally restricted to one status.
pub fn list_profiles(conn: &Connection, status: Option<ProfileStatus>) -> AppResult<Vec<Profile>> {
    let mut stmt = conn.prepare(&format!(
        "{SELECT_PROFILE} WHERE (?1 IS NULL OR status = ?1)"
    ))?;
    let rows = stmt.query_map([status.map(|s| s.as_str())], map_profile)?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    out.sort_by_key(|p| (p.display_name().to_lowercase(), p.user_id.clone()));
    Ok(out)
}

/// Change a worker's status; `team_approved` follows it.
/// Returns the previous status.
pub fn set_status(
    conn: &Connection,
    user_id: &str,
    status: ProfileStatus,
) -> AppResult<ProfileStatus> {
    let previous = get_profile(conn, user_id)?
        .ok_or_else(|| AppError::NotFound(format!("worker '{user_id}'")))?
        .status;

    conn.execute(
        "UPDATE profiles
         SET status = ?1, team_approved = ?2, updated_at = ?3
         WHERE user_id = ?4",
        params![
            status.as_str(),
            status == ProfileStatus::Approved,
            Utc::now().to_rfc3339(),
            user_id
        ],
    )?;

    Ok(previous)
}

/// Write the given `(column, value)` pairs. Columns must come from
/// `EDITABLE_FIELDS`; anything else is rejected before touching the row.
pub fn update_profile_fields(
    conn: &Connection,
    user_id: &str,
    fields: &[(&str, Option<String>)],
) -> AppResult<Profile> {
    if fields.is_empty() {
        return Err(AppError::Validation("no fields to update".into()));
    }
    if let Some((bad, _)) = fields.iter().find(|(k, _)| !EDITABLE_FIELDS.contains(k)) {
        return Err(AppError::Validation(format!("field '{bad}' cannot be edited")));
    }
    if get_profile(conn, user_id)?.is_none() {
        return Err(AppError::NotFound(format!("worker '{user_id}'")));
    }

    let assignments: Vec<String> = fields
        .iter()
        .enumerate()
        .map(|(i, (k, _))| format!("{k} = ?{}", i + 1))
        .collect();
    let sql = format!(
        "UPDATE profiles SET {}, updated_at = ?{} WHERE user_id = ?{}",
        assignments.join(", "),
        fields.len() + 1,
        fields.len() + 2
    );

    let now = Utc::now().to_rfc3339();
    let mut values: Vec<Option<&str>> = fields.iter().map(|(_, v)| v.as_deref()).collect();
    values.push(Some(now.as_str()));
    values.push(Some(user_id));
    conn.execute(&sql, params_from_iter(values))?;

    get_profile(conn, user_id)?.ok_or_else(|| AppError::NotFound(format!("worker '{user_id}'")))
}

/// Number of time entries stored for a worker.
pub fn count_entries(conn: &Connection, user_id: &str) -> AppResult<i64> {
    Ok(conn.query_row(
        "SELECT COUNT(*) FROM time_entries WHERE user_id = ?1",
        [user_id],
        |r| r.get(0),
    )?)
}

/// Remove the profile row together with its workplace links and time entries.
/// Dependent rows are deleted explicitly so the result does not hinge on the
/// `foreign_keys` pragma. Returns `(links, entries)` removed.
pub fn delete_profile(conn: &Connection, user_id: &str) -> AppResult<(usize, usize)> {
    let links = conn.execute("DELETE FROM user_workplaces WHERE user_id = ?1", [user_id])?;
    let entries = conn.execute("DELETE FROM time_entries WHERE user_id = ?1", [user_id])?;
    let n = conn.execute("DELETE FROM profiles WHERE user_id = ?1", [user_id])?;
    if n == 0 {
        return Err(AppError::NotFound(format!("worker '{user_id}'")));
    }
    Ok((links, entries))
}

/// Current status of every profile, keyed by user id.
pub fn status_snapshot(conn: &Connection) -> AppResult<BTreeMap<String, ProfileStatus>> {
    Ok(list_profiles(conn, None)?
        .into_iter()
        .map(|p| (p.user_id, p.status))
        .collect())
}

/// Display names keyed by user id.
pub fn display_names(conn: &Connection) -> AppResult<HashMap<String, String>> {
    Ok(list_profiles(conn, None)?
        .into_iter()
        .map(|p| {
            let name = p.display_name();
            (p.user_id, name)
        })
        .collect())
}

fn map_profile(row: &Row) -> rusqlite::Result<Profile> {
    let status_text: String = row.get(4)?;
    let status = status_text.parse::<ProfileStatus>().map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(4, rusqlite::types::Type::Text, Box::new(e))
    })?;

    Ok(Profile {
        user_id: row.get(0)?,
        first_name: row.get(1)?,
        last_name: row.get(2)?,
        email: row.get(3)?,
        status,
        created_at: row.get(5)?,
        updated_at: row.get(6)?,
        team_title: row.get(7)?,
        phone_country: row.get(8)?,
        phone_number: row.get(9)?,
        bank_reg_no: row.get(10)?,
        bank_account_no: row.get(11)?,
        swift: row.get(12)?,
        iban: row.get(13)?,
        address: row.get(14)?,
        city: row.get(15)?,
        postal_code: row.get(16)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::migrate::run_pending_migrations;

    fn setup() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        run_pending_migrations(&conn).unwrap();
        conn
    }

    #[test]
    fn new_workers_start_under_review() {
        let conn = setup();
        let p = insert_profile(&conn, "w1", Some("Anna"), Some("Holm"), None).unwrap();

        assert_eq!(p.status, ProfileStatus::UnderReview);
        assert_eq!(p.display_name(), "Anna Holm");
        assert!(matches!(
            insert_profile(&conn, "w1", None, None, None),
            Err(AppError::AlreadyExists(_))
        ));
    }

    #[test]
    fn status_change_keeps_team_flag_in_sync() {
        let conn = setup();
        insert_profile(&conn, "w1", None, None, None).unwrap();

        let prev = set_status(&conn, "w1", ProfileStatus::Approved).unwrap();
        assert_eq!(prev, ProfileStatus::UnderReview);

        let flag: bool = conn
            .query_row("SELECT team_approved FROM profiles WHERE user_id='w1'", [], |r| r.get(0))
            .unwrap();
        assert!(flag);

        set_status(&conn, "w1", ProfileStatus::Rejected).unwrap();
        let flag: bool = conn
            .query_row("SELECT team_approved FROM profiles WHERE user_id='w1'", [], |r| r.get(0))
            .unwrap();
        assert!(!flag);

        assert!(matches!(
            set_status(&conn, "ghost", ProfileStatus::Approved),
            Err(AppError::NotFound(_))
        ));
    }

    #[test]
    fn edit_writes_whitelisted_columns_and_clears_blanks() {
        let conn = setup();
        insert_profile(&conn, "w1", Some("Anna"), Some("Holm"), None).unwrap();
        update_profile_fields(&conn, "w1", &[("city", Some("Aarhus".into()))]).unwrap();

        let p = update_profile_fields(
            &conn,
            "w1",
            &[
                ("iban", Some("DK5000400440116243".into())),
                ("team_title", Some("Foreman".into())),
                ("city", None),
            ],
        )
        .unwrap();

        assert_eq!(p.iban.as_deref(), Some("DK5000400440116243"));
        assert_eq!(p.team_title.as_deref(), Some("Foreman"));
        assert_eq!(p.city, None);
        assert_eq!(p.status, ProfileStatus::UnderReview);

        assert!(matches!(
            update_profile_fields(&conn, "w1", &[("status", Some("approved".into()))]),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            update_profile_fields(&conn, "ghost", &[("city", None)]),
            Err(AppError::NotFound(_))
        ));
    }

    #[test]
    fn delete_removes_profile_links_and_entries() {
        let conn = setup();
        insert_profile(&conn, "w1", None, None, None).unwrap();
        insert_profile(&conn, "w2", None, None, None).unwrap();
        conn.execute(
            "INSERT INTO workplaces (name, is_active, created_at) VALUES ('Harbour', 1, 'x')",
            [],
        )
        .unwrap();
        for user in ["w1", "w2"] {
            conn.execute(
                "INSERT INTO user_workplaces (user_id, workplace_id, joined_at) VALUES (?1, 1, 'x')",
                [user],
            )
            .unwrap();
            conn.execute(
                "INSERT INTO time_entries (user_id, workplace_id, started_at, ended_at, break_minutes, created_at)
                 VALUES (?1, 1, '2025-10-13T07:00:00Z', '2025-10-13T15:00:00Z', 0, 'x')",
                [user],
            )
            .unwrap();
        }
        assert_eq!(count_entries(&conn, "w1").unwrap(), 1);

        assert_eq!(delete_profile(&conn, "w1").unwrap(), (1, 1));
        assert!(get_profile(&conn, "w1").unwrap().is_none());
        assert_eq!(count_entries(&conn, "w1").unwrap(), 0);
        assert_eq!(count_entries(&conn, "w2").unwrap(), 1);

        assert!(matches!(delete_profile(&conn, "w1"), Err(AppError::NotFound(_))));
    }

    #[test]
    fn list_sorts_by_name_and_filters_status() {
        let conn = setup();
        insert_profile(&conn, "w1", Some("Ole"), Some("Berg"), None).unwrap();
        insert_profile(&conn, "w2", Some("Anna"), Some("Holm"), None).unwrap();
        set_status(&conn, "w1", ProfileStatus::Approved).unwrap();

        let all: Vec<String> = list_profiles(&conn, None)
            .unwrap()
            .into_iter()
            .map(|p| p.user_id)
            .collect();
        assert_eq!(all, vec!["w2", "w1"]);

        let approved = list_profiles(&conn, Some(ProfileStatus::Approved)).unwrap();
        assert_eq!(approved.len(), 1);
        assert_eq!(approved[0].user_id, "w1");
    }
}
