use crate::errors::{AppError, AppResult};
use crate::models::workplace::{Workplace, WorkplaceDraft};
use chrono::Utc;
use rusqlite::{Connection, OptionalExtension, Row, params};

pub(crate) const SELECT_WORKPLACE: &str = "SELECT id, name, company_name, address, site_number, project_number, is_active, created_at
     FROM workplaces";

fn clean(v: &Option<String>) -> Option<String> {
    v.as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

pub fn insert_workplace(conn: &Connection, draft: &WorkplaceDraft) -> AppResult<Workplace> {
    let name = clean(&draft.name)
        .ok_or_else(|| AppError::Validation("workplace name is required".into()))?;

    conn.execute(
        "INSERT INTO workplaces (name, company_name, address, site_number, project_number, is_active, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, 1, ?6)",
        params![
            name,
            clean(&draft.company_name),
            clean(&draft.address),
            clean(&draft.site_number),
            clean(&draft.project_number),
            Utc::now().to_rfc3339(),
        ],
    )?;

    let id = conn.last_insert_rowid();
    require_workplace(conn, id)
}

pub fn get_workplace(conn: &Connection, id: i64) -> AppResult<Option<Workplace>> {
    let w = conn
        .query_row(
            &format!("{SELECT_WORKPLACE} WHERE id = ?1"),
            [id],
            map_workplace,
        )
        .optional()?;
    Ok(w)
}

pub fn require_workplace(conn: &Connection, id: i64) -> AppResult<Workplace> {
    get_workplace(conn, id)?.ok_or_else(|| AppError::NotFound(format!("workplace #{id}")))
}

/// Workplaces by name; inactive ones only when `include_inactive`.
pub fn list_workplaces(conn: &Connection, include_inactive: bool) -> AppResult<Vec<Workplace>> {
    let mut stmt = conn.prepare(&format!(
        "{SELECT_WORKPLACE} WHERE (?1 OR is_active = 1) ORDER BY name COLLATE NOCASE, id"
    ))?;
    let rows = stmt.query_map([include_inactive], map_workplace)?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

pub fn set_active(conn: &Connection, id: i64, active: bool) -> AppResult<Workplace> {
    let n = conn.execute(
        "UPDATE workplaces SET is_active = ?1 WHERE id = ?2",
        params![active, id],
    )?;
    if n == 0 {
        return Err(AppError::NotFound(format!("workplace #{id}")));
    }
    require_workplace(conn, id)
}

/// Apply the fields present in `draft`. A blank optional field clears it;
/// a blank name is rejected.
pub fn update_workplace(conn: &Connection, id: i64, draft: &WorkplaceDraft) -> AppResult<Workplace> {
    let mut current = require_workplace(conn, id)?;

    if draft.name.is_some() {
        current.name = clean(&draft.name)
            .ok_or_else(|| AppError::Validation("workplace name cannot be empty".into()))?;
    }
    if draft.company_name.is_some() {
        current.company_name = clean(&draft.company_name);
    }
    if draft.address.is_some() {
        current.address = clean(&draft.address);
    }
    if draft.site_number.is_some() {
        current.site_number = clean(&draft.site_number);
    }
    if draft.project_number.is_some() {
        current.project_number = clean(&draft.project_number);
    }

    conn.execute(
        "UPDATE workplaces
         SET name = ?1, company_name = ?2, address = ?3, site_number = ?4, project_number = ?5
         WHERE id = ?6",
        params![
            current.name,
            current.company_name,
            current.address,
            current.site_number,
            current.project_number,
            id
        ],
    )?;

    Ok(current)
}

pub(crate) fn map_workplace(row: &Row) -> rusqlite::Result<Workplace> {
    Ok(Workplace {
        id: row.get(0)?,
        name: row.get(1)?,
        company_name: row.get(2)?,
        address: row.get(3)?,
        site_number: row.get(4)?,
        project_number: row.get(5)?,
        is_active: row.get(6)?,
        created_at: row.get(7)?,
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

    fn draft(name: &str) -> WorkplaceDraft {
        WorkplaceDraft {
            name: Some(name.into()),
            ..Default::default()
        }
    }

    #[test]
    fn name_is_required_and_trimmed() {
        let conn = setup();
        assert!(matches!(
            insert_workplace(&conn, &draft("   ")),
            Err(AppError::Validation(_))
        ));

        let w = insert_workplace(&conn, &draft("  Nordhavn Tower ")).unwrap();
        assert_eq!(w.name, "Nordhavn Tower");
        assert!(w.is_active);
    }

    #[test]
    fn inactive_sites_hidden_by_default() {
        let conn = setup();
        let a = insert_workplace(&conn, &draft("B site")).unwrap();
        insert_workplace(&conn, &draft("A site")).unwrap();
        set_active(&conn, a.id, false).unwrap();

        let active = list_workplaces(&conn, false).unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].name, "A site");
        assert_eq!(list_workplaces(&conn, true).unwrap().len(), 2);
    }

    #[test]
    fn edit_only_touches_given_fields() {
        let conn = setup();
        let w = insert_workplace(
            &conn,
            &WorkplaceDraft {
                name: Some("Harbour".into()),
                address: Some("Kaj 1".into()),
                site_number: Some("S-12".into()),
                ..Default::default()
            },
        )
        .unwrap();

        let edited = update_workplace(
            &conn,
            w.id,
            &WorkplaceDraft {
                address: Some("".into()),
                project_number: Some("P-7".into()),
                ..Default::default()
            },
        )
        .unwrap();

        assert_eq!(edited.name, "Harbour");
        assert_eq!(edited.address, None);
        assert_eq!(edited.project_number.as_deref(), Some("P-7"));
        assert_eq!(edited.site_line(), "S-12");
    }
}
