//! Versioned schema migrations.
//!
//! Each migration runs once; its version string is recorded in the `log`
//! table as a `migration_applied` row.

use crate::errors::{AppError, AppResult};
use crate::ui::messages::success;
use rusqlite::{Connection, OptionalExtension, params};

struct Migration {
    version: &'static str,
    description: &'static str,
    sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[
    Migration {
        version: "20250901_0001_initial_schema",
        description: "Created profiles, workplaces and time_entries tables",
        sql: r#"
        CREATE TABLE IF NOT EXISTS profiles (
            user_id       TEXT PRIMARY KEY,
            first_name    TEXT,
            last_name     TEXT,
            email         TEXT,
            status        TEXT NOT NULL DEFAULT 'under_review'
                          CHECK(status IN ('under_review','approved','rejected')),
            team_approved INTEGER NOT NULL DEFAULT 0,
            created_at    TEXT NOT NULL,
            updated_at    TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS workplaces (
            id             INTEGER PRIMARY KEY AUTOINCREMENT,
            name           TEXT NOT NULL,
            company_name   TEXT,
            address        TEXT,
            site_number    TEXT,
            project_number TEXT,
            is_active      INTEGER NOT NULL DEFAULT 1,
            created_at     TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS time_entries (
            id            INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id       TEXT NOT NULL REFERENCES profiles(user_id) ON DELETE CASCADE,
            workplace_id  INTEGER REFERENCES workplaces(id) ON DELETE SET NULL,
            started_at    TEXT NOT NULL,
            ended_at      TEXT NOT NULL,
            break_minutes DEFAULT 0,
            notes         TEXT,
            created_at    TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_entries_started ON time_entries(started_at);
        CREATE INDEX IF NOT EXISTS idx_entries_user ON time_entries(user_id, started_at);
        CREATE INDEX IF NOT EXISTS idx_entries_site ON time_entries(workplace_id, started_at);
        "#,
    },
    Migration {
        version: "20250915_0002_documents",
        description: "Created documents table",
        sql: r#"
        CREATE TABLE IF NOT EXISTS documents (
            id           INTEGER PRIMARY KEY AUTOINCREMENT,
            title        TEXT NOT NULL,
            type         TEXT NOT NULL,
            description  TEXT,
            storage_path TEXT NOT NULL,
            created_at   TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_documents_created ON documents(created_at);
        "#,
    },
    Migration {
        version: "20251020_0003_memberships_and_profile_details",
        description: "Created user_workplaces table and added profile contact/bank columns",
        sql: r#"
        CREATE TABLE IF NOT EXISTS user_workplaces (
            user_id      TEXT NOT NULL REFERENCES profiles(user_id) ON DELETE CASCADE,
            workplace_id INTEGER NOT NULL REFERENCES workplaces(id) ON DELETE CASCADE,
            joined_at    TEXT NOT NULL,
            PRIMARY KEY (user_id, workplace_id)
        );

        CREATE INDEX IF NOT EXISTS idx_user_workplaces_site ON user_workplaces(workplace_id);

        ALTER TABLE profiles ADD COLUMN team_title      TEXT;
        ALTER TABLE profiles ADD COLUMN phone_country   TEXT;
        ALTER TABLE profiles ADD COLUMN phone_number    TEXT;
        ALTER TABLE profiles ADD COLUMN bank_reg_no     TEXT;
        ALTER TABLE profiles ADD COLUMN bank_account_no TEXT;
        ALTER TABLE profiles ADD COLUMN swift           TEXT;
        ALTER TABLE profiles ADD COLUMN iban            TEXT;
        ALTER TABLE profiles ADD COLUMN address         TEXT;
        ALTER TABLE profiles ADD COLUMN city            TEXT;
        ALTER TABLE profiles ADD COLUMN postal_code     TEXT;
        "#,
    },
];

/// Ensure that the `log` table exists; migrations are tracked there.
fn ensure_log_table(conn: &Connection) -> AppResult<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS log (
            id        INTEGER PRIMARY KEY AUTOINCREMENT,
            date      TEXT NOT NULL,
            operation TEXT NOT NULL,
            target    TEXT DEFAULT '',
            message   TEXT NOT NULL
        );
        "#,
    )?;
    Ok(())
}

pub fn is_applied(conn: &Connection, version: &str) -> AppResult<bool> {
    let found = conn
        .query_row(
            "SELECT 1 FROM log
             WHERE operation = 'migration_applied' AND target = ?1
             LIMIT 1",
            [version],
            |_| Ok(()),
        )
        .optional()?;
    Ok(found.is_some())
}

fn apply(conn: &Connection, m: &Migration) -> AppResult<()> {
    let tx = conn.unchecked_transaction()?;

    tx.execute_batch(m.sql)
        .map_err(|e| AppError::Migration(format!("{}: {}", m.version, e)))?;

    tx.execute(
        "INSERT INTO log (date, operation, target, message)
         VALUES (?1, 'migration_applied', ?2, ?3)",
        params![chrono::Local::now().to_rfc3339(), m.version, m.description],
    )?;

    tx.commit()?;
    Ok(())
}

/// Public entry point: run all pending migrations in version order.
/// Returns the versions applied by this call.
pub fn run_pending_migrations(conn: &Connection) -> AppResult<Vec<&'static str>> {
    ensure_log_table(conn)?;

    let mut applied = Vec::new();
    for m in MIGRATIONS {
        if is_applied(conn, m.version)? {
            continue;
        }
        apply(conn, m)?;
        success(format!("Migration applied: {} → {}", m.version, m.description));
        applied.push(m.version);
    }

    Ok(applied)
}
