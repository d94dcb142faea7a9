//! Versioned schema for the bdcrm store.
//!
//! Each numbered SQL file under `migrations/` is compiled in and applied once,
//! inside its own transaction, and recorded in `schema_version`. A database
//! written by a newer bdcrm is refused rather than downgraded.

use rusqlite::{params, Connection};

use crate::db::DbError;

struct Migration {
    version: i32,
    sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    sql: include_str!("migrations/001_baseline.sql"),
}];

/// Highest version this build knows how to apply.
fn latest_version() -> i32 {
    MIGRATIONS.last().map(|m| m.version).unwrap_or(0)
}

/// Applied schema version; 0 for a database bdcrm has never touched.
fn applied_version(conn: &Connection) -> Result<i32, DbError> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        );",
    )?;
    let version = conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_version",
        [],
        |row| row.get(0),
    )?;
    Ok(version)
}

/// Copy an on-disk database to `<path>.pre-migration.bak`.
/// In-memory and temporary databases have no path and are skipped.
fn snapshot(conn: &Connection) -> Result<(), DbError> {
    let path: String = conn.query_row("PRAGMA database_list", [], |row| row.get(2))?;
    if path.is_empty() || path == ":memory:" {
        return Ok(());
    }

    let target = format!("{}.pre-migration.bak", path);
    let mut dest = Connection::open(&target)?;
    rusqlite::backup::Backup::new(conn, &mut dest)?.step(-1)?;
    log::info!("Snapshot of {} written to {}", path, target);
    Ok(())
}

/// Bring the schema up to [`latest_version`]. Returns how many versions were
/// applied.
pub fn run_migrations(conn: &Connection) -> Result<usize, DbError> {
    let from = applied_version(conn)?;
    let latest = latest_version();

    if from > latest {
        return Err(DbError::Migration(format!(
            "database is at schema v{} but this bdcrm only knows v{}; upgrade bdcrm",
            from, latest
        )));
    }
    if from == latest {
        return Ok(0);
    }

    snapshot(conn)?;

    let mut applied = 0;
    for migration in MIGRATIONS.iter().filter(|m| m.version > from) {
        let tx = conn.unchecked_transaction()?;
        tx.execute_batch(migration.sql)
            .map_err(|e| DbError::Migration(format!("v{}: {}", migration.version, e)))?;
        tx.execute(
            "INSERT INTO schema_version (version) VALUES (?1)",
            params![migration.version],
        )?;
        tx.commit()?;
        applied += 1;
    }

    log::info!("Schema migrated v{} -> v{}", from, latest);
    Ok(applied)
}
