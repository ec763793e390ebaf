#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! SQLite storage layer for the LODES explorer.
//!
//! The store is deliberately plain: three tables populated once by the
//! ingestion CLI and read by the API server. The schema mirrors the LODES
//! WAC file layout, one lowercase integer column per marginal count, so
//! rows can be loaded without any remapping.

pub mod queries;

use std::path::Path;

use rusqlite::{Connection, OpenFlags};
use thiserror::Error;

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum DbError {
    /// Underlying SQLite operation failed.
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Opens (creating if needed) the explorer database at `path`.
///
/// # Errors
///
/// Returns a [`DbError`] if the file cannot be opened.
pub fn open(path: &Path) -> Result<Connection, DbError> {
    Ok(Connection::open(path)?)
}

/// Opens an existing explorer database read-only.
///
/// Used by the API server, which never writes.
///
/// # Errors
///
/// Returns a [`DbError`] if the file cannot be opened.
pub fn open_read_only(path: &Path) -> Result<Connection, DbError> {
    Ok(Connection::open_with_flags(
        path,
        OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
    )?)
}

/// Creates the explorer tables if they do not already exist.
///
/// Idempotent; safe to run on every startup.
///
/// # Errors
///
/// Returns a [`DbError`] if schema creation fails.
pub fn run_migrations(conn: &Connection) -> Result<(), DbError> {
    let wac_columns = lodes_explorer_wac_models::ALL_COLUMNS
        .iter()
        .map(|col| format!("{col} INTEGER DEFAULT 0"))
        .collect::<Vec<_>>()
        .join(",\n            ");

    conn.execute_batch(&format!(
        "CREATE TABLE IF NOT EXISTS cbsas (
            id INTEGER PRIMARY KEY,
            cbsa_code TEXT UNIQUE NOT NULL,
            cbsa_name TEXT NOT NULL,
            total_jobs INTEGER DEFAULT 0
        );
        CREATE TABLE IF NOT EXISTS blockgroups (
            id INTEGER PRIMARY KEY,
            cbsa_code TEXT NOT NULL,
            bg_geoid TEXT NOT NULL,
            geometry TEXT NOT NULL,
            UNIQUE(cbsa_code, bg_geoid)
        );
        CREATE TABLE IF NOT EXISTS wac_data (
            id INTEGER PRIMARY KEY,
            cbsa_code TEXT NOT NULL,
            bg_geoid TEXT NOT NULL,
            {wac_columns},
            UNIQUE(cbsa_code, bg_geoid)
        );"
    ))?;

    log::debug!("Migrations complete");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn migrations_are_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        run_migrations(&conn).unwrap();

        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(count, 3);
    }

    #[test]
    fn wac_table_has_all_marginal_columns() {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();

        let mut stmt = conn.prepare("SELECT * FROM wac_data").unwrap();
        let names: Vec<String> = stmt.column_names().iter().map(ToString::to_string).collect();
        for col in lodes_explorer_wac_models::ALL_COLUMNS {
            assert!(names.iter().any(|n| n == col), "missing column {col}");
        }
    }
}
