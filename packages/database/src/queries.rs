//! Read and write queries against the explorer SQLite store.

use lodes_explorer_database_models::{BlockGroupRow, CbsaRow};
use lodes_explorer_wac_models::{ALL_COLUMNS, FilterSelection, WacCounts};
use rusqlite::Connection;

use crate::DbError;

/// Returns all CBSAs ordered by code.
///
/// # Errors
///
/// Returns a [`DbError`] if the query fails.
pub fn list_cbsas(conn: &Connection) -> Result<Vec<CbsaRow>, DbError> {
    let mut stmt = conn
        .prepare("SELECT id, cbsa_code, cbsa_name, total_jobs FROM cbsas ORDER BY cbsa_code")?;
    let mut rows = stmt.query([])?;

    let mut cbsas = Vec::new();
    while let Some(row) = rows.next()? {
        cbsas.push(cbsa_from_row(row)?);
    }
    Ok(cbsas)
}

/// Looks up a single CBSA by code.
///
/// # Errors
///
/// Returns a [`DbError`] if the query fails.
pub fn get_cbsa(conn: &Connection, cbsa_code: &str) -> Result<Option<CbsaRow>, DbError> {
    let mut stmt = conn
        .prepare("SELECT id, cbsa_code, cbsa_name, total_jobs FROM cbsas WHERE cbsa_code = ?1")?;
    let mut rows = stmt.query([cbsa_code])?;

    match rows.next()? {
        Some(row) => Ok(Some(cbsa_from_row(row)?)),
        None => Ok(None),
    }
}

/// Returns every block group in a CBSA joined to its WAC counts.
///
/// An empty selection uses a `LEFT JOIN` so block groups with no WAC row
/// are still served, with all counts zero. When the selection is
/// non-empty, rows whose selected marginal counts are all zero are
/// excluded in SQL (`AND w.<col> > 0` per active filter), which also
/// excludes block groups with no WAC row at all. Column names come only
/// from the validated catalog enum, never from raw caller input.
///
/// # Errors
///
/// Returns a [`DbError`] if the query fails.
pub fn blockgroups_with_wac(
    conn: &Connection,
    cbsa_code: &str,
    selection: &FilterSelection,
) -> Result<Vec<BlockGroupRow>, DbError> {
    let count_columns = ALL_COLUMNS
        .iter()
        .map(|col| format!("w.{col}"))
        .collect::<Vec<_>>()
        .join(", ");

    let join = if selection.is_empty() {
        "LEFT JOIN"
    } else {
        "JOIN"
    };
    let mut sql = format!(
        "SELECT bg.bg_geoid, bg.geometry, {count_columns}
         FROM blockgroups bg
         {join} wac_data w ON bg.bg_geoid = w.bg_geoid AND bg.cbsa_code = w.cbsa_code
         WHERE bg.cbsa_code = ?1"
    );
    for column in selection.columns() {
        sql.push_str(&format!(" AND w.{column} > 0"));
    }

    let mut stmt = conn.prepare(&sql)?;
    let mut rows = stmt.query([cbsa_code])?;

    let mut block_groups = Vec::new();
    while let Some(row) = rows.next()? {
        let bg_geoid: String = row.get(0)?;
        let geometry: String = row.get(1)?;

        let mut counts = WacCounts::new();
        for (i, col) in ALL_COLUMNS.iter().enumerate() {
            let value: Option<i64> = row.get(2 + i)?;
            counts.insert(col, u64::try_from(value.unwrap_or(0)).unwrap_or(0));
        }

        block_groups.push(BlockGroupRow {
            bg_geoid,
            geometry,
            counts,
        });
    }
    Ok(block_groups)
}

/// Inserts a CBSA if it does not already exist.
///
/// # Errors
///
/// Returns a [`DbError`] if the insert fails.
pub fn insert_cbsa(conn: &Connection, cbsa_code: &str, cbsa_name: &str) -> Result<(), DbError> {
    conn.execute(
        "INSERT OR IGNORE INTO cbsas (cbsa_code, cbsa_name) VALUES (?1, ?2)",
        [cbsa_code, cbsa_name],
    )?;
    Ok(())
}

/// Sets a CBSA's total job count.
///
/// # Errors
///
/// Returns a [`DbError`] if the update fails.
pub fn update_cbsa_total_jobs(
    conn: &Connection,
    cbsa_code: &str,
    total_jobs: u64,
) -> Result<(), DbError> {
    conn.execute(
        "UPDATE cbsas SET total_jobs = ?1 WHERE cbsa_code = ?2",
        rusqlite::params![i64::try_from(total_jobs).unwrap_or(i64::MAX), cbsa_code],
    )?;
    Ok(())
}

/// Inserts a block group geometry row if it does not already exist.
///
/// # Errors
///
/// Returns a [`DbError`] if the insert fails.
pub fn insert_blockgroup(
    conn: &Connection,
    cbsa_code: &str,
    bg_geoid: &str,
    geometry: &str,
) -> Result<(), DbError> {
    conn.execute(
        "INSERT OR IGNORE INTO blockgroups (cbsa_code, bg_geoid, geometry) VALUES (?1, ?2, ?3)",
        [cbsa_code, bg_geoid, geometry],
    )?;
    Ok(())
}

/// Inserts a WAC count row if it does not already exist.
///
/// Every column in [`ALL_COLUMNS`] is written; codes absent from `counts`
/// default to 0.
///
/// # Errors
///
/// Returns a [`DbError`] if the insert fails.
pub fn insert_wac(
    conn: &Connection,
    cbsa_code: &str,
    bg_geoid: &str,
    counts: &WacCounts,
) -> Result<(), DbError> {
    let columns = ALL_COLUMNS.join(", ");
    let placeholders = (3..=ALL_COLUMNS.len() + 2)
        .map(|i| format!("?{i}"))
        .collect::<Vec<_>>()
        .join(", ");
    let sql = format!(
        "INSERT OR IGNORE INTO wac_data (cbsa_code, bg_geoid, {columns}) VALUES (?1, ?2, {placeholders})"
    );

    let mut params: Vec<rusqlite::types::Value> = Vec::with_capacity(ALL_COLUMNS.len() + 2);
    params.push(rusqlite::types::Value::Text(cbsa_code.to_string()));
    params.push(rusqlite::types::Value::Text(bg_geoid.to_string()));
    for col in ALL_COLUMNS {
        let value = i64::try_from(counts.get(col)).unwrap_or(i64::MAX);
        params.push(rusqlite::types::Value::Integer(value));
    }

    conn.execute(&sql, rusqlite::params_from_iter(params))?;
    Ok(())
}

fn cbsa_from_row(row: &rusqlite::Row<'_>) -> Result<CbsaRow, DbError> {
    let total_jobs: Option<i64> = row.get(3)?;
    Ok(CbsaRow {
        id: row.get(0)?,
        cbsa_code: row.get(1)?,
        cbsa_name: row.get(2)?,
        total_jobs: u64::try_from(total_jobs.unwrap_or(0)).unwrap_or(0),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::run_migrations;

    fn test_db() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        conn
    }

    fn counts(pairs: &[(&str, u64)]) -> WacCounts {
        pairs.iter().map(|&(code, count)| (code, count)).collect()
    }

    #[test]
    fn cbsa_roundtrip_and_ordering() {
        let conn = test_db();
        insert_cbsa(&conn, "47900", "Washington-Arlington-Alexandria, DC-VA-MD-WV").unwrap();
        insert_cbsa(&conn, "31080", "Los Angeles-Long Beach-Anaheim, CA").unwrap();
        update_cbsa_total_jobs(&conn, "31080", 12345).unwrap();

        let cbsas = list_cbsas(&conn).unwrap();
        assert_eq!(cbsas.len(), 2);
        assert_eq!(cbsas[0].cbsa_code, "31080");
        assert_eq!(cbsas[0].total_jobs, 12345);
        assert_eq!(cbsas[1].total_jobs, 0);

        let dc = get_cbsa(&conn, "47900").unwrap().unwrap();
        assert!(dc.cbsa_name.starts_with("Washington"));
        assert!(get_cbsa(&conn, "99999").unwrap().is_none());
    }

    #[test]
    fn insert_cbsa_is_idempotent() {
        let conn = test_db();
        insert_cbsa(&conn, "31080", "Los Angeles-Long Beach-Anaheim, CA").unwrap();
        insert_cbsa(&conn, "31080", "Los Angeles-Long Beach-Anaheim, CA").unwrap();
        assert_eq!(list_cbsas(&conn).unwrap().len(), 1);
    }

    #[test]
    fn blockgroups_join_wac_counts() {
        let conn = test_db();
        insert_blockgroup(&conn, "31080", "060370000001", "POLYGON ((0 0, 1 0, 1 1, 0 0))")
            .unwrap();
        insert_wac(
            &conn,
            "31080",
            "060370000001",
            &counts(&[("c000", 100), ("cns01", 40), ("ca01", 10)]),
        )
        .unwrap();

        let rows = blockgroups_with_wac(&conn, "31080", &FilterSelection::new()).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].bg_geoid, "060370000001");
        assert_eq!(rows[0].counts.total(), 100);
        assert_eq!(rows[0].counts.get("CNS01"), 40);
        // Unwritten columns default to 0.
        assert_eq!(rows[0].counts.get("cfs05"), 0);
    }

    #[test]
    fn blockgroup_without_wac_row_served_with_zero_counts() {
        let conn = test_db();
        insert_blockgroup(&conn, "31080", "060370000002", "POLYGON ((0 0, 1 0, 1 1, 0 0))")
            .unwrap();

        let rows = blockgroups_with_wac(&conn, "31080", &FilterSelection::new()).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].bg_geoid, "060370000002");
        assert_eq!(rows[0].counts.total(), 0);
        assert_eq!(rows[0].counts.get("cns01"), 0);

        // A filtered query still demands a positive marginal.
        let selection = FilterSelection::try_from_codes(["CNS01"]).unwrap();
        assert!(blockgroups_with_wac(&conn, "31080", &selection)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn filtered_query_excludes_zero_marginals() {
        let conn = test_db();
        insert_blockgroup(&conn, "31080", "A", "POLYGON ((0 0, 1 0, 1 1, 0 0))").unwrap();
        insert_blockgroup(&conn, "31080", "B", "POLYGON ((0 0, 1 0, 1 1, 0 0))").unwrap();
        insert_wac(&conn, "31080", "A", &counts(&[("c000", 50), ("cns07", 5)])).unwrap();
        insert_wac(&conn, "31080", "B", &counts(&[("c000", 80)])).unwrap();

        let selection = FilterSelection::try_from_codes(["CNS07"]).unwrap();
        let rows = blockgroups_with_wac(&conn, "31080", &selection).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].bg_geoid, "A");
    }

    #[test]
    fn unknown_cbsa_yields_empty_rows() {
        let conn = test_db();
        let rows = blockgroups_with_wac(&conn, "99999", &FilterSelection::new()).unwrap();
        assert!(rows.is_empty());
    }
}
