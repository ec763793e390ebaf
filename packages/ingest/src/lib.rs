#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! CSV ingestion for the LODES explorer.
//!
//! Loads per-CBSA block group geometry extracts
//! (`{cbsa}_blockgroups2023.csv`: `bgrp`, `geometry` columns) and WAC
//! count extracts (`{cbsa}_all2023.csv`: `bgrp` plus UPPERCASE count
//! columns) into the SQLite store. Source rows are noisy external data:
//! missing files are skipped with a log line, and missing or unparsable
//! count cells load as 0.

use std::path::Path;

use lodes_explorer_database::{DbError, queries};
use lodes_explorer_wac_models::{ALL_COLUMNS, TOTAL_CODE, WacCounts};
use rusqlite::Connection;
use thiserror::Error;

/// The CBSAs served by the explorer, keyed by OMB CBSA code.
pub const CBSA_MAPPING: &[(&str, &str)] = &[
    ("31080", "Los Angeles-Long Beach-Anaheim, CA"),
    ("41860", "San Francisco-Oakland-Fremont, CA"),
    ("47900", "Washington-Arlington-Alexandria, DC-VA-MD-WV"),
];

/// Errors that can occur during ingestion.
#[derive(Debug, Error)]
pub enum IngestError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] DbError),

    /// CSV parsing failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// A required column is missing from a source file.
    #[error("missing column '{column}' in {file}")]
    MissingColumn {
        /// Source file name.
        file: String,
        /// The absent column.
        column: String,
    },
}

/// Seeds the static CBSA mapping.
///
/// # Errors
///
/// Returns an [`IngestError`] if an insert fails.
pub fn seed_cbsas(conn: &Connection) -> Result<(), IngestError> {
    for &(code, name) in CBSA_MAPPING {
        queries::insert_cbsa(conn, code, name)?;
    }
    log::info!("Seeded {} CBSAs", CBSA_MAPPING.len());
    Ok(())
}

/// Loads block group geometries for every configured CBSA from `data_dir`.
///
/// Returns the number of rows loaded. Missing files are skipped.
///
/// # Errors
///
/// Returns an [`IngestError`] if a present file cannot be parsed or an
/// insert fails.
pub fn load_geometries(conn: &Connection, data_dir: &Path) -> Result<u64, IngestError> {
    let mut total = 0;
    for &(cbsa_code, _) in CBSA_MAPPING {
        let file = data_dir.join(format!("{cbsa_code}_blockgroups2023.csv"));
        if !file.exists() {
            log::info!("Skipping {} (not found)", file.display());
            continue;
        }
        let reader = csv::Reader::from_path(&file)?;

        let count = load_geometry_csv(conn, cbsa_code, reader, &file.display().to_string())?;
        log::info!("Loaded {count} geometries for CBSA {cbsa_code}");
        total += count;
    }
    Ok(total)
}

/// Loads WAC count rows for every configured CBSA from `data_dir`,
/// updating each CBSA's `total_jobs` with the sum of its `C000` column.
///
/// Returns the number of rows loaded. Missing files are skipped.
///
/// # Errors
///
/// Returns an [`IngestError`] if a present file cannot be parsed or an
/// insert fails.
pub fn load_wac(conn: &Connection, data_dir: &Path) -> Result<u64, IngestError> {
    let mut total = 0;
    for &(cbsa_code, _) in CBSA_MAPPING {
        let file = data_dir.join(format!("{cbsa_code}_all2023.csv"));
        if !file.exists() {
            log::info!("Skipping {} (not found)", file.display());
            continue;
        }
        let reader = csv::Reader::from_path(&file)?;

        let count = load_wac_csv(conn, cbsa_code, reader, &file.display().to_string())?;
        log::info!("Loaded {count} WAC records for CBSA {cbsa_code}");
        total += count;
    }
    Ok(total)
}

fn load_geometry_csv<R: std::io::Read>(
    conn: &Connection,
    cbsa_code: &str,
    mut reader: csv::Reader<R>,
    file: &str,
) -> Result<u64, IngestError> {
    let headers = reader.headers()?.clone();
    let geoid_idx = column_index(&headers, "bgrp").ok_or_else(|| IngestError::MissingColumn {
        file: file.to_string(),
        column: "bgrp".to_string(),
    })?;
    let geometry_idx =
        column_index(&headers, "geometry").ok_or_else(|| IngestError::MissingColumn {
            file: file.to_string(),
            column: "geometry".to_string(),
        })?;

    let mut count = 0;
    for record in reader.records() {
        let record = record?;
        let (Some(bg_geoid), Some(geometry)) = (record.get(geoid_idx), record.get(geometry_idx))
        else {
            continue;
        };
        queries::insert_blockgroup(conn, cbsa_code, bg_geoid.trim(), geometry.trim())?;
        count += 1;
    }
    Ok(count)
}

fn load_wac_csv<R: std::io::Read>(
    conn: &Connection,
    cbsa_code: &str,
    mut reader: csv::Reader<R>,
    file: &str,
) -> Result<u64, IngestError> {
    let headers = reader.headers()?.clone();
    let geoid_idx = column_index(&headers, "bgrp").ok_or_else(|| IngestError::MissingColumn {
        file: file.to_string(),
        column: "bgrp".to_string(),
    })?;

    // Source files carry the count columns in UPPERCASE.
    let count_columns: Vec<(&str, Option<usize>)> = ALL_COLUMNS
        .iter()
        .map(|&col| (col, column_index(&headers, &col.to_ascii_uppercase())))
        .collect();

    let mut count = 0;
    let mut total_jobs: u64 = 0;
    for record in reader.records() {
        let record = record?;
        let Some(bg_geoid) = record.get(geoid_idx) else {
            continue;
        };

        let mut counts = WacCounts::new();
        for &(col, idx) in &count_columns {
            let value = idx
                .and_then(|i| record.get(i))
                .map_or(0, parse_count);
            counts.insert(col, value);
        }

        total_jobs += counts.get(TOTAL_CODE);
        queries::insert_wac(conn, cbsa_code, bg_geoid.trim(), &counts)?;
        count += 1;
    }

    queries::update_cbsa_total_jobs(conn, cbsa_code, total_jobs)?;
    Ok(count)
}

fn column_index(headers: &csv::StringRecord, name: &str) -> Option<usize> {
    headers.iter().position(|h| h.trim() == name)
}

/// Parses one count cell; anything that is not a non-negative finite
/// number loads as 0.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn parse_count(cell: &str) -> u64 {
    let cell = cell.trim();
    if let Ok(value) = cell.parse::<u64>() {
        return value;
    }
    // Some extracts carry counts as floats (e.g. "40.0").
    match cell.parse::<f64>() {
        Ok(value) if value.is_finite() && value >= 0.0 => value.trunc() as u64,
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lodes_explorer_database::run_migrations;
    use lodes_explorer_wac_models::FilterSelection;

    fn test_db() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        conn
    }

    fn csv_reader(data: &str) -> csv::Reader<&[u8]> {
        csv::Reader::from_reader(data.as_bytes())
    }

    #[test]
    fn parse_count_absorbs_noise() {
        assert_eq!(parse_count("42"), 42);
        assert_eq!(parse_count(" 42 "), 42);
        assert_eq!(parse_count("40.0"), 40);
        assert_eq!(parse_count(""), 0);
        assert_eq!(parse_count("n/a"), 0);
        assert_eq!(parse_count("-5"), 0);
        assert_eq!(parse_count("nan"), 0);
    }

    #[test]
    fn geometry_csv_loads_rows() {
        let conn = test_db();
        let reader = csv_reader(
            "bgrp,geometry\n060370000001,\"POLYGON ((0 0, 1 0, 1 1, 0 0))\"\n060370000002,\"POLYGON ((2 2, 3 2, 3 3, 2 2))\"\n",
        );
        let count = load_geometry_csv(&conn, "31080", reader, "test.csv").unwrap();
        assert_eq!(count, 2);
    }

    #[test]
    fn geometry_csv_requires_headers() {
        let conn = test_db();
        let reader = csv_reader("geoid,wkt\nA,POLYGON EMPTY\n");
        let err = load_geometry_csv(&conn, "31080", reader, "test.csv").unwrap_err();
        assert!(matches!(err, IngestError::MissingColumn { column, .. } if column == "bgrp"));
    }

    #[test]
    fn wac_csv_loads_counts_and_updates_total_jobs() {
        let conn = test_db();
        seed_cbsas(&conn).unwrap();
        let reader = csv_reader(
            "bgrp,C000,CNS01,CA01,CE03\nA,100,40,10,25\nB,50,,garbage,5\n",
        );
        let count = load_wac_csv(&conn, "31080", reader, "test.csv").unwrap();
        assert_eq!(count, 2);

        // Geometry rows are needed for the join.
        queries::insert_blockgroup(&conn, "31080", "A", "POLYGON ((0 0, 1 0, 1 1, 0 0))").unwrap();
        queries::insert_blockgroup(&conn, "31080", "B", "POLYGON ((0 0, 1 0, 1 1, 0 0))").unwrap();

        let rows = queries::blockgroups_with_wac(&conn, "31080", &FilterSelection::new()).unwrap();
        assert_eq!(rows.len(), 2);
        let a = rows.iter().find(|r| r.bg_geoid == "A").unwrap();
        assert_eq!(a.counts.get("cns01"), 40);
        let b = rows.iter().find(|r| r.bg_geoid == "B").unwrap();
        assert_eq!(b.counts.get("ca01"), 0);
        assert_eq!(b.counts.get("ce03"), 5);

        let la = queries::get_cbsa(&conn, "31080").unwrap().unwrap();
        assert_eq!(la.total_jobs, 150);
    }

    #[test]
    fn wac_csv_defaults_absent_columns_to_zero() {
        let conn = test_db();
        seed_cbsas(&conn).unwrap();
        let reader = csv_reader("bgrp,C000\nA,10\n");
        load_wac_csv(&conn, "31080", reader, "test.csv").unwrap();

        queries::insert_blockgroup(&conn, "31080", "A", "POLYGON ((0 0, 1 0, 1 1, 0 0))").unwrap();
        let rows = queries::blockgroups_with_wac(&conn, "31080", &FilterSelection::new()).unwrap();
        assert_eq!(rows[0].counts.get("cfs05"), 0);
        assert_eq!(rows[0].counts.total(), 10);
    }
}
