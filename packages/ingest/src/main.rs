#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! CLI entry point for the LODES data ingestion tool.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use lodes_explorer_database::{open, run_migrations};
use lodes_explorer_ingest::{load_geometries, load_wac, seed_cbsas};

#[derive(Parser)]
#[command(name = "lodes_explorer_ingest", about = "LODES data ingestion tool")]
struct Cli {
    /// Path to the SQLite database file.
    #[arg(long, default_value = "lodes.db")]
    db: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the database tables
    Migrate,
    /// Seed the static CBSA mapping
    Cbsas,
    /// Load block group geometry CSV files
    Geometries {
        /// Directory holding `{cbsa}_blockgroups2023.csv` files
        #[arg(long, default_value = ".")]
        data_dir: PathBuf,
    },
    /// Load WAC count CSV files
    Wac {
        /// Directory holding `{cbsa}_all2023.csv` files
        #[arg(long, default_value = ".")]
        data_dir: PathBuf,
    },
    /// Migrate, seed CBSAs, then load geometries and WAC data
    All {
        /// Directory holding the CSV files
        #[arg(long, default_value = ".")]
        data_dir: PathBuf,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init();
    let cli = Cli::parse();

    let conn = open(&cli.db)?;
    run_migrations(&conn)?;

    match cli.command {
        Commands::Migrate => {
            log::info!("Migrations complete");
        }
        Commands::Cbsas => {
            seed_cbsas(&conn)?;
        }
        Commands::Geometries { data_dir } => {
            let count = load_geometries(&conn, &data_dir)?;
            log::info!("Geometry loading complete: {count} rows");
        }
        Commands::Wac { data_dir } => {
            let count = load_wac(&conn, &data_dir)?;
            log::info!("WAC loading complete: {count} rows");
        }
        Commands::All { data_dir } => {
            seed_cbsas(&conn)?;
            let geometries = load_geometries(&conn, &data_dir)?;
            let wac = load_wac(&conn, &data_dir)?;
            log::info!("Data loading complete: {geometries} geometries, {wac} WAC rows");
        }
    }

    Ok(())
}
