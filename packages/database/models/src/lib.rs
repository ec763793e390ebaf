#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Database row types for the LODES explorer.
//!
//! These types represent the shapes of data as retrieved from the SQLite
//! store. They are distinct from the API response types in
//! `lodes_explorer_server_models`, allowing the wire contract to evolve
//! independently of the storage schema.

use lodes_explorer_wac_models::WacCounts;
use serde::{Deserialize, Serialize};

/// A CBSA (Core-Based Statistical Area) row as stored in the database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CbsaRow {
    /// Database primary key.
    pub id: i64,
    /// Five-character CBSA code (e.g. "31080").
    pub cbsa_code: String,
    /// Human-readable metro area name.
    pub cbsa_name: String,
    /// Sum of `C000` over the CBSA's block groups, set at ingest.
    pub total_jobs: u64,
}

/// One block group's joined geometry and WAC counts.
///
/// This is the unit of work for feature building: the geometry text is
/// decoded and the counts aggregated per request, with nothing retained
/// between requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockGroupRow {
    /// Twelve-character block group FIPS GEOID.
    pub bg_geoid: String,
    /// Raw WKT polygon text, decoded lazily at feature-build time.
    pub geometry: String,
    /// Marginal count columns keyed by lowercase code.
    pub counts: WacCounts,
}
