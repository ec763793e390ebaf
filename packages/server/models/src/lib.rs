#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! API request and response types for the LODES explorer server.
//!
//! These types are serialized to JSON for the REST API. Wire field names
//! are snake_case, the contract the map frontend consumes. They are
//! separate from the database row types to allow independent evolution of
//! the API contract.

use lodes_explorer_database_models::CbsaRow;
use lodes_explorer_wac_models::{FilterCategory, WacCode};
use serde::{Deserialize, Serialize};

/// A CBSA as returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiCbsa {
    /// Database primary key.
    pub id: i64,
    /// Five-character CBSA code.
    pub cbsa_code: String,
    /// Human-readable metro area name.
    pub cbsa_name: String,
    /// Total jobs across the CBSA's block groups.
    pub total_jobs: u64,
}

impl From<CbsaRow> for ApiCbsa {
    fn from(row: CbsaRow) -> Self {
        Self {
            id: row.id,
            cbsa_code: row.cbsa_code,
            cbsa_name: row.cbsa_name,
            total_jobs: row.total_jobs,
        }
    }
}

/// Query parameters for the filtered block groups endpoint.
///
/// Each filter parameter carries at most one code from its axis; codes are
/// validated against the served catalog before any storage lookup.
#[derive(Debug, Clone, Deserialize)]
pub struct BlockGroupQueryParams {
    /// CBSA to query.
    pub cbsa_code: String,
    /// NAICS sector code (CNS01-CNS20).
    pub employment_code: Option<String>,
    /// Age group code (CA01-CA03).
    pub age_group: Option<String>,
    /// Earnings bracket code (CE01-CE03).
    pub earnings_bracket: Option<String>,
    /// Education level code (CD01-CD04).
    pub education_level: Option<String>,
}

impl BlockGroupQueryParams {
    /// Returns the supplied filter codes in the API's fixed axis order.
    #[must_use]
    pub fn filter_codes(&self) -> Vec<&str> {
        [
            self.employment_code.as_deref(),
            self.age_group.as_deref(),
            self.earnings_bracket.as_deref(),
            self.education_level.as_deref(),
        ]
        .into_iter()
        .flatten()
        .collect()
    }
}

/// One selectable filter option.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterOption {
    /// Attribute code (e.g. "CNS01").
    pub code: String,
    /// Human-readable label.
    pub name: String,
}

impl From<WacCode> for FilterOption {
    fn from(code: WacCode) -> Self {
        Self {
            code: code.to_string(),
            name: code.label().to_string(),
        }
    }
}

/// The full static filter catalog returned by `GET /api/filters`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterOptionsResponse {
    /// NAICS sector options (CNS01-CNS20).
    pub employment_codes: Vec<FilterOption>,
    /// Age group options (CA01-CA03).
    pub age_groups: Vec<FilterOption>,
    /// Earnings bracket options (CE01-CE03).
    pub earnings_brackets: Vec<FilterOption>,
    /// Education level options (CD01-CD04).
    pub education_levels: Vec<FilterOption>,
}

impl FilterOptionsResponse {
    /// Builds the catalog response from the static `WacCode` taxonomy.
    #[must_use]
    pub fn from_catalog() -> Self {
        let options = |category| {
            WacCode::for_category(category)
                .into_iter()
                .map(FilterOption::from)
                .collect()
        };
        Self {
            employment_codes: options(FilterCategory::Employment),
            age_groups: options(FilterCategory::Age),
            earnings_brackets: options(FilterCategory::Earnings),
            education_levels: options(FilterCategory::Education),
        }
    }
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct ApiHealth {
    /// Whether the service is healthy.
    pub healthy: bool,
    /// Service version.
    pub version: String,
}
