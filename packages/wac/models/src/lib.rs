#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! LODES WAC attribute-code catalog and filter selection types.
//!
//! This crate defines the canonical set of Workplace Area Characteristics
//! attribute codes served by the explorer. Each code is one marginal
//! breakdown of the total job count (`C000`) along a single classification
//! axis; no cross-tabulation between axes exists in the source data. The
//! catalog is static configuration: constructed at compile time and never
//! mutated.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// The column holding the total job count for a block group.
pub const TOTAL_CODE: &str = "c000";

/// Every count column stored per block group, in storage order.
///
/// The served filter catalog ([`WacCode`]) covers only the industry, age,
/// earnings, and education axes; the remaining axes (race, ethnicity, sex,
/// firm age, firm size) are stored and returned in row data but are not
/// individually filterable.
pub const ALL_COLUMNS: &[&str] = &[
    "c000", "ca01", "ca02", "ca03", "ce01", "ce02", "ce03", "cns01", "cns02", "cns03", "cns04",
    "cns05", "cns06", "cns07", "cns08", "cns09", "cns10", "cns11", "cns12", "cns13", "cns14",
    "cns15", "cns16", "cns17", "cns18", "cns19", "cns20", "cr01", "cr02", "cr03", "cr04", "cr05",
    "cr07", "ct01", "ct02", "cd01", "cd02", "cd03", "cd04", "cs01", "cs02", "cfa01", "cfa02",
    "cfa03", "cfa04", "cfa05", "cfs01", "cfs02", "cfs03", "cfs04", "cfs05",
];

/// The four filterable classification axes.
///
/// Axes are disjoint: a [`FilterSelection`] holds at most one code per axis.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum FilterCategory {
    /// NAICS industry sector (CNS01-CNS20)
    Employment,
    /// Worker age group (CA01-CA03)
    Age,
    /// Monthly earnings bracket (CE01-CE03)
    Earnings,
    /// Educational attainment (CD01-CD04)
    Education,
}

impl FilterCategory {
    /// Returns all variants of this enum.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Employment, Self::Age, Self::Earnings, Self::Education]
    }
}

/// A filterable WAC attribute code.
///
/// Parsing via [`std::str::FromStr`] is case-insensitive, matching the
/// source data convention of UPPERCASE codes in CSV headers and lowercase
/// column names in storage.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
pub enum WacCode {
    // ── Employment / NAICS sector ────────────────────────
    /// Agriculture, Forestry, Fishing and Hunting
    Cns01,
    /// Mining, Quarrying, and Oil and Gas Extraction
    Cns02,
    /// Utilities
    Cns03,
    /// Construction
    Cns04,
    /// Manufacturing
    Cns05,
    /// Wholesale Trade
    Cns06,
    /// Retail Trade
    Cns07,
    /// Transportation and Warehousing
    Cns08,
    /// Information
    Cns09,
    /// Finance and Insurance
    Cns10,
    /// Real Estate and Rental and Leasing
    Cns11,
    /// Professional, Scientific, and Technical Services
    Cns12,
    /// Management of Companies and Enterprises
    Cns13,
    /// Administrative and Support Services
    Cns14,
    /// Educational Services
    Cns15,
    /// Health Care and Social Assistance
    Cns16,
    /// Arts, Entertainment, and Recreation
    Cns17,
    /// Accommodation and Food Services
    Cns18,
    /// Other Services
    Cns19,
    /// Public Administration
    Cns20,

    // ── Age ──────────────────────────────────────────────
    /// Workers age 29 or younger
    Ca01,
    /// Workers age 30 to 54
    Ca02,
    /// Workers age 55 or older
    Ca03,

    // ── Earnings ─────────────────────────────────────────
    /// $1,250/month or less
    Ce01,
    /// $1,251-$3,333/month
    Ce02,
    /// More than $3,333/month
    Ce03,

    // ── Education ────────────────────────────────────────
    /// Less than high school
    Cd01,
    /// High school or equivalent
    Cd02,
    /// Some college or Associate degree
    Cd03,
    /// Bachelor's or advanced degree
    Cd04,
}

impl WacCode {
    /// Returns the classification axis this code belongs to.
    #[must_use]
    pub const fn category(self) -> FilterCategory {
        match self {
            Self::Cns01
            | Self::Cns02
            | Self::Cns03
            | Self::Cns04
            | Self::Cns05
            | Self::Cns06
            | Self::Cns07
            | Self::Cns08
            | Self::Cns09
            | Self::Cns10
            | Self::Cns11
            | Self::Cns12
            | Self::Cns13
            | Self::Cns14
            | Self::Cns15
            | Self::Cns16
            | Self::Cns17
            | Self::Cns18
            | Self::Cns19
            | Self::Cns20 => FilterCategory::Employment,

            Self::Ca01 | Self::Ca02 | Self::Ca03 => FilterCategory::Age,

            Self::Ce01 | Self::Ce02 | Self::Ce03 => FilterCategory::Earnings,

            Self::Cd01 | Self::Cd02 | Self::Cd03 | Self::Cd04 => FilterCategory::Education,
        }
    }

    /// Returns the lowercase storage column name for this code.
    #[must_use]
    pub const fn column(self) -> &'static str {
        match self {
            Self::Cns01 => "cns01",
            Self::Cns02 => "cns02",
            Self::Cns03 => "cns03",
            Self::Cns04 => "cns04",
            Self::Cns05 => "cns05",
            Self::Cns06 => "cns06",
            Self::Cns07 => "cns07",
            Self::Cns08 => "cns08",
            Self::Cns09 => "cns09",
            Self::Cns10 => "cns10",
            Self::Cns11 => "cns11",
            Self::Cns12 => "cns12",
            Self::Cns13 => "cns13",
            Self::Cns14 => "cns14",
            Self::Cns15 => "cns15",
            Self::Cns16 => "cns16",
            Self::Cns17 => "cns17",
            Self::Cns18 => "cns18",
            Self::Cns19 => "cns19",
            Self::Cns20 => "cns20",
            Self::Ca01 => "ca01",
            Self::Ca02 => "ca02",
            Self::Ca03 => "ca03",
            Self::Ce01 => "ce01",
            Self::Ce02 => "ce02",
            Self::Ce03 => "ce03",
            Self::Cd01 => "cd01",
            Self::Cd02 => "cd02",
            Self::Cd03 => "cd03",
            Self::Cd04 => "cd04",
        }
    }

    /// Returns the human-readable label for this code, verbatim from the
    /// LODES WAC documentation.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Cns01 => "Agriculture, Forestry, Fishing and Hunting",
            Self::Cns02 => "Mining, Quarrying, and Oil and Gas Extraction",
            Self::Cns03 => "Utilities",
            Self::Cns04 => "Construction",
            Self::Cns05 => "Manufacturing",
            Self::Cns06 => "Wholesale Trade",
            Self::Cns07 => "Retail Trade",
            Self::Cns08 => "Transportation and Warehousing",
            Self::Cns09 => "Information",
            Self::Cns10 => "Finance and Insurance",
            Self::Cns11 => "Real Estate and Rental and Leasing",
            Self::Cns12 => "Professional, Scientific, and Technical Services",
            Self::Cns13 => "Management of Companies and Enterprises",
            Self::Cns14 => "Administrative and Support Services",
            Self::Cns15 => "Educational Services",
            Self::Cns16 => "Health Care and Social Assistance",
            Self::Cns17 => "Arts, Entertainment, and Recreation",
            Self::Cns18 => "Accommodation and Food Services",
            Self::Cns19 => "Other Services",
            Self::Cns20 => "Public Administration",
            Self::Ca01 => "29 or younger",
            Self::Ca02 => "30 to 54",
            Self::Ca03 => "55 or older",
            Self::Ce01 => "$1,250/month or less",
            Self::Ce02 => "$1,251-$3,333/month",
            Self::Ce03 => ">$3,333/month",
            Self::Cd01 => "Less than high school",
            Self::Cd02 => "High school or equivalent",
            Self::Cd03 => "Some college or Associate degree",
            Self::Cd04 => "Bachelor's or advanced degree",
        }
    }

    /// Returns all codes belonging to the given axis, in catalog order.
    #[must_use]
    pub fn for_category(category: FilterCategory) -> Vec<Self> {
        Self::all()
            .iter()
            .copied()
            .filter(|code| code.category() == category)
            .collect()
    }

    /// Returns all variants of this enum.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::Cns01,
            Self::Cns02,
            Self::Cns03,
            Self::Cns04,
            Self::Cns05,
            Self::Cns06,
            Self::Cns07,
            Self::Cns08,
            Self::Cns09,
            Self::Cns10,
            Self::Cns11,
            Self::Cns12,
            Self::Cns13,
            Self::Cns14,
            Self::Cns15,
            Self::Cns16,
            Self::Cns17,
            Self::Cns18,
            Self::Cns19,
            Self::Cns20,
            Self::Ca01,
            Self::Ca02,
            Self::Ca03,
            Self::Ce01,
            Self::Ce02,
            Self::Ce03,
            Self::Cd01,
            Self::Cd02,
            Self::Cd03,
            Self::Cd04,
        ]
    }
}

/// Error returned when building a [`FilterSelection`] from caller input.
///
/// Filter codes are caller-controlled and validated strictly, unlike row
/// data, which is externally sourced and absorbed leniently.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvalidFilterError {
    /// The code is not in the served filter catalog.
    UnknownCode {
        /// The rejected code as supplied.
        code: String,
    },
    /// A second code was supplied for an axis that already has one.
    DuplicateCategory {
        /// The axis selected twice.
        category: FilterCategory,
    },
}

impl std::fmt::Display for InvalidFilterError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownCode { code } => {
                write!(f, "unknown filter code: {code}")
            }
            Self::DuplicateCategory { category } => {
                write!(f, "more than one {category} filter selected")
            }
        }
    }
}

impl std::error::Error for InvalidFilterError {}

/// An ordered set of 0-4 validated filter codes, at most one per axis.
///
/// Constructed only through [`Self::try_from_codes`] and [`Self::push`],
/// so the one-code-per-axis invariant always holds.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSelection {
    codes: Vec<WacCode>,
}

impl FilterSelection {
    /// Creates an empty selection (no filters active).
    #[must_use]
    pub const fn new() -> Self {
        Self { codes: Vec::new() }
    }

    /// Builds a selection from raw code strings, preserving input order.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidFilterError`] if any code is not in the catalog or
    /// two codes share an axis.
    pub fn try_from_codes<'a, I>(codes: I) -> Result<Self, InvalidFilterError>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut selection = Self::new();
        for raw in codes {
            let code = raw
                .parse::<WacCode>()
                .map_err(|_| InvalidFilterError::UnknownCode {
                    code: raw.to_string(),
                })?;
            selection.push(code)?;
        }
        Ok(selection)
    }

    /// Adds a code to the selection.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidFilterError::DuplicateCategory`] if the selection
    /// already holds a code from the same axis.
    pub fn push(&mut self, code: WacCode) -> Result<(), InvalidFilterError> {
        if self.codes.iter().any(|c| c.category() == code.category()) {
            return Err(InvalidFilterError::DuplicateCategory {
                category: code.category(),
            });
        }
        self.codes.push(code);
        Ok(())
    }

    /// Returns `true` if no filters are active.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    /// Returns the selected codes in insertion order.
    #[must_use]
    pub fn codes(&self) -> &[WacCode] {
        &self.codes
    }

    /// Returns the lowercase column names in insertion order.
    #[must_use]
    pub fn columns(&self) -> Vec<&'static str> {
        self.codes.iter().map(|c| c.column()).collect()
    }
}

/// Marginal count columns for one block group, keyed by lowercase code.
///
/// Lookups are case-insensitive and absent codes read as 0, which is the
/// documented policy for noisy externally sourced row data.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WacCounts(BTreeMap<String, u64>);

impl WacCounts {
    /// Creates an empty count mapping.
    #[must_use]
    pub const fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Stores a count under the lowercased code.
    pub fn insert(&mut self, code: &str, count: u64) {
        self.0.insert(code.to_ascii_lowercase(), count);
    }

    /// Looks up a count case-insensitively; absent codes read as 0.
    #[must_use]
    pub fn get(&self, code: &str) -> u64 {
        self.0
            .get(&code.to_ascii_lowercase())
            .copied()
            .unwrap_or(0)
    }

    /// Returns the total job count (`C000`), or 0 if absent.
    #[must_use]
    pub fn total(&self) -> u64 {
        self.get(TOTAL_CODE)
    }
}

impl<'a> FromIterator<(&'a str, u64)> for WacCounts {
    fn from_iter<I: IntoIterator<Item = (&'a str, u64)>>(iter: I) -> Self {
        let mut counts = Self::new();
        for (code, count) in iter {
            counts.insert(code, count);
        }
        counts
    }
}
