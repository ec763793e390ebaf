#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! WKT polygon decoding for block group boundaries.
//!
//! Block group geometries arrive as free-form `POLYGON` well-known-text
//! strings inside externally sourced CSV data, so the decoder treats its
//! input as untrusted: tokens that fail to parse are dropped rather than
//! raised, and only structurally hopeless input is an error. Decoding is
//! pure and holds no shared state, so rows may be decoded concurrently in
//! any order.
//!
//! Known limitation: the ring is extracted between the first `((` and the
//! last `))`, so interior rings or multi-polygon WKT are flattened into a
//! single ring instead of being rejected. The upstream TIGER block group
//! extracts contain only single-ring polygons.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur while decoding a WKT polygon.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// The text does not begin with the literal `POLYGON` tag.
    #[error("WKT text does not begin with a POLYGON tag")]
    MissingTag,

    /// No `((` ... `))` coordinate group was found.
    #[error("no outer ring found in WKT text")]
    MissingRing,

    /// Fewer than 3 coordinate pairs survived tokenization.
    #[error("outer ring has {found} coordinate pair(s), need at least 3")]
    TooFewVertices {
        /// Number of valid pairs found.
        found: usize,
    },
}

/// A decoded polygon: one outer ring of `[lon, lat]` pairs.
///
/// The ring is kept exactly as decoded: not auto-closed, not checked for
/// self-intersection, coordinates passed through verbatim as decimal
/// degrees.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Polygon {
    /// Ordered outer ring coordinates as `[lon, lat]`.
    pub exterior: Vec<[f64; 2]>,
}

impl Polygon {
    /// Converts this polygon into a `GeoJSON` geometry
    /// (`{type: "Polygon", coordinates: [[[lon, lat], ...]]}`).
    #[must_use]
    pub fn to_geojson(&self) -> geojson::Geometry {
        let ring: Vec<Vec<f64>> = self.exterior.iter().map(|pair| pair.to_vec()).collect();
        geojson::Geometry::new(geojson::Value::Polygon(vec![ring]))
    }
}

/// Decodes a WKT `POLYGON` string into a [`Polygon`].
///
/// The input is trimmed, must begin with the case-sensitive literal
/// `POLYGON`, and must contain a `((` ... `))` coordinate group. The group
/// is split on commas into candidate pairs; each pair must yield at least
/// two whitespace-separated fields whose first two parse as finite decimal
/// numbers (longitude then latitude). Pairs that fail to parse are dropped
/// silently to tolerate minor format noise.
///
/// # Errors
///
/// Returns [`DecodeError`] if the tag is missing, no coordinate group is
/// found, or fewer than 3 valid pairs remain.
pub fn decode_polygon_wkt(wkt: &str) -> Result<Polygon, DecodeError> {
    let wkt = wkt.trim();
    let rest = wkt.strip_prefix("POLYGON").ok_or(DecodeError::MissingTag)?;

    let start = rest.find("((").ok_or(DecodeError::MissingRing)? + 2;
    let end = rest.rfind("))").ok_or(DecodeError::MissingRing)?;
    if end < start {
        return Err(DecodeError::MissingRing);
    }

    let mut exterior = Vec::new();
    for token in rest[start..end].split(',') {
        let mut fields = token.split_whitespace();
        let (Some(lon), Some(lat)) = (fields.next(), fields.next()) else {
            continue;
        };
        let (Ok(lon), Ok(lat)) = (lon.parse::<f64>(), lat.parse::<f64>()) else {
            continue;
        };
        if !lon.is_finite() || !lat.is_finite() {
            continue;
        }
        exterior.push([lon, lat]);
    }

    if exterior.len() < 3 {
        return Err(DecodeError::TooFewVertices {
            found: exterior.len(),
        });
    }

    Ok(Polygon { exterior })
}
