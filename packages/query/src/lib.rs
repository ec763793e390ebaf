#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Marginal-filter aggregation and GeoJSON feature building.
//!
//! The WAC source data stores independent marginal counts per block group
//! (jobs by industry, by age, by earnings, by education) with no joint
//! distribution across axes. When several filters are active at once the
//! true intersection count is unobservable, so the aggregator takes the
//! **minimum** of the selected marginals: the intersection can never
//! exceed any single marginal, making the minimum a conservative
//! upper-bound-safe estimate. Features carry an `is_estimated` property so
//! callers can distinguish estimated values from the exact zero-filter
//! total.
//!
//! Everything here is pure and allocation-only. Rows are independent and
//! may be transformed concurrently or abandoned at any row boundary.

use geojson::{Feature, FeatureCollection};
use lodes_explorer_database_models::BlockGroupRow;
use lodes_explorer_geometry::decode_polygon_wkt;
use lodes_explorer_wac_models::{FilterSelection, WacCounts};

/// Computes the metric value for one block group under a filter selection.
///
/// With no active filters the result is the exact total (`C000`, 0 if
/// absent). With active filters the result is the minimum of the selected
/// marginal counts; absent codes contribute 0.
#[must_use]
pub fn aggregate(counts: &WacCounts, selection: &FilterSelection) -> u64 {
    if selection.is_empty() {
        return counts.total();
    }
    selection
        .codes()
        .iter()
        .map(|code| counts.get(code.column()))
        .min()
        .unwrap_or(0)
}

/// Builds the GeoJSON feature for one block group row.
///
/// Returns `None` when the row's geometry fails to decode: one malformed
/// record must not fail an entire collection response, so decode errors
/// are absorbed here (logged at debug level) rather than propagated.
#[must_use]
pub fn build_feature(row: &BlockGroupRow, selection: &FilterSelection) -> Option<Feature> {
    let polygon = match decode_polygon_wkt(&row.geometry) {
        Ok(polygon) => polygon,
        Err(e) => {
            log::debug!("Skipping block group {}: {e}", row.bg_geoid);
            return None;
        }
    };

    let metric_value = aggregate(&row.counts, selection);
    let active_filters: Vec<serde_json::Value> = selection
        .columns()
        .into_iter()
        .map(serde_json::Value::from)
        .collect();

    let mut properties = serde_json::Map::new();
    properties.insert("bg_geoid".to_string(), row.bg_geoid.clone().into());
    properties.insert("metric_value".to_string(), metric_value.into());
    properties.insert("total_jobs".to_string(), row.counts.total().into());
    properties.insert("active_filters".to_string(), active_filters.into());
    properties.insert("is_estimated".to_string(), (!selection.is_empty()).into());

    Some(Feature {
        bbox: None,
        geometry: Some(polygon.to_geojson()),
        id: None,
        properties: Some(properties),
        foreign_members: None,
    })
}

/// Builds a feature collection from rows in input order.
///
/// Rows whose geometry fails to decode are skipped; an empty input yields
/// an empty collection, never an error.
#[must_use]
pub fn build_collection<'a, I>(rows: I, selection: &FilterSelection) -> FeatureCollection
where
    I: IntoIterator<Item = &'a BlockGroupRow>,
{
    FeatureCollection {
        bbox: None,
        features: rows
            .into_iter()
            .filter_map(|row| build_feature(row, selection))
            .collect(),
        foreign_members: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(bg_geoid: &str, geometry: &str, counts: &[(&str, u64)]) -> BlockGroupRow {
        BlockGroupRow {
            bg_geoid: bg_geoid.to_string(),
            geometry: geometry.to_string(),
            counts: counts.iter().copied().collect(),
        }
    }

    fn selection(codes: &[&str]) -> FilterSelection {
        FilterSelection::try_from_codes(codes.iter().copied()).unwrap()
    }

    #[test]
    fn empty_selection_returns_the_total() {
        let counts: WacCounts = [("c000", 100), ("cns01", 40)].into_iter().collect();
        assert_eq!(aggregate(&counts, &FilterSelection::new()), 100);
    }

    #[test]
    fn empty_selection_with_absent_total_returns_zero() {
        let counts: WacCounts = [("cns01", 40)].into_iter().collect();
        assert_eq!(aggregate(&counts, &FilterSelection::new()), 0);
    }

    #[test]
    fn aggregate_is_the_minimum_of_the_selected_marginals() {
        let counts: WacCounts = [("c000", 100), ("cns01", 40), ("ca01", 10), ("ce03", 25)]
            .into_iter()
            .collect();
        assert_eq!(aggregate(&counts, &selection(&["CNS01"])), 40);
        assert_eq!(aggregate(&counts, &selection(&["CNS01", "CA01"])), 10);
        assert_eq!(
            aggregate(&counts, &selection(&["CNS01", "CA01", "CE03"])),
            10
        );

        // Never exceeds any single marginal.
        let result = aggregate(&counts, &selection(&["CNS01", "CE03"]));
        assert!(result <= 40 && result <= 25);
    }

    #[test]
    fn absent_selected_code_contributes_zero() {
        let counts: WacCounts = [("c000", 100), ("cns01", 40)].into_iter().collect();
        assert_eq!(aggregate(&counts, &selection(&["CNS01", "CD04"])), 0);
    }

    #[test]
    fn feature_carries_metric_total_and_active_filters() {
        let row = row(
            "A",
            "POLYGON ((0 0,1 0,1 1,0 1,0 0))",
            &[("c000", 100), ("cns01", 40), ("ca01", 10)],
        );
        let feature = build_feature(&row, &selection(&["CNS01", "CA01"])).unwrap();

        let properties = feature.properties.unwrap();
        assert_eq!(properties["bg_geoid"], "A");
        assert_eq!(properties["metric_value"], 10);
        assert_eq!(properties["total_jobs"], 100);
        assert_eq!(
            properties["active_filters"],
            serde_json::json!(["cns01", "ca01"])
        );
        assert_eq!(properties["is_estimated"], true);

        match feature.geometry.unwrap().value {
            geojson::Value::Polygon(rings) => assert_eq!(rings[0].len(), 5),
            other => panic!("expected Polygon geometry, got {other:?}"),
        }
    }

    #[test]
    fn unfiltered_feature_is_not_estimated() {
        let row = row("A", "POLYGON ((0 0,1 0,1 1,0 0))", &[("c000", 7)]);
        let feature = build_feature(&row, &FilterSelection::new()).unwrap();
        let properties = feature.properties.unwrap();
        assert_eq!(properties["metric_value"], 7);
        assert_eq!(properties["is_estimated"], false);
        assert_eq!(properties["active_filters"], serde_json::json!([]));
    }

    #[test]
    fn malformed_geometry_skips_the_row() {
        let row = row("bad", "not wkt at all", &[("c000", 100)]);
        assert!(build_feature(&row, &FilterSelection::new()).is_none());
    }

    #[test]
    fn build_is_idempotent() {
        let row = row(
            "A",
            "POLYGON ((0 0,1 0,1 1,0 0))",
            &[("c000", 100), ("ce01", 3)],
        );
        let sel = selection(&["CE01"]);
        let first = serde_json::to_value(build_feature(&row, &sel).unwrap()).unwrap();
        let second = serde_json::to_value(build_feature(&row, &sel).unwrap()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn collection_preserves_input_order_and_skips_bad_rows() {
        let rows = vec![
            row("A", "POLYGON ((0 0,1 0,1 1,0 0))", &[("c000", 1)]),
            row("bad", "POLYGON ((0 0,1 1))", &[("c000", 2)]),
            row("B", "POLYGON ((2 2,3 2,3 3,2 2))", &[("c000", 3)]),
        ];
        let collection = build_collection(&rows, &FilterSelection::new());

        let ids: Vec<&serde_json::Value> = collection
            .features
            .iter()
            .map(|f| &f.properties.as_ref().unwrap()["bg_geoid"])
            .collect();
        assert_eq!(ids, vec!["A", "B"]);
    }

    #[test]
    fn empty_input_yields_empty_collection() {
        let rows: Vec<BlockGroupRow> = Vec::new();
        let collection = build_collection(&rows, &FilterSelection::new());
        assert!(collection.features.is_empty());
    }
}
