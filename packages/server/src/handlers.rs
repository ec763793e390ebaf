//! HTTP handler functions for the LODES explorer API.

use actix_web::{HttpResponse, web};
use lodes_explorer_database::queries;
use lodes_explorer_server_models::{
    ApiCbsa, ApiHealth, BlockGroupQueryParams, FilterOptionsResponse,
};
use lodes_explorer_wac_models::FilterSelection;

use crate::AppState;

/// `GET /health`
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(ApiHealth {
        healthy: true,
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// `GET /api/`
///
/// Endpoint index, so a bare `/api/` request is useful instead of a 404.
pub async fn api_index() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "message": "LODES Explorer API",
        "endpoints": [
            "/api/cbsas",
            "/api/cbsa/{cbsa_code}",
            "/api/blockgroups/{cbsa_code}",
            "/api/blockgroups/filtered",
            "/api/filters",
        ],
    }))
}

/// `GET /api/filters`
///
/// Returns the static filter catalog for building a selection UI.
pub async fn filters() -> HttpResponse {
    HttpResponse::Ok().json(FilterOptionsResponse::from_catalog())
}

/// `GET /api/cbsas`
///
/// Lists all available CBSAs ordered by code.
pub async fn cbsas(state: web::Data<AppState>) -> HttpResponse {
    let conn = state.pool.acquire();
    match queries::list_cbsas(&conn) {
        Ok(rows) => {
            let cbsas: Vec<ApiCbsa> = rows.into_iter().map(ApiCbsa::from).collect();
            HttpResponse::Ok().json(cbsas)
        }
        Err(e) => {
            log::error!("Failed to list CBSAs: {e}");
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Failed to list CBSAs"
            }))
        }
    }
}

/// `GET /api/cbsa/{cbsa_code}`
pub async fn cbsa(state: web::Data<AppState>, path: web::Path<String>) -> HttpResponse {
    let cbsa_code = path.into_inner();
    let conn = state.pool.acquire();
    match queries::get_cbsa(&conn, &cbsa_code) {
        Ok(Some(row)) => HttpResponse::Ok().json(ApiCbsa::from(row)),
        Ok(None) => HttpResponse::NotFound().json(serde_json::json!({
            "error": "CBSA not found"
        })),
        Err(e) => {
            log::error!("Failed to query CBSA {cbsa_code}: {e}");
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Failed to query CBSA"
            }))
        }
    }
}

/// `GET /api/blockgroups/{cbsa_code}`
///
/// Returns every block group in the CBSA as a GeoJSON feature collection
/// with the unfiltered total as the metric. A CBSA with no block groups
/// yields an empty collection rather than a 404, which keeps the frontend
/// handling uniform.
pub async fn blockgroups(state: web::Data<AppState>, path: web::Path<String>) -> HttpResponse {
    let cbsa_code = path.into_inner();
    respond_with_features(&state, &cbsa_code, &FilterSelection::new())
}

/// `GET`/`POST /api/blockgroups/filtered`
///
/// Returns block groups filtered by up to one code per axis. Filter codes
/// are caller-controlled, so an unknown code is a 400, unlike malformed
/// row data, which is silently skipped during feature building.
pub async fn blockgroups_filtered(
    state: web::Data<AppState>,
    params: web::Query<BlockGroupQueryParams>,
) -> HttpResponse {
    let selection = match FilterSelection::try_from_codes(params.filter_codes()) {
        Ok(selection) => selection,
        Err(e) => {
            return HttpResponse::BadRequest().json(serde_json::json!({
                "error": e.to_string()
            }));
        }
    };

    respond_with_features(&state, &params.cbsa_code, &selection)
}

fn respond_with_features(
    state: &web::Data<AppState>,
    cbsa_code: &str,
    selection: &FilterSelection,
) -> HttpResponse {
    let conn = state.pool.acquire();
    match queries::blockgroups_with_wac(&conn, cbsa_code, selection) {
        Ok(rows) => {
            let collection = lodes_explorer_query::build_collection(&rows, selection);
            HttpResponse::Ok().json(collection)
        }
        Err(e) => {
            log::error!("Failed to query block groups for {cbsa_code}: {e}");
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Failed to query block groups"
            }))
        }
    }
}
