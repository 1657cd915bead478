use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::sync::Arc;
use tracing::info;

use crate::search::{search_sections, SearchParams};
use crate::server::types::ApiErrorType;
use crate::types::AppState;

/// GET /search
/// Departments available to the search form.
pub async fn get_search(State(s): State<Arc<AppState>>) -> Response {
    info!("GET /search");

    match s.db.list_departments() {
        Ok(departments) => {
            (StatusCode::OK, Json(json!({ "departments": departments }))).into_response()
        }
        Err(e) => ApiErrorType::from(e).into_response(),
    }
}

/// GET /search/results
/// Runs the section filter chain. Parameters that can't be parsed are ignored.
pub async fn get_search_results(
    Query(params): Query<SearchParams>,
    State(s): State<Arc<AppState>>,
) -> Response {
    info!("GET /search/results {:?}", params);

    match search_sections(&s.db, &params) {
        Ok(results) => (
            StatusCode::OK,
            Json(json!({
                "count": results.len(),
                "results": results,
            })),
        )
            .into_response(),
        Err(e) => ApiErrorType::from(e).into_response(),
    }
}
