use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tracing::info;

/// GET /health
pub async fn get_health() -> Response {
    info!("GET /health");
    (StatusCode::OK, Json(json!({ "status": "ok" }))).into_response()
}
