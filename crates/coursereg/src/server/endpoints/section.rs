use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::info;

use crate::error::Result;
use crate::server::types::ApiErrorType;
use crate::types::AppState;

fn section_view(s: &AppState, section_id: i64) -> Result<Value> {
    let detail = s.db.section_detail(section_id)?;
    let course_id = detail.course.id;
    let meeting_days: Vec<&str> = detail.meetings.iter().map(|m| m.day_name()).collect();

    Ok(json!({
        "open_seats": detail.section.open_seats(),
        "meeting_days": meeting_days,
        "section": detail,
        "prerequisites": s.db.prerequisites_of(course_id)?,
        "also_offered_as": s.db.cross_listings_of(course_id)?,
    }))
}

/// GET /section/:section_id
pub async fn get_section(
    Path(section_id): Path<i64>,
    State(s): State<Arc<AppState>>,
) -> Response {
    info!("GET /section/{}", section_id);

    match section_view(&s, section_id) {
        Ok(view) => (StatusCode::OK, Json(view)).into_response(),
        Err(e) => ApiErrorType::from(e).into_response(),
    }
}
