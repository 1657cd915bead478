use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::{Extension, Json};
use serde_json::json;
use std::sync::Arc;
use tracing::info;

use crate::schedule::most_recent_schedule;
use crate::server::types::{ApiErrorType, StudentContext};
use crate::types::AppState;

/// GET /
/// The student's schedules, with the most recently updated one selected.
pub async fn get_home(
    State(s): State<Arc<AppState>>,
    Extension(student): Extension<StudentContext>,
) -> Response {
    info!("GET / (profile {})", student.profile.id);

    match s.db.list_schedules_for(student.profile.id) {
        Ok(schedules) => {
            let current = most_recent_schedule(&schedules).cloned();
            (
                StatusCode::OK,
                Json(json!({
                    "profile": student.profile,
                    "current_schedule": current,
                    "schedules": schedules,
                })),
            )
                .into_response()
        }
        Err(e) => ApiErrorType::from(e).into_response(),
    }
}
