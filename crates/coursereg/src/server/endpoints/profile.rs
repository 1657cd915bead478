use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::{Extension, Json};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::info;

use crate::audit::RequirementEvaluator;
use crate::error::Result;
use crate::schedule::most_recent_schedule;
use crate::server::types::{ApiErrorType, StudentContext};
use crate::types::AppState;

fn profile_view(s: &AppState, student: &StudentContext) -> Result<Value> {
    let profile_id = student.profile.id;
    let schedules = s.db.list_schedules_for(profile_id)?;
    let schedule_id = most_recent_schedule(&schedules).map(|sc| sc.id);

    let completed = s.db.completed_courses_for(profile_id)?;
    let progress = RequirementEvaluator::new(&s.db).progress_for(profile_id, schedule_id)?;

    Ok(json!({
        "profile": student.profile,
        "majors": s.db.declared_majors_for(profile_id)?,
        "completed_courses": completed,
        "schedule_id": schedule_id,
        "requirement_sets": progress,
    }))
}

/// GET /profile
/// Declared programs, completed courses, and requirement progress against
/// the most recently updated schedule.
pub async fn get_profile(
    State(s): State<Arc<AppState>>,
    Extension(student): Extension<StudentContext>,
) -> Response {
    info!("GET /profile (profile {})", student.profile.id);

    match profile_view(&s, &student) {
        Ok(view) => (StatusCode::OK, Json(view)).into_response(),
        Err(e) => ApiErrorType::from(e).into_response(),
    }
}
