use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Extension, Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::info;

use super::owned_schedule;
use crate::audit::RequirementEvaluator;
use crate::error::{RegistrarError, Result};
use crate::schedule::conflicts_in;
use crate::server::types::{ApiErrorType, StudentContext};
use crate::types::AppState;

#[derive(Debug, Deserialize)]
pub struct ScheduleNameBody {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct SectionBody {
    #[serde(default)]
    pub section_id: Option<i64>,
}

fn validated_name(name: &str) -> Result<&str> {
    let name = name.trim();
    if name.is_empty() {
        return Err(RegistrarError::InvalidInput {
            message: "schedule name must not be empty".to_string(),
        });
    }
    Ok(name)
}

fn schedule_view(s: &AppState, student: &StudentContext, schedule_id: i64) -> Result<Value> {
    let schedule = owned_schedule(s, student, schedule_id)?;
    let sections = s.db.section_details(&schedule.section_ids)?;
    let conflicts = conflicts_in(&sections);
    let progress =
        RequirementEvaluator::new(&s.db).progress_for(student.profile.id, Some(schedule_id))?;

    Ok(json!({
        "schedule": schedule,
        "sections": sections,
        "conflicts": conflicts,
        "requirement_sets": progress,
    }))
}

/// GET /schedule/:schedule_id
/// Sections with meeting times, time conflicts, and requirement progress
/// counting this schedule as in progress.
pub async fn get_schedule(
    Path(schedule_id): Path<i64>,
    State(s): State<Arc<AppState>>,
    Extension(student): Extension<StudentContext>,
) -> Response {
    info!("GET /schedule/{}", schedule_id);

    match schedule_view(&s, &student, schedule_id) {
        Ok(view) => (StatusCode::OK, Json(view)).into_response(),
        Err(e) => ApiErrorType::from(e).into_response(),
    }
}

/// POST /schedule
pub async fn post_create_schedule(
    State(s): State<Arc<AppState>>,
    Extension(student): Extension<StudentContext>,
    Json(body): Json<ScheduleNameBody>,
) -> Response {
    info!("POST /schedule (profile {})", student.profile.id);

    let result = validated_name(&body.name)
        .and_then(|name| s.db.create_schedule(student.profile.id, name));

    match result {
        Ok(schedule) => (StatusCode::CREATED, Json(schedule)).into_response(),
        Err(e) => ApiErrorType::from(e).into_response(),
    }
}

/// POST /schedule/:schedule_id/add_section
pub async fn post_add_section(
    Path(schedule_id): Path<i64>,
    State(s): State<Arc<AppState>>,
    Extension(student): Extension<StudentContext>,
    Json(body): Json<SectionBody>,
) -> Response {
    info!("POST /schedule/{}/add_section {:?}", schedule_id, body.section_id);

    let result = owned_schedule(&s, &student, schedule_id).and_then(|_| {
        let section_id = body.section_id.ok_or(RegistrarError::NoSectionSpecified)?;
        s.db.add_section(schedule_id, section_id)
    });

    match result {
        Ok(schedule) => (StatusCode::OK, Json(schedule)).into_response(),
        Err(e) => ApiErrorType::from(e).into_response(),
    }
}

/// POST /schedule/:schedule_id/remove_section
/// A request that doesn't name a section, including one with no JSON body at
/// all, is rejected and leaves the schedule unchanged.
pub async fn post_remove_section(
    Path(schedule_id): Path<i64>,
    State(s): State<Arc<AppState>>,
    Extension(student): Extension<StudentContext>,
    body: Option<Json<SectionBody>>,
) -> Response {
    let section_id = body.and_then(|Json(body)| body.section_id);
    info!("POST /schedule/{}/remove_section {:?}", schedule_id, section_id);

    let result = owned_schedule(&s, &student, schedule_id)
        .and_then(|_| s.db.remove_section(schedule_id, section_id));

    match result {
        Ok(schedule) => (StatusCode::OK, Json(schedule)).into_response(),
        Err(e) => ApiErrorType::from(e).into_response(),
    }
}

/// POST /schedule/:schedule_id/change_name
pub async fn post_change_name(
    Path(schedule_id): Path<i64>,
    State(s): State<Arc<AppState>>,
    Extension(student): Extension<StudentContext>,
    Json(body): Json<ScheduleNameBody>,
) -> Response {
    info!("POST /schedule/{}/change_name", schedule_id);

    let result = owned_schedule(&s, &student, schedule_id)
        .and_then(|_| validated_name(&body.name))
        .and_then(|name| s.db.rename_schedule(schedule_id, name));

    match result {
        Ok(schedule) => (StatusCode::OK, Json(schedule)).into_response(),
        Err(e) => ApiErrorType::from(e).into_response(),
    }
}

/// DELETE /schedule/:schedule_id
pub async fn delete_schedule(
    Path(schedule_id): Path<i64>,
    State(s): State<Arc<AppState>>,
    Extension(student): Extension<StudentContext>,
) -> Response {
    info!("DELETE /schedule/{}", schedule_id);

    let result =
        owned_schedule(&s, &student, schedule_id).and_then(|_| s.db.delete_schedule(schedule_id));

    match result {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => ApiErrorType::from(e).into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validated_name() {
        assert_eq!(validated_name("  Fall 2016 ").unwrap(), "Fall 2016");
        assert!(matches!(
            validated_name("   "),
            Err(RegistrarError::InvalidInput { .. })
        ));
    }

    #[test]
    fn test_section_body_without_id() {
        let body: SectionBody = serde_json::from_str("{}").unwrap();
        assert_eq!(body.section_id, None);
    }
}
