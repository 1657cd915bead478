use std::sync::Arc;

use axum::routing::{get, post};
use axum::{middleware as mw, Router};

use crate::server::endpoints::{home, profile, schedule, search, section, status};
use crate::server::middleware::identity;
use crate::types::AppState;

mod endpoints;
mod middleware;
pub mod types;

/// Creates a router that can be used by `axum`.
///
/// # Parameters
/// - `app_state`: The app server state.
///
/// # Returns
/// The router.
pub fn create_router(app_state: Arc<AppState>) -> Router {
    // Router whose endpoints act on behalf of a student
    let student_router = Router::new()
        .route("/", get(home::get_home))
        .route("/profile", get(profile::get_profile))
        .route("/schedule", post(schedule::post_create_schedule))
        .route(
            "/schedule/:schedule_id",
            get(schedule::get_schedule).delete(schedule::delete_schedule),
        )
        .route(
            "/schedule/:schedule_id/add_section",
            post(schedule::post_add_section),
        )
        .route(
            "/schedule/:schedule_id/remove_section",
            post(schedule::post_remove_section),
        )
        .route(
            "/schedule/:schedule_id/change_name",
            post(schedule::post_change_name),
        )
        .route("/search", get(search::get_search))
        .route("/search/results", get(search::get_search_results))
        .route("/section/:section_id", get(section::get_section))
        .layer(mw::from_fn_with_state(
            app_state.clone(),
            identity::require_student,
        ));

    Router::new()
        .route("/health", get(status::get_health))
        .merge(student_router)
        .with_state(app_state)
}
