use std::sync::Arc;

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Redirect, Response};
use tracing::{debug, warn};

use crate::server::types::{ApiErrorType, StudentContext};
use crate::types::AppState;

/// Resolves the student named by the identity header and attaches a
/// [`StudentContext`] to the request. Requests without a known student are
/// redirected to the login page.
pub async fn require_student(
    State(s): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Response {
    let header = s.config.identity_header.as_str();
    let profile_id = req
        .headers()
        .get(header)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<i64>().ok());

    let Some(profile_id) = profile_id else {
        debug!(uri = %req.uri(), "No student identity, redirecting to login");
        return Redirect::to(&s.config.login_url).into_response();
    };

    match s.db.get_profile(profile_id) {
        Ok(profile) => {
            req.extensions_mut().insert(StudentContext { profile });
            next.run(req).await
        }
        Err(e) if e.is_not_found() => {
            warn!(profile_id, "Unknown student identity, redirecting to login");
            Redirect::to(&s.config.login_url).into_response()
        }
        Err(e) => ApiErrorType::from(e).into_response(),
    }
}
