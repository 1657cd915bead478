use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use tracing::error;

use crate::error::RegistrarError;
use crate::models::StudentProfile;

/// The authenticated student, inserted as a request extension by the identity middleware.
#[derive(Debug, Clone)]
pub struct StudentContext {
    pub profile: StudentProfile,
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    context: Option<&'a str>,
}

/// An error response: status code, short message, and optional details.
#[derive(Debug)]
pub struct ApiErrorType {
    status: StatusCode,
    message: String,
    context: Option<String>,
}

impl From<(StatusCode, &str, Option<String>)> for ApiErrorType {
    fn from((status, message, context): (StatusCode, &str, Option<String>)) -> Self {
        Self {
            status,
            message: message.to_string(),
            context,
        }
    }
}

impl From<RegistrarError> for ApiErrorType {
    fn from(e: RegistrarError) -> Self {
        let (status, message) = if e.is_not_found() {
            (StatusCode::NOT_FOUND, "Not found")
        } else if e.is_client_error() {
            (StatusCode::BAD_REQUEST, "Invalid request")
        } else {
            error!(error = %e, "Registrar store failure");
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
        };

        ApiErrorType::from((status, message, Some(e.to_string())))
    }
}

impl IntoResponse for ApiErrorType {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: &self.message,
            context: self.context.as_deref(),
        };
        (self.status, Json(body)).into_response()
    }
}
