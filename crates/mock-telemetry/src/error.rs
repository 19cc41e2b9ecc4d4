//! Error types for the mock tracking service.
//!
//! [`MockError`] implements [`axum::response::IntoResponse`] so handlers can
//! return `Result<…, MockError>` directly. Every input problem is reported
//! the way the real service does: HTTP 422 with a structured body.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use telemetry_models::{AppId, HttpValidationError, NextStep, ProjectId, ValidationError};

/// Errors a mock handler can produce.
#[derive(Debug, thiserror::Error)]
pub enum MockError {
    /// No application with this id exists in the project.
    #[error("unknown application {app} in project {project}")]
    UnknownApplication {
        /// Project that was searched.
        project: ProjectId,
        /// Application that was not found.
        app: AppId,
    },

    /// The workflow is not waiting for this kind of input.
    #[error("application is waiting for {expected}, not {got}")]
    WrongStep {
        /// Step the application is in (`finished` when done).
        expected: String,
        /// Step the request tried to perform.
        got: NextStep,
    },

    /// A request parameter failed validation.
    #[error("{0}")]
    Invalid(ValidationError),

    /// The JSON body could not be decoded.
    #[error("invalid body: {0}")]
    Body(#[from] JsonRejection),
}

impl MockError {
    fn detail(&self) -> ValidationError {
        match self {
            Self::UnknownApplication { .. } => {
                ValidationError::field("path", "app_id", self.to_string(), "value_error.missing")
            }
            Self::WrongStep { .. } => {
                ValidationError::field("path", "app_id", self.to_string(), "value_error.state")
            }
            Self::Invalid(detail) => detail.clone(),
            Self::Body(rejection) => {
                ValidationError::field("body", "json", rejection.body_text(), "value_error.json")
            }
        }
    }
}

impl IntoResponse for MockError {
    fn into_response(self) -> Response {
        let body: HttpValidationError = self.detail().into();
        tracing::warn!(error = %self, "request rejected");
        (StatusCode::UNPROCESSABLE_ENTITY, Json(body)).into_response()
    }
}
