// src/error.rs

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::models::question::ExamType;

/// Global Application Error Enum.
/// Centralizes error handling and mapping to HTTP responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    // 500 Internal Server Error
    #[error("internal server error: {0}")]
    InternalServerError(String),

    // 400 Bad Request
    #[error("{0}")]
    BadRequest(String),

    // 401 Unauthorized
    #[error("{0}")]
    AuthError(String),

    // 404 Not Found
    #[error("{0}")]
    NotFound(String),

    // 409 Conflict (e.g., duplicate username)
    #[error("{0}")]
    Conflict(String),

    #[error("invalid exam type '{0}'")]
    InvalidExamType(String),

    #[error("no questions available for {0}")]
    NoQuestionsAvailable(ExamType),

    /// The user has no test in progress.
    #[error("no active test")]
    NoActiveSession,

    #[error("invalid submission: {0}")]
    InvalidSubmission(String),

    // 403 Forbidden (cross-user access)
    #[error("{0}")]
    Forbidden(String),

    /// Scoring a test with zero questions.
    #[error("score is undefined for a test without questions")]
    DivisionUndefined,

    /// The result transaction was rolled back.
    #[error("failed to persist test result: {0}")]
    PersistenceFailure(String),
}

impl AppError {
    /// The view a client should fall back to after this error, if any.
    pub fn redirect(&self) -> Option<&'static str> {
        match self {
            AppError::InvalidExamType(_)
            | AppError::NoQuestionsAvailable(_)
            | AppError::NoActiveSession => Some("/select_test"),
            AppError::Forbidden(_) | AppError::DivisionUndefined => Some("/dashboard"),
            _ => None,
        }
    }
}

/// Implements `IntoResponse` for `AppError`.
/// Converts the error into a JSON response with appropriate HTTP status code.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let redirect = self.redirect();
        let (status, error_message) = match &self {
            AppError::InternalServerError(msg) => {
                tracing::error!("Internal Server Error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal Server Error".to_string(),
                )
            }
            AppError::PersistenceFailure(msg) => {
                tracing::error!("Result persistence failed: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Could not save the test result. Your answers are kept, please try finishing again."
                        .to_string(),
                )
            }
            AppError::DivisionUndefined => {
                tracing::error!("Attempted to score an empty test");
                (StatusCode::INTERNAL_SERVER_ERROR, self.to_string())
            }
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::AuthError(msg) => (StatusCode::UNAUTHORIZED, msg.clone()),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg.clone()),
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg.clone()),
            AppError::InvalidExamType(_) | AppError::InvalidSubmission(_) => {
                (StatusCode::BAD_REQUEST, self.to_string())
            }
            AppError::NoQuestionsAvailable(_) => (StatusCode::NOT_FOUND, self.to_string()),
            AppError::NoActiveSession => (StatusCode::CONFLICT, self.to_string()),
        };

        let body = match redirect {
            Some(path) => json!({ "error": error_message, "redirect": path }),
            None => json!({ "error": error_message }),
        };

        (status, Json(body)).into_response()
    }
}

/// Converts `sqlx::Error` into `AppError::InternalServerError`.
/// Allows using `?` operator on database queries.
impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::InternalServerError(err.to_string())
    }
}
