// src/handlers/test_session.rs

use std::sync::Arc;

use axum::{
    Extension, Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};
use serde_json::json;

use crate::{
    error::AppError,
    models::{
        question::ExamType,
        test_session::{FinishOutcome, SubmitAnswerRequest},
    },
    services::TestSessionService,
    utils::jwt::Claims,
};

/// Lists the exam types a test can be started for.
pub async fn list_exam_types() -> impl IntoResponse {
    Json(ExamType::ALL)
}

/// Starts a test of the given exam type, replacing any unfinished one.
pub async fn start_test(
    State(tests): State<Arc<TestSessionService>>,
    Extension(claims): Extension<Claims>,
    Path(exam_type): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let started = tests.start_test(claims.user_id()?, &exam_type).await?;
    Ok((StatusCode::CREATED, Json(started)))
}

/// Returns the question under the cursor, or `ready_to_finish`.
pub async fn current_question(
    State(tests): State<Arc<TestSessionService>>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let current = tests.current_question(claims.user_id()?).await?;
    Ok(Json(current))
}

/// Records one answer.
/// A body that does not parse is an `InvalidSubmission`, reported after the session check.
pub async fn submit_answer(
    State(tests): State<Arc<TestSessionService>>,
    Extension(claims): Extension<Claims>,
    payload: Result<Json<SubmitAnswerRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let body = payload
        .map(|Json(req)| req)
        .map_err(|rejection| AppError::InvalidSubmission(rejection.body_text()));
    tests.submit_answer_body(claims.user_id()?, body).await?;
    Ok(Json(json!({ "success": true })))
}

/// Grades and stores the running test.
/// With no running test the client is pointed back to the dashboard.
pub async fn finish_test(
    State(tests): State<Arc<TestSessionService>>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let outcome = tests.finish_test(claims.user_id()?).await?;
    let body = match outcome {
        FinishOutcome::Finished { result_id } => json!({
            "status": "finished",
            "result_id": result_id,
            "redirect": format!("/results/{}", result_id),
        }),
        FinishOutcome::NothingToFinish => json!({
            "status": "nothing_to_finish",
            "redirect": "/dashboard",
        }),
    };
    Ok(Json(body))
}
