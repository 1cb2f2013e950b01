// src/handlers/results.rs

use std::sync::Arc;

use axum::{
    Extension, Json,
    extract::{Path, State},
    response::IntoResponse,
};

use crate::{
    config::DASHBOARD_RECENT_LIMIT, error::AppError, services::ResultService, utils::jwt::Claims,
};

/// A finished test with every question, the submitted answer and whether it was right.
/// Only the owner may read it.
pub async fn view_result(
    State(results): State<Arc<ResultService>>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let detail = results.view_result(claims.user_id()?, id).await?;
    Ok(Json(detail))
}

/// All results of the current user, newest first.
pub async fn list_history(
    State(results): State<Arc<ResultService>>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let history = results.list_history(claims.user_id()?).await?;
    Ok(Json(history))
}

/// The last few results, for the dashboard.
pub async fn dashboard(
    State(results): State<Arc<ResultService>>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let recent = results
        .list_recent(claims.user_id()?, DASHBOARD_RECENT_LIMIT)
        .await?;
    Ok(Json(serde_json::json!({
        "username": claims.username,
        "recent_results": recent,
    })))
}
