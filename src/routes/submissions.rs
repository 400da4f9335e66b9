use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::{json, Value};
use std::sync::Arc;

use crate::auth::AuthUser;
use crate::error::AppError;
use crate::state::AppState;

pub async fn get_all_submissions(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
) -> Result<Json<Value>, AppError> {
    let submissions = state
        .store
        .list_submissions(&user.id, None)
        .await
        .map_err(|e| AppError::internal("Failed to fetch submissions", e))?;

    Ok(Json(json!({
        "success": true,
        "message": "Submissions fetched successfully",
        "submissions": submissions,
    })))
}

pub async fn get_submissions_for_problem(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(problem_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let submissions = state
        .store
        .list_submissions(&user.id, Some(&problem_id))
        .await
        .map_err(|e| AppError::internal("Failed to fetch submissions", e))?;

    Ok(Json(json!({
        "success": true,
        "message": "Submissions fetched successfully",
        "submissions": submissions,
    })))
}

pub async fn get_submission_count(
    State(state): State<Arc<AppState>>,
    _user: AuthUser,
    Path(problem_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let count = state
        .store
        .count_submissions(&problem_id)
        .await
        .map_err(|e| AppError::internal("Failed to fetch submission count", e))?;

    Ok(Json(json!({
        "success": true,
        "message": "Submission count fetched successfully",
        "count": count,
    })))
}

pub async fn get_solved_problems(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
) -> Result<Json<Value>, AppError> {
    let problem_ids = state
        .store
        .solved_problem_ids(&user.id)
        .await
        .map_err(|e| AppError::internal("Failed to fetch solved problems", e))?;

    Ok(Json(json!({
        "success": true,
        "message": "Solved problems fetched successfully",
        "problems": problem_ids,
    })))
}
