use axum::{extract::State, Json};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

use crate::auth::AuthUser;
use crate::error::{AppError, AppJson};
use crate::execution::ExecutionRequest;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ExecuteCodeBody {
    pub source_code: String,
    pub language_id: u32,
    #[serde(default)]
    pub stdin: Vec<String>,
    #[serde(default)]
    pub expected_outputs: Vec<String>,
    #[serde(rename = "problemId")]
    pub problem_id: String,
}

pub async fn execute_code(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    AppJson(body): AppJson<ExecuteCodeBody>,
) -> Result<Json<Value>, AppError> {
    let request = ExecutionRequest {
        user_id: user.id,
        problem_id: body.problem_id,
        source_code: body.source_code,
        language_id: body.language_id,
        stdin: body.stdin,
        expected_outputs: body.expected_outputs,
    };

    let submission = state.executor().execute_submission(request).await?;

    Ok(Json(json!({
        "success": true,
        "message": "Code Executed! Successfully!",
        "submission": submission,
    })))
}
