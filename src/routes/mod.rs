mod execute;
mod submissions;

pub use execute::{execute_code, ExecuteCodeBody};
pub use submissions::{
    get_all_submissions, get_solved_problems, get_submission_count, get_submissions_for_problem,
};

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/v1/execute-code", post(execute_code))
        .route(
            "/api/v1/submission/get-all-submissions",
            get(get_all_submissions),
        )
        .route(
            "/api/v1/submission/get-submission/:problem_id",
            get(get_submissions_for_problem),
        )
        .route(
            "/api/v1/submission/get-submissions-count/:problem_id",
            get(get_submission_count),
        )
        .route("/api/v1/problems/get-solved-problems", get(get_solved_problems))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
