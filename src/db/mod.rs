mod models;
mod postgres;

pub use models::*;
pub use postgres::PgStore;

use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

pub type DbPool = Arc<PgPool>;

pub async fn create_pool(database_url: &str, max_connections: u32) -> Result<DbPool, sqlx::Error> {
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await?;

    Ok(Arc::new(pool))
}

pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

/// Storage for submissions, their per-case results and solved markers.
#[async_trait]
pub trait SubmissionStore: Send + Sync {
    /// Writes the submission and all of its case rows atomically. When
    /// `solved` is set the (user, problem) solved marker is upserted in the
    /// same unit of work.
    async fn record_submission(
        &self,
        submission: NewSubmission,
        test_cases: Vec<NewTestCaseResult>,
        solved: bool,
    ) -> Result<Uuid, sqlx::Error>;

    async fn get_submission(
        &self,
        id: Uuid,
    ) -> Result<Option<SubmissionWithTestCases>, sqlx::Error>;

    /// Newest first. `problem_id` narrows to one problem.
    async fn list_submissions(
        &self,
        user_id: &str,
        problem_id: Option<&str>,
    ) -> Result<Vec<Submission>, sqlx::Error>;

    async fn count_submissions(&self, problem_id: &str) -> Result<i64, sqlx::Error>;

    async fn solved_problem_ids(&self, user_id: &str) -> Result<Vec<String>, sqlx::Error>;
}
