use async_trait::async_trait;
use sqlx::{Postgres, QueryBuilder};
use tracing::debug;
use uuid::Uuid;

use super::{
    DbPool, NewSubmission, NewTestCaseResult, Submission, SubmissionStore,
    SubmissionWithTestCases, TestCaseResult,
};

pub struct PgStore {
    pool: DbPool,
}

impl PgStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SubmissionStore for PgStore {
    async fn record_submission(
        &self,
        submission: NewSubmission,
        test_cases: Vec<NewTestCaseResult>,
        solved: bool,
    ) -> Result<Uuid, sqlx::Error> {
        let submission_id = Uuid::new_v4();
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO submissions (id, user_id, problem_id, source_code, language, stdin, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(submission_id)
        .bind(&submission.user_id)
        .bind(&submission.problem_id)
        .bind(&submission.source_code)
        .bind(&submission.language)
        .bind(&submission.stdin)
        .bind(&submission.status)
        .execute(&mut *tx)
        .await?;

        if !test_cases.is_empty() {
            let mut insert = QueryBuilder::<Postgres>::new(
                "INSERT INTO test_case_results \
                 (submission_id, test_case, passed, stdout, expected, stderr, compile_output, status, memory, time) ",
            );
            insert.push_values(test_cases, |mut row, case| {
                row.push_bind(submission_id)
                    .push_bind(case.test_case)
                    .push_bind(case.passed)
                    .push_bind(case.stdout)
                    .push_bind(case.expected)
                    .push_bind(case.stderr)
                    .push_bind(case.compile_output)
                    .push_bind(case.status)
                    .push_bind(case.memory)
                    .push_bind(case.time);
            });
            insert.build().execute(&mut *tx).await?;
        }

        if solved {
            sqlx::query(
                r#"
                INSERT INTO problem_solved (user_id, problem_id)
                VALUES ($1, $2)
                ON CONFLICT (user_id, problem_id) DO NOTHING
                "#,
            )
            .bind(&submission.user_id)
            .bind(&submission.problem_id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        debug!("Stored submission {}", submission_id);
        Ok(submission_id)
    }

    async fn get_submission(
        &self,
        id: Uuid,
    ) -> Result<Option<SubmissionWithTestCases>, sqlx::Error> {
        let submission = sqlx::query_as::<_, Submission>("SELECT * FROM submissions WHERE id = $1")
            .bind(id)
            .fetch_optional(self.pool.as_ref())
            .await?;

        let Some(submission) = submission else {
            return Ok(None);
        };

        let test_cases = sqlx::query_as::<_, TestCaseResult>(
            "SELECT * FROM test_case_results WHERE submission_id = $1 ORDER BY test_case",
        )
        .bind(id)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(Some(SubmissionWithTestCases::new(submission, test_cases)))
    }

    async fn list_submissions(
        &self,
        user_id: &str,
        problem_id: Option<&str>,
    ) -> Result<Vec<Submission>, sqlx::Error> {
        sqlx::query_as::<_, Submission>(
            r#"
            SELECT * FROM submissions
            WHERE user_id = $1 AND ($2::text IS NULL OR problem_id = $2)
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_id)
        .bind(problem_id)
        .fetch_all(self.pool.as_ref())
        .await
    }

    async fn count_submissions(&self, problem_id: &str) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM submissions WHERE problem_id = $1")
            .bind(problem_id)
            .fetch_one(self.pool.as_ref())
            .await
    }

    async fn solved_problem_ids(&self, user_id: &str) -> Result<Vec<String>, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT problem_id FROM problem_solved WHERE user_id = $1 ORDER BY created_at DESC",
        )
        .bind(user_id)
        .fetch_all(self.pool.as_ref())
        .await
    }
}
