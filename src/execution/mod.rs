//! Runs one submission against its test cases on the judge and records the
//! verdict.
//!
//! The judge only executes code; output comparison happens here, against
//! the expected outputs the caller supplied.

mod verdict;

pub use verdict::{outputs_match, trim_output, Verdict};

use std::sync::Arc;

use thiserror::Error;
use tracing::{info, warn};

use crate::db::{NewSubmission, NewTestCaseResult, SubmissionStore, SubmissionWithTestCases};
use crate::judge::{Judge, JudgeError, Language, RunResult, RunSpec};

#[derive(Debug, Error)]
pub enum ExecutionError {
    #[error("{0}")]
    InvalidInput(String),

    #[error("unsupported language id {0}")]
    UnsupportedLanguage(u32),

    #[error(transparent)]
    Judge(#[from] JudgeError),

    #[error("storage error: {0}")]
    Store(#[from] sqlx::Error),
}

impl ExecutionError {
    /// Whether the caller is at fault, as opposed to the service.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            ExecutionError::InvalidInput(_) | ExecutionError::UnsupportedLanguage(_)
        )
    }
}

#[derive(Debug, Clone)]
pub struct ExecutionRequest {
    pub user_id: String,
    pub problem_id: String,
    pub source_code: String,
    pub language_id: u32,
    pub stdin: Vec<String>,
    pub expected_outputs: Vec<String>,
}

impl ExecutionRequest {
    /// Checks the test case arrays and the language before anything is sent
    /// to the judge.
    pub fn validate(&self) -> Result<Language, ExecutionError> {
        if self.stdin.is_empty() || self.expected_outputs.len() != self.stdin.len() {
            return Err(ExecutionError::InvalidInput(
                "Invalid or Missing test cases".to_string(),
            ));
        }
        Language::from_judge_id(self.language_id)
            .ok_or(ExecutionError::UnsupportedLanguage(self.language_id))
    }

    fn runs(&self) -> Vec<RunSpec> {
        self.stdin
            .iter()
            .map(|stdin| RunSpec {
                source_code: self.source_code.clone(),
                language_id: self.language_id,
                stdin: stdin.clone(),
                expected_output: String::new(),
            })
            .collect()
    }
}

pub struct Executor {
    judge: Arc<dyn Judge>,
    store: Arc<dyn SubmissionStore>,
}

impl Executor {
    pub fn new(judge: Arc<dyn Judge>, store: Arc<dyn SubmissionStore>) -> Self {
        Self { judge, store }
    }

    pub async fn execute_submission(
        &self,
        request: ExecutionRequest,
    ) -> Result<SubmissionWithTestCases, ExecutionError> {
        let language = request.validate()?;
        info!(
            "Executing {} submission for problem {} ({} test cases)",
            language,
            request.problem_id,
            request.stdin.len()
        );

        let tokens = self.judge.submit_batch(&request.runs()).await?;
        let results = self.judge.poll_batch_results(&tokens).await?;
        if results.len() != request.expected_outputs.len() {
            return Err(JudgeError::UnexpectedResponse(format!(
                "expected {} results, got {}",
                request.expected_outputs.len(),
                results.len()
            ))
            .into());
        }

        let test_cases = grade(&results, &request.expected_outputs);
        let verdict = Verdict::from_cases(&test_cases);
        let solved = verdict == Verdict::Accepted;

        let submission = NewSubmission {
            user_id: request.user_id,
            problem_id: request.problem_id,
            source_code: request.source_code,
            language: language.name().to_string(),
            stdin: request.stdin.join("\n"),
            status: verdict.as_str().to_string(),
        };

        let submission_id = self
            .store
            .record_submission(submission, test_cases, solved)
            .await?;
        info!("Submission {} judged: {}", submission_id, verdict);

        self.store
            .get_submission(submission_id)
            .await?
            .ok_or_else(|| {
                warn!("Submission {} vanished after insert", submission_id);
                ExecutionError::Store(sqlx::Error::RowNotFound)
            })
    }
}

/// Builds one case row per judge result, pairing by position with `expected`.
pub fn grade(results: &[RunResult], expected: &[String]) -> Vec<NewTestCaseResult> {
    results
        .iter()
        .zip(expected)
        .enumerate()
        .map(|(i, (result, expected))| {
            let stdout = result.stdout.as_deref().map(trim_output);
            NewTestCaseResult {
                test_case: i as i32 + 1,
                passed: outputs_match(stdout, expected),
                stdout: stdout.unwrap_or_default().to_string(),
                expected: trim_output(expected).to_string(),
                stderr: non_empty(&result.stderr),
                compile_output: non_empty(&result.compile_output),
                status: result.status.description.clone(),
                memory: result.memory.map(|kb| format!("{kb} KB")),
                time: result
                    .time
                    .as_deref()
                    .filter(|t| !t.is_empty())
                    .map(|t| format!("{t} s")),
            }
        })
        .collect()
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value.as_ref().filter(|v| !v.is_empty()).cloned()
}
