use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// One code-execution attempt. Never updated after insert.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    pub id: Uuid,
    pub user_id: String,
    pub problem_id: String,
    pub source_code: String,
    pub language: String,
    pub stdin: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestCaseResult {
    pub id: Uuid,
    pub submission_id: Uuid,
    /// 1-based position in the submitted test case list.
    pub test_case: i32,
    pub passed: bool,
    pub stdout: String,
    pub expected: String,
    pub stderr: Option<String>,
    pub compile_output: Option<String>,
    pub status: String,
    pub memory: Option<String>,
    pub time: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewSubmission {
    pub user_id: String,
    pub problem_id: String,
    pub source_code: String,
    pub language: String,
    pub stdin: String,
    pub status: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewTestCaseResult {
    pub test_case: i32,
    pub passed: bool,
    pub stdout: String,
    pub expected: String,
    pub stderr: Option<String>,
    pub compile_output: Option<String>,
    pub status: String,
    pub memory: Option<String>,
    pub time: Option<String>,
}

/// A submission as returned to clients.
///
/// The per-field summaries are JSON arrays derived from the case rows, one
/// entry per case; a summary is `None` when no case carries that field.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionWithTestCases {
    #[serde(flatten)]
    pub submission: Submission,
    pub stdout: String,
    pub stderr: Option<String>,
    pub compile_output: Option<String>,
    pub memory: Option<String>,
    pub time: Option<String>,
    pub test_cases: Vec<TestCaseResult>,
}

impl SubmissionWithTestCases {
    pub fn new(submission: Submission, mut test_cases: Vec<TestCaseResult>) -> Self {
        test_cases.sort_by_key(|case| case.test_case);

        let stdout = serde_json::to_string(
            &test_cases
                .iter()
                .map(|case| case.stdout.as_str())
                .collect::<Vec<_>>(),
        )
        .unwrap_or_default();

        Self {
            stdout,
            stderr: summarize(&test_cases, |case| case.stderr.as_deref()),
            compile_output: summarize(&test_cases, |case| case.compile_output.as_deref()),
            memory: summarize(&test_cases, |case| case.memory.as_deref()),
            time: summarize(&test_cases, |case| case.time.as_deref()),
            submission,
            test_cases,
        }
    }
}

fn summarize(
    cases: &[TestCaseResult],
    field: impl Fn(&TestCaseResult) -> Option<&str>,
) -> Option<String> {
    let values: Vec<Option<&str>> = cases.iter().map(field).collect();
    if values.iter().all(Option::is_none) {
        return None;
    }
    serde_json::to_string(&values).ok()
}
