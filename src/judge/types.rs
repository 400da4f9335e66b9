use serde::{Deserialize, Serialize};
use std::fmt;

/// One program run submitted to the judge.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct RunSpec {
    pub source_code: String,
    pub language_id: u32,
    pub stdin: String,
    pub expected_output: String,
}

/// Opaque per-run handle issued by the judge.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubmissionToken(pub String);

impl SubmissionToken {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SubmissionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunStatus {
    pub id: u32,
    #[serde(default)]
    pub description: String,
}

impl RunStatus {
    pub const IN_QUEUE: u32 = 1;
    pub const PROCESSING: u32 = 2;

    pub fn is_terminal(&self) -> bool {
        self.id != Self::IN_QUEUE && self.id != Self::PROCESSING
    }
}

/// A run as reported by the batch status endpoint.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RunResult {
    pub token: SubmissionToken,
    #[serde(default)]
    pub stdout: Option<String>,
    #[serde(default)]
    pub stderr: Option<String>,
    #[serde(default)]
    pub compile_output: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    /// Wall time in seconds, as the judge formats it.
    #[serde(default)]
    pub time: Option<String>,
    /// Peak memory in KB.
    #[serde(default)]
    pub memory: Option<u64>,
    pub status: RunStatus,
}

#[derive(Debug, Serialize)]
pub(crate) struct BatchRequest<'a> {
    pub submissions: &'a [RunSpec],
}

/// Entry of the batch creation response. Judge0 puts validation errors in
/// place of the token for runs it refused.
#[derive(Debug, Deserialize)]
pub(crate) struct BatchTokenEntry {
    pub token: Option<SubmissionToken>,
    #[serde(flatten)]
    pub errors: serde_json::Map<String, serde_json::Value>,
}

/// Judge0 answers `null` for tokens it does not know.
#[derive(Debug, Deserialize)]
pub(crate) struct BatchStatusResponse {
    pub submissions: Vec<Option<RunResult>>,
}
