use std::time::Duration;

use reqwest::StatusCode;
use thiserror::Error;

use super::SubmissionToken;

#[derive(Debug, Error)]
pub enum JudgeError {
    /// The judge location is not configured. Never transient.
    #[error("JUDGE0_API_URL is not defined")]
    MissingBaseUrl,

    #[error("judge request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("judge returned {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("judge rejected run #{index}: {detail}")]
    Rejected { index: usize, detail: String },

    #[error("unexpected judge response: {0}")]
    UnexpectedResponse(String),

    #[error("judge response is missing run {0}")]
    MissingResult(SubmissionToken),

    #[error("judge did not finish within {0:?}")]
    Timeout(Duration),
}
