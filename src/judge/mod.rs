mod client;
mod error;
pub mod language;
mod types;

pub use client::{Judge, Judge0Client, JudgeSettings};
pub use error::JudgeError;
pub use language::{judge_language_id, language_name, Language};
pub use types::{RunResult, RunSpec, RunStatus, SubmissionToken};
