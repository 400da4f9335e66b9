use serde::{Deserialize, Serialize};
use std::fmt;

use crate::db::NewTestCaseResult;

/// Overall outcome of a submission. Runtime and compile failures are only
/// visible in the per-case rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    #[serde(rename = "Accepted")]
    Accepted,
    #[serde(rename = "Wrong Answer")]
    WrongAnswer,
}

impl Verdict {
    pub fn from_cases(cases: &[NewTestCaseResult]) -> Self {
        if cases.iter().all(|case| case.passed) {
            Verdict::Accepted
        } else {
            Verdict::WrongAnswer
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::Accepted => "Accepted",
            Verdict::WrongAnswer => "Wrong Answer",
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Outer-whitespace-insensitive exact comparison. A run that produced no
/// stdout never matches.
pub fn outputs_match(actual: Option<&str>, expected: &str) -> bool {
    actual.is_some_and(|actual| trim_output(actual) == trim_output(expected))
}

/// Strips outer whitespace, counting a byte order mark as whitespace.
pub fn trim_output(output: &str) -> &str {
    output.trim_matches(|c: char| c.is_whitespace() || c == '\u{feff}')
}
