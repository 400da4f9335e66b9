//! Languages the judge integration supports, keyed by Judge0 language id.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Name returned by [`language_name`] for ids outside the supported set.
pub const UNKNOWN_LANGUAGE: &str = "Unknown";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Language {
    Python,
    Java,
    JavaScript,
    TypeScript,
}

impl Language {
    pub const ALL: [Language; 4] = [
        Language::Python,
        Language::Java,
        Language::JavaScript,
        Language::TypeScript,
    ];

    /// Judge0 language id.
    pub fn judge_id(self) -> u32 {
        match self {
            Language::Python => 71,
            Language::Java => 62,
            Language::JavaScript => 63,
            Language::TypeScript => 74,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Language::Python => "Python",
            Language::Java => "Java",
            Language::JavaScript => "JavaScript",
            Language::TypeScript => "TypeScript",
        }
    }

    pub fn from_judge_id(id: u32) -> Option<Self> {
        Self::ALL.into_iter().find(|lang| lang.judge_id() == id)
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Display name for a Judge0 language id, or [`UNKNOWN_LANGUAGE`].
pub fn language_name(language_id: u32) -> &'static str {
    Language::from_judge_id(language_id)
        .map(Language::name)
        .unwrap_or(UNKNOWN_LANGUAGE)
}

/// Judge0 id for a language name, case-insensitive.
///
/// TypeScript is deliberately absent: it is resolvable by id only.
pub fn judge_language_id(language: &str) -> Option<u32> {
    match language.to_uppercase().as_str() {
        "PYTHON" => Some(Language::Python.judge_id()),
        "JAVA" => Some(Language::Java.judge_id()),
        "JAVASCRIPT" => Some(Language::JavaScript.judge_id()),
        _ => None,
    }
}
