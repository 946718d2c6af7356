use serde::{Deserialize, Serialize};
use std::fmt;

use crate::timing;

//
// ─── DIFFICULTY ───────────────────────────────────────────────────────────────
//

/// Difficulty band of an interview question.
///
/// The band decides the time budget a candidate gets for the question.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Difficulty {
    #[default]
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    /// Parses a collaborator-provided label (`"Easy"`, `"medium"`, ...).
    ///
    /// Returns `None` for labels outside the three known bands.
    #[must_use]
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "easy" => Some(Self::Easy),
            "medium" => Some(Self::Medium),
            "hard" => Some(Self::Hard),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

//
// ─── QUESTION ─────────────────────────────────────────────────────────────────
//

/// Number of questions in one interview.
pub const INTERVIEW_QUESTION_COUNT: usize = 6;

/// A single interview question together with its countdown budget.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    text: String,
    difficulty: Difficulty,
    #[serde(rename = "time")]
    time_limit_secs: u32,
}

impl Question {
    /// Build a question for a known difficulty band.
    #[must_use]
    pub fn new(text: impl Into<String>, difficulty: Difficulty) -> Self {
        Self {
            text: text.into(),
            difficulty,
            time_limit_secs: timing::default_duration_secs(difficulty),
        }
    }

    /// Build a question from the raw label sent by the question source.
    ///
    /// Unrecognized labels keep the fallback budget and are recorded as `Easy`.
    #[must_use]
    pub fn from_label(text: impl Into<String>, label: &str) -> Self {
        Self {
            text: text.into(),
            difficulty: Difficulty::from_label(label).unwrap_or_default(),
            time_limit_secs: timing::duration_for_label(label),
        }
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    #[must_use]
    pub fn time_limit_secs(&self) -> u32 {
        self.time_limit_secs
    }
}
