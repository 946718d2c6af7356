use serde::{Deserialize, Serialize};
use std::fmt;

use crate::model::Difficulty;

//
// ─── ANSWER REASON ────────────────────────────────────────────────────────────
//

/// Why a question was left.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnswerReason {
    /// Candidate submitted non-empty text.
    Submitted,
    /// The countdown reached zero.
    Timeout,
    /// Candidate moved on without typing anything.
    Skipped,
    /// Candidate moved on with text typed.
    NextWithAnswer,
}

impl AnswerReason {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            AnswerReason::Submitted => "submitted",
            AnswerReason::Timeout => "timeout",
            AnswerReason::Skipped => "skipped",
            AnswerReason::NextWithAnswer => "next_with_answer",
        }
    }
}

impl fmt::Display for AnswerReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

//
// ─── ANSWER RECORD ────────────────────────────────────────────────────────────
//

/// Immutable record of how one question was answered.
///
/// Records are only created by the `AppendAnswer` transition, which also
/// stamps the time spent from the session's countdown fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerRecord {
    question: String,
    #[serde(rename = "answer")]
    answer_text: String,
    difficulty: Difficulty,
    attended: bool,
    reason: AnswerReason,
    #[serde(rename = "timeSpent", default)]
    time_spent_secs: u32,
}

impl AnswerRecord {
    pub(crate) fn new(
        question: String,
        answer_text: String,
        difficulty: Difficulty,
        attended: bool,
        reason: AnswerReason,
        time_spent_secs: u32,
    ) -> Self {
        Self {
            question,
            answer_text,
            difficulty,
            attended,
            reason,
            time_spent_secs,
        }
    }

    #[must_use]
    pub fn question(&self) -> &str {
        &self.question
    }

    #[must_use]
    pub fn answer_text(&self) -> &str {
        &self.answer_text
    }

    #[must_use]
    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    #[must_use]
    pub fn attended(&self) -> bool {
        self.attended
    }

    #[must_use]
    pub fn reason(&self) -> AnswerReason {
        self.reason
    }

    #[must_use]
    pub fn time_spent_secs(&self) -> u32 {
        self.time_spent_secs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_with_wire_field_names() {
        let record = AnswerRecord::new(
            "What is a lifetime?".into(),
            "A region of code".into(),
            Difficulty::Medium,
            true,
            AnswerReason::NextWithAnswer,
            12,
        );
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["question"], "What is a lifetime?");
        assert_eq!(value["answer"], "A region of code");
        assert_eq!(value["difficulty"], "Medium");
        assert_eq!(value["attended"], true);
        assert_eq!(value["reason"], "next_with_answer");
        assert_eq!(value["timeSpent"], 12);
    }

    #[test]
    fn missing_time_spent_defaults_to_zero() {
        let raw = r#"{"question":"q","answer":"","difficulty":"Hard","attended":false,"reason":"timeout"}"#;
        let record: AnswerRecord = serde_json::from_str(raw).unwrap();
        assert_eq!(record.time_spent_secs(), 0);
        assert_eq!(record.reason(), AnswerReason::Timeout);
    }
}
