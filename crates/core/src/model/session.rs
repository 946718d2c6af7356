use thiserror::Error;

use crate::model::{AnswerReason, AnswerRecord, Difficulty};

//
// ─── ERRORS ───────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SessionStateError {
    #[error("question index {index} does not match {answers} recorded answers")]
    IndexMismatch { index: usize, answers: usize },
}

//
// ─── TRANSITIONS ──────────────────────────────────────────────────────────────
//

/// The only legal ways to change a `CandidateSession`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    /// Record the answer to the current question and advance to the next one.
    AppendAnswer {
        question: String,
        answer_text: String,
        difficulty: Difficulty,
        attended: bool,
        reason: AnswerReason,
    },
    /// Overwrite identity fields. The resume filename is only replaced when given.
    SetCandidateInfo {
        name: String,
        email: String,
        phone: String,
        resume_filename: Option<String>,
    },
    ResetSession,
    PauseSession,
    ResumeSession,
    /// Start the countdown for the question being entered.
    SetTimer { duration_secs: u32 },
    /// Mirror a countdown tick.
    SetTimeLeft { seconds: u32 },
}

impl Transition {
    /// Short stable name, used in logs.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Transition::AppendAnswer { .. } => "append_answer",
            Transition::SetCandidateInfo { .. } => "set_candidate_info",
            Transition::ResetSession => "reset_session",
            Transition::PauseSession => "pause_session",
            Transition::ResumeSession => "resume_session",
            Transition::SetTimer { .. } => "set_timer",
            Transition::SetTimeLeft { .. } => "set_time_left",
        }
    }
}

//
// ─── SESSION ──────────────────────────────────────────────────────────────────
//

/// Client-held record of one candidate's interview attempt.
///
/// Fields can only be changed through [`CandidateSession::apply`]. The current
/// question index is not stored: it is always the number of recorded answers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CandidateSession {
    name: String,
    email: String,
    phone: String,
    resume_filename: String,
    answers: Vec<AnswerRecord>,
    current_question_duration_secs: u32,
    time_left_secs: u32,
    paused: bool,
    progress_saved: bool,
}

/// Plain field-by-field view of a session, used to persist and restore it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionParts {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub resume_filename: String,
    pub answers: Vec<AnswerRecord>,
    pub current_question_index: usize,
    pub current_question_duration_secs: u32,
    pub time_left_secs: u32,
    pub paused: bool,
    pub progress_saved: bool,
}

impl CandidateSession {
    /// Rehydrate a session from persisted fields.
    ///
    /// A stored time left larger than a nonzero stored duration is clamped to
    /// the duration.
    ///
    /// # Errors
    ///
    /// Returns `SessionStateError::IndexMismatch` if the stored question index
    /// disagrees with the number of stored answers.
    pub fn from_parts(parts: SessionParts) -> Result<Self, SessionStateError> {
        if parts.current_question_index != parts.answers.len() {
            return Err(SessionStateError::IndexMismatch {
                index: parts.current_question_index,
                answers: parts.answers.len(),
            });
        }

        let time_left_secs = clamp_time_left(parts.time_left_secs, parts.current_question_duration_secs);

        Ok(Self {
            name: parts.name,
            email: parts.email,
            phone: parts.phone,
            resume_filename: parts.resume_filename,
            answers: parts.answers,
            current_question_duration_secs: parts.current_question_duration_secs,
            time_left_secs,
            paused: parts.paused,
            progress_saved: parts.progress_saved,
        })
    }

    #[must_use]
    pub fn to_parts(&self) -> SessionParts {
        SessionParts {
            name: self.name.clone(),
            email: self.email.clone(),
            phone: self.phone.clone(),
            resume_filename: self.resume_filename.clone(),
            answers: self.answers.clone(),
            current_question_index: self.current_question_index(),
            current_question_duration_secs: self.current_question_duration_secs,
            time_left_secs: self.time_left_secs,
            paused: self.paused,
            progress_saved: self.progress_saved,
        }
    }

    /// Apply one transition and return the resulting session.
    #[must_use]
    pub fn apply(mut self, transition: Transition) -> Self {
        match transition {
            Transition::AppendAnswer {
                question,
                answer_text,
                difficulty,
                attended,
                reason,
            } => {
                let time_spent = self
                    .current_question_duration_secs
                    .saturating_sub(self.time_left_secs);
                self.answers.push(AnswerRecord::new(
                    question,
                    answer_text,
                    difficulty,
                    attended,
                    reason,
                    time_spent,
                ));
                self.current_question_duration_secs = 0;
                self.time_left_secs = 0;
                self.paused = false;
                self.progress_saved = false;
                self
            }
            Transition::SetCandidateInfo {
                name,
                email,
                phone,
                resume_filename,
            } => {
                self.name = name;
                self.email = email;
                self.phone = phone;
                if let Some(filename) = resume_filename {
                    self.resume_filename = filename;
                }
                self
            }
            Transition::ResetSession => Self::default(),
            Transition::PauseSession => {
                self.paused = true;
                self.progress_saved = true;
                self
            }
            Transition::ResumeSession => {
                self.paused = false;
                self.progress_saved = false;
                self
            }
            Transition::SetTimer { duration_secs } => {
                self.current_question_duration_secs = duration_secs;
                self.time_left_secs = duration_secs;
                self.paused = false;
                self
            }
            Transition::SetTimeLeft { seconds } => {
                self.time_left_secs = clamp_time_left(seconds, self.current_question_duration_secs);
                self
            }
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn email(&self) -> &str {
        &self.email
    }

    #[must_use]
    pub fn phone(&self) -> &str {
        &self.phone
    }

    /// Last uploaded resume reference, if any.
    #[must_use]
    pub fn resume_filename(&self) -> Option<&str> {
        Some(self.resume_filename.as_str()).filter(|name| !name.is_empty())
    }

    #[must_use]
    pub fn answers(&self) -> &[AnswerRecord] {
        &self.answers
    }

    #[must_use]
    pub fn current_question_index(&self) -> usize {
        self.answers.len()
    }

    #[must_use]
    pub fn current_question_duration_secs(&self) -> u32 {
        self.current_question_duration_secs
    }

    #[must_use]
    pub fn time_left_secs(&self) -> u32 {
        self.time_left_secs
    }

    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    #[must_use]
    pub fn progress_saved(&self) -> bool {
        self.progress_saved
    }

    /// True when name, email and phone are all filled in.
    #[must_use]
    pub fn has_identity(&self) -> bool {
        !self.name.is_empty() && !self.email.is_empty() && !self.phone.is_empty()
    }

    /// An interview counts as unfinished once at least one question was
    /// answered by a candidate whose identity is known.
    #[must_use]
    pub fn has_unfinished_interview(&self) -> bool {
        self.current_question_index() > 0 && self.has_identity()
    }

    /// True when every one of `total_questions` has an answer.
    #[must_use]
    pub fn is_interview_complete(&self, total_questions: usize) -> bool {
        !self.answers.is_empty() && self.current_question_index() >= total_questions
    }

    /// Number of answers the candidate actually attended.
    #[must_use]
    pub fn attended_count(&self) -> usize {
        self.answers.iter().filter(|a| a.attended()).count()
    }
}

fn clamp_time_left(seconds: u32, duration: u32) -> u32 {
    if duration > 0 { seconds.min(duration) } else { seconds }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;

    fn answer(text: &str, attended: bool, reason: AnswerReason) -> Transition {
        Transition::AppendAnswer {
            question: "Explain borrowing.".into(),
            answer_text: text.into(),
            difficulty: Difficulty::Easy,
            attended,
            reason,
        }
    }

    fn identified() -> CandidateSession {
        CandidateSession::default().apply(Transition::SetCandidateInfo {
            name: "Ada".into(),
            email: "ada@example.com".into(),
            phone: "+44 1234 5678".into(),
            resume_filename: Some("ada.pdf".into()),
        })
    }

    #[test]
    fn index_tracks_answers_for_any_sequence() {
        let mut session = identified();
        let reasons = [
            AnswerReason::Submitted,
            AnswerReason::Timeout,
            AnswerReason::Skipped,
            AnswerReason::NextWithAnswer,
            AnswerReason::Submitted,
            AnswerReason::Timeout,
        ];
        for (i, reason) in reasons.into_iter().enumerate() {
            session = session
                .apply(Transition::SetTimer { duration_secs: 20 })
                .apply(answer("x", true, reason));
            assert_eq!(session.current_question_index(), i + 1);
            assert_eq!(session.answers().len(), session.current_question_index());
        }
    }

    #[test]
    fn submitted_answer_records_time_spent() {
        let session = identified()
            .apply(Transition::SetTimer { duration_secs: 20 })
            .apply(Transition::SetTimeLeft { seconds: 15 })
            .apply(answer("Moves and borrows", true, AnswerReason::Submitted));

        let record = &session.answers()[0];
        assert_eq!(record.time_spent_secs(), 5);
        assert!(record.attended());
        assert_eq!(record.reason(), AnswerReason::Submitted);
    }

    #[test]
    fn timeout_records_full_duration() {
        let session = identified()
            .apply(Transition::SetTimer { duration_secs: 60 })
            .apply(Transition::SetTimeLeft { seconds: 0 })
            .apply(answer("", false, AnswerReason::Timeout));

        let record = &session.answers()[0];
        assert_eq!(record.time_spent_secs(), 60);
        assert!(!record.attended());
        assert_eq!(record.answer_text(), "");
    }

    #[test]
    fn time_spent_never_negative() {
        // No timer was set, time left is larger than the duration.
        let session = identified()
            .apply(Transition::SetTimeLeft { seconds: 30 })
            .apply(answer("late", true, AnswerReason::Submitted));
        assert_eq!(session.answers()[0].time_spent_secs(), 0);
    }

    #[test]
    fn time_left_is_clamped_to_active_duration() {
        let session = identified()
            .apply(Transition::SetTimer { duration_secs: 20 })
            .apply(Transition::SetTimeLeft { seconds: 99 });
        assert_eq!(session.time_left_secs(), 20);
    }

    #[test]
    fn append_resets_timer_and_pause_flags() {
        let session = identified()
            .apply(Transition::SetTimer { duration_secs: 120 })
            .apply(Transition::PauseSession)
            .apply(answer("done", true, AnswerReason::Submitted));

        assert_eq!(session.current_question_duration_secs(), 0);
        assert_eq!(session.time_left_secs(), 0);
        assert!(!session.is_paused());
        assert!(!session.progress_saved());
    }

    #[test]
    fn reset_returns_to_defaults() {
        let session = identified()
            .apply(Transition::SetTimer { duration_secs: 60 })
            .apply(answer("a", true, AnswerReason::Submitted))
            .apply(Transition::PauseSession)
            .apply(Transition::ResetSession);

        assert_eq!(session, CandidateSession::default());
        assert_eq!(session.name(), "");
        assert_eq!(session.resume_filename(), None);
        assert_eq!(session.current_question_index(), 0);
        assert!(!session.is_paused());
    }

    #[test]
    fn candidate_info_keeps_filename_when_absent() {
        let session = identified().apply(Transition::SetCandidateInfo {
            name: "Ada L".into(),
            email: "ada@example.org".into(),
            phone: "12345678".into(),
            resume_filename: None,
        });
        assert_eq!(session.name(), "Ada L");
        assert_eq!(session.resume_filename(), Some("ada.pdf"));
    }

    #[test]
    fn pause_and_resume_toggle_both_flags() {
        let paused = identified().apply(Transition::PauseSession);
        assert!(paused.is_paused());
        assert!(paused.progress_saved());

        let resumed = paused.apply(Transition::ResumeSession);
        assert!(!resumed.is_paused());
        assert!(!resumed.progress_saved());
    }

    #[test]
    fn set_timer_unpauses() {
        let session = identified()
            .apply(Transition::PauseSession)
            .apply(Transition::SetTimer { duration_secs: 20 });
        assert!(!session.is_paused());
        assert_eq!(session.current_question_duration_secs(), 20);
        assert_eq!(session.time_left_secs(), 20);
    }

    #[test]
    fn unfinished_interview_requires_progress_and_identity() {
        assert!(!identified().has_unfinished_interview());

        let started = identified().apply(answer("a", true, AnswerReason::Submitted));
        assert!(started.has_unfinished_interview());

        let anonymous = CandidateSession::default().apply(answer("a", true, AnswerReason::Submitted));
        assert!(!anonymous.has_unfinished_interview());
    }

    #[test]
    fn completion_requires_an_answer() {
        assert!(!CandidateSession::default().is_interview_complete(0));

        let mut session = identified();
        for _ in 0..6 {
            session = session.apply(answer("a", true, AnswerReason::Submitted));
        }
        assert!(session.is_interview_complete(6));
        assert!(!session.is_interview_complete(7));
    }

    #[test]
    fn parts_round_trip() {
        let session = identified()
            .apply(Transition::SetTimer { duration_secs: 60 })
            .apply(answer("a", true, AnswerReason::Submitted))
            .apply(Transition::SetTimer { duration_secs: 120 })
            .apply(Transition::SetTimeLeft { seconds: 90 })
            .apply(Transition::PauseSession);

        let restored = CandidateSession::from_parts(session.to_parts()).unwrap();
        assert_eq!(restored, session);
    }

    #[test]
    fn parts_with_wrong_index_are_rejected() {
        let mut parts = identified().to_parts();
        parts.current_question_index = 3;
        let err = CandidateSession::from_parts(parts).unwrap_err();
        assert_eq!(err, SessionStateError::IndexMismatch { index: 3, answers: 0 });
    }
}
