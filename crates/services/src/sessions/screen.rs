//! What the interview screen shows, derived from the question set, the
//! session and the scoring submission.

use interview_core::model::{CandidateSession, Difficulty, Question};
use interview_core::timing::plan_timer;

use crate::api::InterviewResult;

/// Status of the question sequence for the current interview.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub(crate) enum QuestionSet {
    #[default]
    Loading,
    Failed(String),
    Ready(Vec<Question>),
}

impl QuestionSet {
    pub(crate) fn questions(&self) -> Option<&[Question]> {
        match self {
            QuestionSet::Ready(questions) => Some(questions),
            QuestionSet::Loading | QuestionSet::Failed(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum SubmissionStatus {
    #[default]
    Pending,
    Submitted(InterviewResult),
    Failed {
        message: String,
    },
}

/// The question waiting for an answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionPrompt {
    /// 1-based position in the sequence.
    pub number: usize,
    pub total: usize,
    pub text: String,
    pub difficulty: Difficulty,
    pub budget_secs: u32,
    pub time_left_secs: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompletionSummary {
    pub total: usize,
    /// Answers with text.
    pub answered: usize,
    /// Skipped or timed-out questions.
    pub unattended: usize,
    pub submission: SubmissionStatus,
}

#[derive(Debug, Clone, PartialEq)]
pub enum InterviewScreen {
    Loading,
    Error { message: String },
    AwaitingAnswer(QuestionPrompt),
    Completed(CompletionSummary),
}

impl InterviewScreen {
    pub(crate) fn derive(
        questions: &QuestionSet,
        session: &CandidateSession,
        submission: &SubmissionStatus,
    ) -> Self {
        if matches!(submission, SubmissionStatus::Submitted(_)) && !session.answers().is_empty() {
            let total = questions
                .questions()
                .map_or(session.answers().len(), <[Question]>::len);
            return Self::completed(total, session, submission);
        }

        let questions = match questions {
            QuestionSet::Loading => return InterviewScreen::Loading,
            QuestionSet::Failed(message) => {
                return InterviewScreen::Error {
                    message: message.clone(),
                };
            }
            QuestionSet::Ready(questions) => questions,
        };

        let total = questions.len();
        if session.is_interview_complete(total) {
            return Self::completed(total, session, submission);
        }

        let index = session.current_question_index();
        let Some(question) = questions.get(index) else {
            return InterviewScreen::Error {
                message: "no questions are available".into(),
            };
        };
        let budget_secs = question.time_limit_secs();
        InterviewScreen::AwaitingAnswer(QuestionPrompt {
            number: index + 1,
            total,
            text: question.text().to_string(),
            difficulty: question.difficulty(),
            budget_secs,
            time_left_secs: plan_timer(session, budget_secs).budget_secs(),
        })
    }

    fn completed(
        total: usize,
        session: &CandidateSession,
        submission: &SubmissionStatus,
    ) -> Self {
        let answered = session.attended_count();
        InterviewScreen::Completed(CompletionSummary {
            total,
            answered,
            unattended: session.answers().len() - answered,
            submission: submission.clone(),
        })
    }
}
