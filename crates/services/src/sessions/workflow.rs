use std::fmt;
use std::sync::Arc;

use interview_core::model::{
    AnswerReason, CandidateSession, ProfileDraft, Question, ResumeUpload, Transition,
};
use interview_core::timing::{TimerPlan, plan_timer};
use storage::{QuestionCache, ResultSlot, Storage};

use super::screen::{InterviewScreen, QuestionSet, SubmissionStatus};
use super::state::SessionState;
use crate::api::{InterviewApi, InterviewResult, InterviewSubmission};
use crate::error::FlowError;

/// The step of the candidate journey currently on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowPhase {
    Upload,
    Profile,
    Interview,
}

impl fmt::Display for FlowPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            FlowPhase::Upload => "upload",
            FlowPhase::Profile => "profile",
            FlowPhase::Interview => "interview",
        };
        f.write_str(label)
    }
}

/// Raised at startup when a saved interview was left unfinished.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResumePrompt {
    pub candidate_name: String,
    pub answered: usize,
}

/// Drives one candidate through Upload, Profile and Interview.
pub struct InterviewFlow {
    state: SessionState,
    cache: QuestionCache,
    results: ResultSlot,
    api: Arc<dyn InterviewApi>,
    phase: FlowPhase,
    resume_prompt: Option<ResumePrompt>,
    draft: ProfileDraft,
    questions: QuestionSet,
    submission: SubmissionStatus,
}

impl InterviewFlow {
    /// Restore the saved session and decide whether to offer a resume.
    ///
    /// A stored scoring result marks the saved interview as already
    /// submitted, so it is never scored again.
    pub async fn start(storage: &Storage, api: Arc<dyn InterviewApi>) -> Self {
        let state = SessionState::restore(storage.session_store()).await;
        let results = storage.result_slot();
        let session = state.session();
        let submission = if session.answers().is_empty() {
            SubmissionStatus::Pending
        } else {
            results
                .load::<InterviewResult>()
                .await
                .map_or(SubmissionStatus::Pending, SubmissionStatus::Submitted)
        };
        let resume_prompt = session.has_unfinished_interview().then(|| ResumePrompt {
            candidate_name: session.name().to_string(),
            answered: session.current_question_index(),
        });
        let draft = ProfileDraft::new(session.name(), session.email(), session.phone());
        if resume_prompt.is_some() {
            tracing::info!(
                answered = session.current_question_index(),
                "unfinished interview found"
            );
        }

        Self {
            state,
            cache: storage.question_cache(),
            results,
            api,
            phase: FlowPhase::Upload,
            resume_prompt,
            draft,
            questions: QuestionSet::Loading,
            submission,
        }
    }

    #[must_use]
    pub fn phase(&self) -> FlowPhase {
        self.phase
    }

    #[must_use]
    pub fn session(&self) -> &CandidateSession {
        self.state.session()
    }

    #[must_use]
    pub fn resume_prompt(&self) -> Option<&ResumePrompt> {
        self.resume_prompt.as_ref()
    }

    #[must_use]
    pub fn profile_draft(&self) -> &ProfileDraft {
        &self.draft
    }

    #[must_use]
    pub fn submission(&self) -> &SubmissionStatus {
        &self.submission
    }

    #[must_use]
    pub fn screen(&self) -> InterviewScreen {
        InterviewScreen::derive(&self.questions, self.state.session(), &self.submission)
    }

    //
    // ─── STARTUP DECISION ─────────────────────────────────────────────────────
    //

    /// Continue the saved interview where it stopped.
    ///
    /// # Errors
    ///
    /// Returns `FlowError::NothingToResume` when no resume prompt is pending.
    pub async fn resume_interview(&mut self) -> Result<(), FlowError> {
        if self.resume_prompt.take().is_none() {
            return Err(FlowError::NothingToResume);
        }
        self.set_phase(FlowPhase::Interview);
        self.enter_interview().await
    }

    /// Discard any saved progress and go back to the upload step.
    pub async fn start_new_interview(&mut self) {
        self.resume_prompt = None;
        self.state.dispatch(Transition::ResetSession).await;
        self.results.clear().await;
        self.draft = ProfileDraft::default();
        self.questions = QuestionSet::Loading;
        self.submission = SubmissionStatus::Pending;
        self.set_phase(FlowPhase::Upload);
    }

    //
    // ─── UPLOAD & PROFILE ─────────────────────────────────────────────────────
    //

    /// Validate the resume locally, send it to the parser and prefill the
    /// profile with whatever it extracted.
    ///
    /// # Errors
    ///
    /// Returns `FlowError::Invalid` for a wrong extension or an oversized file
    /// (the parser is not called), or `FlowError::Api` when parsing fails. The
    /// session is left untouched on error.
    pub async fn upload_resume(
        &mut self,
        filename: &str,
        bytes: Vec<u8>,
    ) -> Result<&ProfileDraft, FlowError> {
        self.expect_phase("resume upload", FlowPhase::Upload)?;
        if self.resume_prompt.is_some() {
            return Err(FlowError::ResumeDecisionPending);
        }
        let upload = ResumeUpload::new(filename, bytes).map_err(interview_core::Error::from)?;
        let parsed = self.api.parse_resume(&upload).await?;

        let resume_filename = parsed
            .filename
            .filter(|name| !name.trim().is_empty())
            .unwrap_or_else(|| upload.filename().to_string());
        let fields = parsed.parsed_fields;
        let name = fields.name.unwrap_or_default();
        let email = fields.email.unwrap_or_default();
        let phone = fields.phone.unwrap_or_default();

        self.draft = ProfileDraft::new(name.clone(), email.clone(), phone.clone());
        self.state
            .dispatch(Transition::SetCandidateInfo {
                name,
                email,
                phone,
                resume_filename: Some(resume_filename),
            })
            .await;
        self.set_phase(FlowPhase::Profile);
        Ok(&self.draft)
    }

    /// Validate the confirmed contact details and move on to the interview.
    ///
    /// # Errors
    ///
    /// Returns `FlowError::Invalid` with the failing field; the draft is kept
    /// so it can be corrected.
    pub async fn confirm_profile(&mut self, draft: ProfileDraft) -> Result<(), FlowError> {
        self.expect_phase("profile confirmation", FlowPhase::Profile)?;
        self.draft = draft.clone();
        let profile = draft.validate().map_err(interview_core::Error::from)?;

        self.state
            .dispatch(Transition::SetCandidateInfo {
                name: profile.name().to_string(),
                email: profile.email().to_string(),
                phone: profile.phone().to_string(),
                resume_filename: None,
            })
            .await;
        self.set_phase(FlowPhase::Interview);
        self.enter_interview().await
    }

    //
    // ─── INTERVIEW ────────────────────────────────────────────────────────────
    //

    /// Show the interview screen: clears any pause and makes sure questions
    /// are loaded. A question load failure shows up as an `Error` screen.
    ///
    /// # Errors
    ///
    /// Returns `FlowError::WrongPhase` outside the interview step.
    pub async fn enter_interview(&mut self) -> Result<(), FlowError> {
        self.expect_phase("entering the interview", FlowPhase::Interview)?;
        self.state.dispatch(Transition::ResumeSession).await;
        let scored = matches!(self.submission, SubmissionStatus::Submitted(_));
        if !scored && self.questions.questions().is_none() {
            self.load_questions().await;
        }
        self.finish().await;
        Ok(())
    }

    /// Prepare the countdown for the current question and return the seconds
    /// it should start from.
    ///
    /// # Errors
    ///
    /// Returns `FlowError::NoActiveQuestion` when nothing awaits an answer.
    pub async fn begin_question(&mut self) -> Result<u32, FlowError> {
        self.expect_phase("starting a question", FlowPhase::Interview)?;
        let budget = self.active_question()?.time_limit_secs();
        let plan = plan_timer(self.state.session(), budget);
        if let TimerPlan::Fresh { duration_secs } = plan {
            self.state
                .dispatch(Transition::SetTimer { duration_secs })
                .await;
        }
        Ok(plan.budget_secs())
    }

    /// Mirror a countdown tick into the session. Ticks arriving when no
    /// question is active are ignored.
    pub async fn record_tick(&mut self, remaining_secs: u32) {
        if self.phase != FlowPhase::Interview || self.active_question().is_err() {
            return;
        }
        self.state
            .dispatch(Transition::SetTimeLeft {
                seconds: remaining_secs,
            })
            .await;
    }

    /// Record a typed answer and advance.
    ///
    /// # Errors
    ///
    /// Returns `FlowError::EmptyAnswer` for blank text, leaving the question
    /// open.
    pub async fn submit_answer(&mut self, text: &str) -> Result<(), FlowError> {
        self.expect_phase("submitting an answer", FlowPhase::Interview)?;
        self.active_question()?;
        let text = text.trim();
        if text.is_empty() {
            return Err(FlowError::EmptyAnswer);
        }
        self.record_answer(text.to_string(), true, AnswerReason::Submitted)
            .await
    }

    /// Advance, keeping the text if any was typed, otherwise skipping.
    ///
    /// # Errors
    ///
    /// Returns `FlowError::NoActiveQuestion` when nothing awaits an answer.
    pub async fn next_question(&mut self, text: &str) -> Result<(), FlowError> {
        self.expect_phase("moving to the next question", FlowPhase::Interview)?;
        let text = text.trim();
        if text.is_empty() {
            self.record_answer(String::new(), false, AnswerReason::Skipped)
                .await
        } else {
            self.record_answer(text.to_string(), true, AnswerReason::NextWithAnswer)
                .await
        }
    }

    /// The countdown ran out: record whatever was typed as a timeout.
    ///
    /// # Errors
    ///
    /// Returns `FlowError::NoActiveQuestion` when nothing awaits an answer.
    pub async fn time_up(&mut self, text: &str) -> Result<(), FlowError> {
        self.expect_phase("timing out a question", FlowPhase::Interview)?;
        self.record_answer(text.trim().to_string(), false, AnswerReason::Timeout)
            .await
    }

    /// The candidate left the interview screen; progress stays saved.
    ///
    /// # Errors
    ///
    /// Returns `FlowError::WrongPhase` outside the interview step.
    pub async fn leave_interview(&mut self) -> Result<(), FlowError> {
        self.expect_phase("pausing", FlowPhase::Interview)?;
        self.state.dispatch(Transition::PauseSession).await;
        tracing::info!(
            question_index = self.state.session().current_question_index(),
            "interview paused"
        );
        Ok(())
    }

    /// Retry whatever failed: loading questions or the scoring submission.
    ///
    /// # Errors
    ///
    /// Returns `FlowError::WrongPhase` outside the interview step.
    pub async fn retry(&mut self) -> Result<(), FlowError> {
        self.expect_phase("retrying", FlowPhase::Interview)?;
        if matches!(self.questions, QuestionSet::Failed(_)) {
            self.load_questions().await;
        }
        if matches!(self.submission, SubmissionStatus::Failed { .. }) {
            self.submission = SubmissionStatus::Pending;
        }
        self.finish().await;
        Ok(())
    }

    //
    // ─── INTERNALS ────────────────────────────────────────────────────────────
    //

    fn set_phase(&mut self, phase: FlowPhase) {
        if self.phase != phase {
            tracing::info!(from = %self.phase, to = %phase, "flow phase changed");
            self.phase = phase;
        }
    }

    fn expect_phase(&self, action: &'static str, phase: FlowPhase) -> Result<(), FlowError> {
        if self.phase == phase {
            Ok(())
        } else {
            Err(FlowError::WrongPhase {
                action,
                phase: self.phase,
            })
        }
    }

    fn active_question(&self) -> Result<&Question, FlowError> {
        let questions = self
            .questions
            .questions()
            .ok_or(FlowError::NoActiveQuestion)?;
        let session = self.state.session();
        if session.is_interview_complete(questions.len()) {
            return Err(FlowError::NoActiveQuestion);
        }
        questions
            .get(session.current_question_index())
            .ok_or(FlowError::NoActiveQuestion)
    }

    async fn record_answer(
        &mut self,
        answer_text: String,
        attended: bool,
        reason: AnswerReason,
    ) -> Result<(), FlowError> {
        let question = self.active_question()?;
        let transition = Transition::AppendAnswer {
            question: question.text().to_string(),
            answer_text,
            difficulty: question.difficulty(),
            attended,
            reason,
        };
        self.state.dispatch(transition).await;
        self.finish().await;
        Ok(())
    }

    async fn load_questions(&mut self) {
        self.questions = QuestionSet::Loading;
        if let Some(cached) = self.cache.load().await {
            tracing::debug!("using cached question set");
            self.questions = QuestionSet::Ready(cached);
            return;
        }

        match self.api.generate_questions().await {
            Ok(questions) => {
                self.cache.save(&questions).await;
                self.questions = QuestionSet::Ready(questions);
            }
            Err(err) => {
                tracing::warn!(error = %err, "questions could not be loaded");
                self.questions = QuestionSet::Failed(err.to_string());
            }
        }
    }

    /// Hand the completed interview to the scoring collaborator, once.
    async fn finish(&mut self) {
        if !matches!(self.submission, SubmissionStatus::Pending) {
            return;
        }
        let Some(questions) = self.questions.questions() else {
            return;
        };
        let session = self.state.session();
        if !session.is_interview_complete(questions.len()) {
            return;
        }

        let submission = InterviewSubmission::from_session(session);
        tracing::info!(answers = submission.answers.len(), "submitting interview");
        match self.api.submit_answers(&submission).await {
            Ok(result) => {
                self.results.save(&result).await;
                self.cache.clear().await;
                self.submission = SubmissionStatus::Submitted(result);
            }
            Err(err) => {
                tracing::warn!(error = %err, "interview submission failed");
                self.submission = SubmissionStatus::Failed {
                    message: err.to_string(),
                };
            }
        }
    }
}
