//! Persistent store for the candidate session, the cached question set and
//! the scoring result of a submitted interview.
//!
//! All three live in key/value slots as JSON. Reads never fail: anything missing,
//! unreadable or of the wrong shape is reported as "nothing stored". Writes
//! are best effort and only logged when they fail.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use interview_core::Clock;
use interview_core::model::{
    AnswerRecord, CandidateSession, INTERVIEW_QUESTION_COUNT, Question, SessionParts,
    SessionStateError,
};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::repository::KeyValueStore;

/// Slot holding the persisted application state.
pub const SESSION_KEY: &str = "ai_interviewer_state_v1";

/// Slot holding the cached question sequence.
pub const QUESTIONS_KEY: &str = "ai_interviewer_questions_v1";

/// Slot holding the scoring result once the interview was submitted.
pub const RESULT_KEY: &str = "ai_interviewer_result_v1";

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SnapshotError {
    #[error("malformed snapshot: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    State(#[from] SessionStateError),
}

//
// ─── PERSISTED SHAPE ──────────────────────────────────────────────────────────
//

/// Persisted mirror of `CandidateSession`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateSnapshot {
    pub name: String,
    pub email: String,
    pub phone: String,
    #[serde(default)]
    pub resume_filename: String,
    pub answers: Vec<AnswerRecord>,
    pub current_question: usize,
    pub progress_saved: bool,
    pub current_duration: u32,
    pub time_left: u32,
    pub paused: bool,
}

impl CandidateSnapshot {
    #[must_use]
    pub fn from_session(session: &CandidateSession) -> Self {
        let parts = session.to_parts();
        Self {
            name: parts.name,
            email: parts.email,
            phone: parts.phone,
            resume_filename: parts.resume_filename,
            answers: parts.answers,
            current_question: parts.current_question_index,
            progress_saved: parts.progress_saved,
            current_duration: parts.current_question_duration_secs,
            time_left: parts.time_left_secs,
            paused: parts.paused,
        }
    }

    /// Convert the snapshot back into a domain session.
    ///
    /// # Errors
    ///
    /// Returns `SessionStateError` if the snapshot breaks a session invariant.
    pub fn into_session(self) -> Result<CandidateSession, SessionStateError> {
        CandidateSession::from_parts(SessionParts {
            name: self.name,
            email: self.email,
            phone: self.phone,
            resume_filename: self.resume_filename,
            answers: self.answers,
            current_question_index: self.current_question,
            current_question_duration_secs: self.current_duration,
            time_left_secs: self.time_left,
            paused: self.paused,
            progress_saved: self.progress_saved,
        })
    }
}

/// Envelope written to [`SESSION_KEY`]. Only the candidate portion is kept.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PersistedState {
    candidate: CandidateSnapshot,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    saved_at: Option<DateTime<Utc>>,
}

/// Encode a session into the slot format.
///
/// # Errors
///
/// Returns `SnapshotError::Json` if serialization fails.
pub fn encode_session(
    session: &CandidateSession,
    saved_at: DateTime<Utc>,
) -> Result<String, SnapshotError> {
    let state = PersistedState {
        candidate: CandidateSnapshot::from_session(session),
        saved_at: Some(saved_at),
    };
    Ok(serde_json::to_string(&state)?)
}

/// Decode a session from the slot format.
///
/// # Errors
///
/// Returns `SnapshotError` for malformed JSON, a missing `candidate` object,
/// wrong field types, or a snapshot that breaks a session invariant.
pub fn decode_session(raw: &str) -> Result<CandidateSession, SnapshotError> {
    let state: PersistedState = serde_json::from_str(raw)?;
    Ok(state.candidate.into_session()?)
}

//
// ─── SESSION STORE ────────────────────────────────────────────────────────────
//

/// Loads and saves the candidate session.
#[derive(Clone)]
pub struct SessionStore {
    slots: Arc<dyn KeyValueStore>,
    clock: Clock,
}

impl SessionStore {
    #[must_use]
    pub fn new(slots: Arc<dyn KeyValueStore>) -> Self {
        Self {
            slots,
            clock: Clock::default_clock(),
        }
    }

    #[must_use]
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// Restore the last saved session, or `None` if there is no usable one.
    pub async fn load(&self) -> Option<CandidateSession> {
        let raw = match self.slots.get(SESSION_KEY).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(err) => {
                tracing::warn!(error = %err, "session slot could not be read");
                return None;
            }
        };

        match decode_session(&raw) {
            Ok(session) => {
                tracing::debug!(
                    question_index = session.current_question_index(),
                    "restored session snapshot"
                );
                Some(session)
            }
            Err(err) => {
                tracing::warn!(error = %err, "discarding unusable session snapshot");
                None
            }
        }
    }

    /// Snapshot the session. Failures are logged and swallowed.
    pub async fn save(&self, session: &CandidateSession) {
        let encoded = match encode_session(session, self.clock.now()) {
            Ok(encoded) => encoded,
            Err(err) => {
                tracing::warn!(error = %err, "session snapshot could not be encoded");
                return;
            }
        };
        if let Err(err) = self.slots.set(SESSION_KEY, &encoded).await {
            tracing::warn!(error = %err, "session snapshot was not saved");
        }
    }
}

//
// ─── QUESTION CACHE ───────────────────────────────────────────────────────────
//

/// Caches the question sequence so a reload does not fetch a new one.
#[derive(Clone)]
pub struct QuestionCache {
    slots: Arc<dyn KeyValueStore>,
}

impl QuestionCache {
    #[must_use]
    pub fn new(slots: Arc<dyn KeyValueStore>) -> Self {
        Self { slots }
    }

    /// Cached questions, only when a complete interview's worth is stored.
    pub async fn load(&self) -> Option<Vec<Question>> {
        let raw = match self.slots.get(QUESTIONS_KEY).await {
            Ok(raw) => raw?,
            Err(err) => {
                tracing::warn!(error = %err, "question slot could not be read");
                return None;
            }
        };

        match serde_json::from_str::<Vec<Question>>(&raw) {
            Ok(questions) if questions.len() == INTERVIEW_QUESTION_COUNT => Some(questions),
            Ok(questions) => {
                tracing::debug!(len = questions.len(), "ignoring incomplete question cache");
                None
            }
            Err(err) => {
                tracing::warn!(error = %err, "ignoring malformed question cache");
                None
            }
        }
    }

    pub async fn save(&self, questions: &[Question]) {
        let encoded = match serde_json::to_string(questions) {
            Ok(encoded) => encoded,
            Err(err) => {
                tracing::warn!(error = %err, "question cache could not be encoded");
                return;
            }
        };
        if let Err(err) = self.slots.set(QUESTIONS_KEY, &encoded).await {
            tracing::warn!(error = %err, "question cache was not saved");
        }
    }

    pub async fn clear(&self) {
        if let Err(err) = self.slots.remove(QUESTIONS_KEY).await {
            tracing::warn!(error = %err, "question cache was not cleared");
        }
    }
}

//
// ─── SUBMITTED RESULT ─────────────────────────────────────────────────────────
//

/// Remembers that the current interview was scored, and what came back.
///
/// The result type belongs to the caller; the slot only stores its JSON.
#[derive(Clone)]
pub struct ResultSlot {
    slots: Arc<dyn KeyValueStore>,
}

impl ResultSlot {
    #[must_use]
    pub fn new(slots: Arc<dyn KeyValueStore>) -> Self {
        Self { slots }
    }

    /// The stored result, or `None` when nothing usable is stored.
    pub async fn load<T: DeserializeOwned>(&self) -> Option<T> {
        let raw = match self.slots.get(RESULT_KEY).await {
            Ok(raw) => raw?,
            Err(err) => {
                tracing::warn!(error = %err, "result slot could not be read");
                return None;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(result) => Some(result),
            Err(err) => {
                tracing::warn!(error = %err, "ignoring malformed stored result");
                None
            }
        }
    }

    pub async fn save<T: Serialize>(&self, result: &T) {
        let encoded = match serde_json::to_string(result) {
            Ok(encoded) => encoded,
            Err(err) => {
                tracing::warn!(error = %err, "result could not be encoded");
                return;
            }
        };
        if let Err(err) = self.slots.set(RESULT_KEY, &encoded).await {
            tracing::warn!(error = %err, "result was not saved");
        }
    }

    pub async fn clear(&self) {
        if let Err(err) = self.slots.remove(RESULT_KEY).await {
            tracing::warn!(error = %err, "result slot was not cleared");
        }
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::InMemoryRepository;
    use interview_core::model::{AnswerReason, Difficulty, Transition};
    use interview_core::time::{fixed_clock, fixed_now};

    fn sample_session() -> CandidateSession {
        CandidateSession::default()
            .apply(Transition::SetCandidateInfo {
                name: "Linus".into(),
                email: "linus@example.com".into(),
                phone: "+358 40 1234567".into(),
                resume_filename: Some("linus.docx".into()),
            })
            .apply(Transition::SetTimer { duration_secs: 20 })
            .apply(Transition::SetTimeLeft { seconds: 11 })
            .apply(Transition::AppendAnswer {
                question: "What is a trait?".into(),
                answer_text: "Shared behaviour".into(),
                difficulty: Difficulty::Easy,
                attended: true,
                reason: AnswerReason::Submitted,
            })
            .apply(Transition::SetTimer { duration_secs: 60 })
            .apply(Transition::SetTimeLeft { seconds: 37 })
            .apply(Transition::PauseSession)
    }

    fn store() -> (InMemoryRepository, SessionStore) {
        let repo = InMemoryRepository::new();
        let store = SessionStore::new(Arc::new(repo.clone())).with_clock(fixed_clock());
        (repo, store)
    }

    #[tokio::test]
    async fn save_then_load_is_identity() {
        let (_repo, store) = store();
        let session = sample_session();
        store.save(&session).await;
        assert_eq!(store.load().await, Some(session));
    }

    #[tokio::test]
    async fn empty_slot_loads_nothing() {
        let (_repo, store) = store();
        assert_eq!(store.load().await, None);
    }

    #[tokio::test]
    async fn corrupt_payloads_load_nothing() {
        let (repo, store) = store();
        let encoded = encode_session(&sample_session(), fixed_now()).unwrap();
        let truncated = &encoded[..encoded.len() / 2];

        for raw in [
            truncated,
            "not json",
            "null",
            "{}",
            r#"{"candidate": 7}"#,
            r#"{"other": {"name": "x"}}"#,
        ] {
            repo.set(SESSION_KEY, raw).await.unwrap();
            assert_eq!(store.load().await, None, "payload {raw:?}");
        }
    }

    #[tokio::test]
    async fn index_mismatch_loads_nothing() {
        let (repo, store) = store();
        let mut value: serde_json::Value =
            serde_json::from_str(&encode_session(&sample_session(), fixed_now()).unwrap()).unwrap();
        value["candidate"]["currentQuestion"] = serde_json::json!(3);
        repo.set(SESSION_KEY, &value.to_string()).await.unwrap();
        assert_eq!(store.load().await, None);
    }

    #[tokio::test]
    async fn snapshot_uses_persisted_field_names() {
        let (repo, store) = store();
        store.save(&sample_session()).await;
        let raw = repo.get(SESSION_KEY).await.unwrap().unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();

        let candidate = &value["candidate"];
        assert_eq!(candidate["resumeFilename"], "linus.docx");
        assert_eq!(candidate["currentQuestion"], 1);
        assert_eq!(candidate["currentDuration"], 60);
        assert_eq!(candidate["timeLeft"], 37);
        assert_eq!(candidate["paused"], true);
        assert_eq!(candidate["progressSaved"], true);
        assert_eq!(candidate["answers"][0]["timeSpent"], 9);
        assert_eq!(value["savedAt"], "2023-11-14T22:13:20Z");
    }

    #[tokio::test]
    async fn snapshot_without_timestamp_or_filename_still_loads() {
        let (repo, store) = store();
        let raw = r#"{
            "candidate": {
                "name": "", "email": "", "phone": "",
                "answers": [], "currentQuestion": 0,
                "progressSaved": false, "currentDuration": 0,
                "timeLeft": 0, "paused": false
            },
            "ui": {"tab": "dashboard"}
        }"#;
        repo.set(SESSION_KEY, raw).await.unwrap();
        assert_eq!(store.load().await, Some(CandidateSession::default()));
    }

    #[tokio::test]
    async fn question_cache_requires_full_set() {
        let repo = InMemoryRepository::new();
        let cache = QuestionCache::new(Arc::new(repo.clone()));
        let questions: Vec<Question> = (0..INTERVIEW_QUESTION_COUNT)
            .map(|i| Question::new(format!("Q{i}"), Difficulty::Medium))
            .collect();

        cache.save(&questions[..5]).await;
        assert_eq!(cache.load().await, None);

        cache.save(&questions).await;
        assert_eq!(cache.load().await, Some(questions));

        cache.clear().await;
        assert_eq!(cache.load().await, None);
    }

    #[tokio::test]
    async fn malformed_question_cache_is_ignored() {
        let repo = InMemoryRepository::new();
        let cache = QuestionCache::new(Arc::new(repo.clone()));
        repo.set(QUESTIONS_KEY, "[{\"text\": 1}]").await.unwrap();
        assert_eq!(cache.load().await, None);
    }

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Scored {
        score: u32,
        summary: String,
    }

    #[tokio::test]
    async fn result_slot_round_trips_and_clears() {
        let repo = InMemoryRepository::new();
        let slot = ResultSlot::new(Arc::new(repo.clone()));
        assert_eq!(slot.load::<Scored>().await, None);

        let scored = Scored {
            score: 81,
            summary: "Clear answers".into(),
        };
        slot.save(&scored).await;
        assert_eq!(slot.load::<Scored>().await, Some(scored));

        repo.set(RESULT_KEY, "{\"score\": \"high\"}").await.unwrap();
        assert_eq!(slot.load::<Scored>().await, None);

        slot.clear().await;
        assert_eq!(repo.get(RESULT_KEY).await.unwrap(), None);
    }
}
