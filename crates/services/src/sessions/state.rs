use std::mem;

use interview_core::model::{CandidateSession, Transition};
use storage::SessionStore;

/// Owns the live session and persists it after every transition.
///
/// `dispatch` is the only way to change the session; readers get whole
/// states through `session()`.
pub struct SessionState {
    session: CandidateSession,
    store: SessionStore,
}

impl SessionState {
    /// Restore the saved session, or start from defaults.
    pub async fn restore(store: SessionStore) -> Self {
        let session = store.load().await.unwrap_or_default();
        Self { session, store }
    }

    #[must_use]
    pub fn session(&self) -> &CandidateSession {
        &self.session
    }

    /// Apply one transition, then snapshot the result.
    pub async fn dispatch(&mut self, transition: Transition) -> &CandidateSession {
        let name = transition.name();
        self.session = mem::take(&mut self.session).apply(transition);
        tracing::debug!(
            transition = name,
            question_index = self.session.current_question_index(),
            time_left = self.session.time_left_secs(),
            "session transition"
        );
        self.store.save(&self.session).await;
        &self.session
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use interview_core::model::{AnswerReason, Difficulty};
    use storage::{KeyValueStore, Storage, StorageError};

    use super::*;

    struct FullDisk;

    #[async_trait]
    impl KeyValueStore for FullDisk {
        async fn get(&self, _key: &str) -> Result<Option<String>, StorageError> {
            Err(StorageError::Connection("offline".into()))
        }

        async fn set(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
            Err(StorageError::QuotaExceeded)
        }

        async fn remove(&self, _key: &str) -> Result<(), StorageError> {
            Err(StorageError::QuotaExceeded)
        }
    }

    fn answer() -> Transition {
        Transition::AppendAnswer {
            question: "Explain closures".into(),
            answer_text: "They capture".into(),
            difficulty: Difficulty::Medium,
            attended: true,
            reason: AnswerReason::Submitted,
        }
    }

    #[tokio::test]
    async fn dispatch_persists_every_transition() {
        let backend = Storage::in_memory();
        let mut state = SessionState::restore(backend.session_store()).await;
        state.dispatch(Transition::SetTimer { duration_secs: 60 }).await;
        state.dispatch(answer()).await;

        let reloaded = SessionState::restore(backend.session_store()).await;
        assert_eq!(reloaded.session(), state.session());
        assert_eq!(reloaded.session().current_question_index(), 1);
    }

    #[tokio::test]
    async fn failing_store_does_not_break_dispatch() {
        let slots: Arc<dyn KeyValueStore> = Arc::new(FullDisk);
        let mut state = SessionState::restore(SessionStore::new(slots)).await;
        assert_eq!(state.session(), &CandidateSession::default());

        let session = state.dispatch(answer()).await;
        assert_eq!(session.answers().len(), 1);
        state.dispatch(Transition::PauseSession).await;
        assert!(state.session().is_paused());
    }
}
