#![forbid(unsafe_code)]

pub mod repository;
pub mod snapshot;
pub mod sqlite;

pub use repository::{InMemoryRepository, KeyValueStore, Storage, StorageError};
pub use snapshot::{QuestionCache, ResultSlot, SessionStore};

impl Storage {
    /// Persistent store for the candidate session, sharing this backend.
    #[must_use]
    pub fn session_store(&self) -> SessionStore {
        SessionStore::new(std::sync::Arc::clone(&self.slots))
    }

    /// Question cache sharing this backend.
    #[must_use]
    pub fn question_cache(&self) -> QuestionCache {
        QuestionCache::new(std::sync::Arc::clone(&self.slots))
    }

    /// Slot for the scoring result, sharing this backend.
    #[must_use]
    pub fn result_slot(&self) -> ResultSlot {
        ResultSlot::new(std::sync::Arc::clone(&self.slots))
    }
}
