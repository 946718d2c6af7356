use interview_core::model::{AnswerReason, CandidateSession, Difficulty, Question, Transition};
use interview_core::time::fixed_clock;
use storage::repository::KeyValueStore;
use storage::snapshot::{QUESTIONS_KEY, SESSION_KEY};
use storage::sqlite::SqliteSlotStore;
use storage::Storage;

async fn connect(name: &str) -> SqliteSlotStore {
    let url = format!("sqlite:file:{name}?mode=memory&cache=shared");
    SqliteSlotStore::open(&url).await.expect("open")
}

#[tokio::test]
async fn sqlite_slots_round_trip() {
    let repo = connect("memdb_slots").await;

    assert_eq!(repo.get("missing").await.unwrap(), None);
    repo.set("greeting", "hello").await.unwrap();
    repo.set("greeting", "hej").await.unwrap();
    assert_eq!(repo.get("greeting").await.unwrap().as_deref(), Some("hej"));

    repo.remove("greeting").await.unwrap();
    assert_eq!(repo.get("greeting").await.unwrap(), None);
}

#[tokio::test]
async fn migrations_are_idempotent() {
    let repo = connect("memdb_migrate_twice").await;
    repo.set("k", "v").await.unwrap();
    repo.migrate().await.expect("second migrate");
    assert_eq!(repo.get("k").await.unwrap().as_deref(), Some("v"));
}

#[tokio::test]
async fn session_survives_reconnect() {
    let url = "sqlite:file:memdb_session_reload?mode=memory&cache=shared";
    let first = Storage::sqlite(url).await.expect("open");
    // Keep one connection alive so the shared in-memory database persists.
    let _keepalive = SqliteSlotStore::connect(url).await.expect("keepalive");

    let session = CandidateSession::default()
        .apply(Transition::SetCandidateInfo {
            name: "Barbara".into(),
            email: "barbara@example.com".into(),
            phone: "0123 456 789".into(),
            resume_filename: None,
        })
        .apply(Transition::SetTimer { duration_secs: 120 })
        .apply(Transition::SetTimeLeft { seconds: 100 })
        .apply(Transition::AppendAnswer {
            question: "Design a cache.".into(),
            answer_text: "LRU with TTL".into(),
            difficulty: Difficulty::Hard,
            attended: true,
            reason: AnswerReason::NextWithAnswer,
        });
    first.session_store().with_clock(fixed_clock()).save(&session).await;

    let second = Storage::sqlite(url).await.expect("reopen");
    let restored = second.session_store().load().await;
    assert_eq!(restored, Some(session));
    assert!(second.slots.get(SESSION_KEY).await.unwrap().is_some());
}

#[tokio::test]
async fn question_cache_on_sqlite() {
    let url = "sqlite:file:memdb_questions?mode=memory&cache=shared";
    let storage = Storage::sqlite(url).await.expect("open");
    let cache = storage.question_cache();

    let questions: Vec<Question> = ["Easy", "Easy", "Medium", "Medium", "Hard", "Hard"]
        .iter()
        .enumerate()
        .map(|(i, label)| Question::from_label(format!("Question {i}"), label))
        .collect();
    cache.save(&questions).await;
    assert_eq!(cache.load().await, Some(questions));

    cache.clear().await;
    assert_eq!(storage.slots.get(QUESTIONS_KEY).await.unwrap(), None);
}
