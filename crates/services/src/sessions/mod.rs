mod screen;
mod state;
mod workflow;

// Public API of the session subsystem.
pub use screen::{CompletionSummary, InterviewScreen, QuestionPrompt, SubmissionStatus};
pub use state::SessionState;
pub use workflow::{FlowPhase, InterviewFlow, ResumePrompt};
