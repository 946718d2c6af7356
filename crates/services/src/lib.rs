#![forbid(unsafe_code)]

pub mod api;
pub mod config;
pub mod error;
pub mod sessions;
pub mod timer;

pub use interview_core::Clock;

pub use api::{HttpInterviewApi, InterviewApi, InterviewResult, InterviewSubmission, ParsedResume};
pub use config::ApiConfig;
pub use error::{ApiError, ConfigError, FlowError};
pub use sessions::{
    CompletionSummary, FlowPhase, InterviewFlow, InterviewScreen, QuestionPrompt, ResumePrompt,
    SessionState, SubmissionStatus,
};
pub use timer::{Countdown, CountdownState, TimerEvent};
