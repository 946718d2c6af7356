//! Shared error types for the services crate.

use thiserror::Error;

use crate::sessions::FlowPhase;

/// Errors emitted while reading configuration.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("invalid API base URL: {0}")]
    InvalidBaseUrl(String),
    #[error("invalid API timeout: {0}")]
    InvalidTimeout(String),
}

/// Errors emitted by the interview collaborator client.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ApiError {
    #[error("cannot connect to server")]
    Unreachable,
    #[error("request timed out")]
    Timeout,
    #[error("server error ({status}): {message}")]
    Server {
        status: reqwest::StatusCode,
        message: String,
    },
    #[error("unexpected response: {0}")]
    InvalidResponse(String),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

impl ApiError {
    /// Sort a transport error into the categories shown to the candidate.
    pub(crate) fn from_transport(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ApiError::Timeout
        } else if err.is_connect() {
            ApiError::Unreachable
        } else if err.is_decode() {
            ApiError::InvalidResponse(err.to_string())
        } else {
            ApiError::Http(err)
        }
    }
}

/// Errors emitted by `InterviewFlow`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum FlowError {
    #[error("{action} is not available during the {phase} step")]
    WrongPhase {
        action: &'static str,
        phase: FlowPhase,
    },
    #[error("there is no unfinished interview to resume")]
    NothingToResume,
    #[error("choose whether to resume or start a new interview first")]
    ResumeDecisionPending,
    #[error("type an answer to submit")]
    EmptyAnswer,
    #[error("no question is waiting for an answer")]
    NoActiveQuestion,
    #[error(transparent)]
    Invalid(#[from] interview_core::Error),
    #[error(transparent)]
    Api(#[from] ApiError),
}
