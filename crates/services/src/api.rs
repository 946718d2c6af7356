//! Client for the external interview collaborator: question generation,
//! resume parsing and answer scoring.

use async_trait::async_trait;
use interview_core::model::{AnswerRecord, CandidateSession, Question, ResumeUpload};
use reqwest::Client;
use reqwest::multipart::{Form, Part};
use serde::{Deserialize, Serialize};

use crate::config::ApiConfig;
use crate::error::ApiError;

//
// ─── CONTRACT ─────────────────────────────────────────────────────────────────
//

/// Contact fields the resume parser managed to extract.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ParsedFields {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

impl ParsedFields {
    /// True when the parser found all three contact fields.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        [&self.name, &self.email, &self.phone]
            .iter()
            .all(|field| field.as_deref().is_some_and(|v| !v.trim().is_empty()))
    }
}

/// Resume parser response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ParsedResume {
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub parsed_fields: ParsedFields,
}

/// Everything the scoring collaborator needs for one completed interview.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InterviewSubmission {
    pub name: String,
    pub email: String,
    pub phone: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resume: Option<String>,
    pub answers: Vec<AnswerRecord>,
}

impl InterviewSubmission {
    #[must_use]
    pub fn from_session(session: &CandidateSession) -> Self {
        Self {
            name: session.name().to_string(),
            email: session.email().to_string(),
            phone: session.phone().to_string(),
            resume: session.resume_filename().map(ToString::to_string),
            answers: session.answers().to_vec(),
        }
    }
}

/// Score and summary returned for a submitted interview.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterviewResult {
    pub score: f64,
    pub summary: String,
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub attended: Option<u32>,
    #[serde(default)]
    pub total: Option<u32>,
}

/// Request/response contract of the interview collaborator.
#[async_trait]
pub trait InterviewApi: Send + Sync {
    /// Fetch a fresh, ordered question sequence.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` for transport failures, server errors, or an empty
    /// or malformed question list.
    async fn generate_questions(&self) -> Result<Vec<Question>, ApiError>;

    /// Send a validated resume to the parser.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` for transport failures or server rejections.
    async fn parse_resume(&self, upload: &ResumeUpload) -> Result<ParsedResume, ApiError>;

    /// Hand a completed interview to the scoring collaborator.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` for transport failures or server rejections.
    async fn submit_answers(
        &self,
        submission: &InterviewSubmission,
    ) -> Result<InterviewResult, ApiError>;
}

//
// ─── HTTP CLIENT ──────────────────────────────────────────────────────────────
//

#[derive(Debug, Deserialize)]
struct QuestionDto {
    text: String,
    #[serde(default)]
    difficulty: String,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum QuestionsResponse {
    Wrapped { questions: Vec<QuestionDto> },
    Bare(Vec<QuestionDto>),
}

impl QuestionsResponse {
    fn into_questions(self) -> Vec<Question> {
        let dtos = match self {
            QuestionsResponse::Wrapped { questions } | QuestionsResponse::Bare(questions) => {
                questions
            }
        };
        dtos.into_iter()
            .map(|dto| Question::from_label(dto.text, &dto.difficulty))
            .collect()
    }
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

/// `InterviewApi` over HTTP.
#[derive(Clone)]
pub struct HttpInterviewApi {
    client: Client,
    config: ApiConfig,
}

impl HttpInterviewApi {
    /// # Errors
    ///
    /// Returns `ApiError::Http` if the HTTP client cannot be built.
    pub fn new(config: ApiConfig) -> Result<Self, ApiError> {
        let client = Client::builder().timeout(config.timeout()).build()?;
        Ok(Self { client, config })
    }

    #[must_use]
    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    async fn check(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let message = match response.json::<ErrorBody>().await {
            Ok(body) => body.error,
            Err(_) => status
                .canonical_reason()
                .unwrap_or("request failed")
                .to_string(),
        };
        Err(ApiError::Server { status, message })
    }
}

#[async_trait]
impl InterviewApi for HttpInterviewApi {
    async fn generate_questions(&self) -> Result<Vec<Question>, ApiError> {
        let response = self
            .client
            .get(self.config.endpoint("generate-questions/"))
            .send()
            .await
            .map_err(ApiError::from_transport)?;
        let body: QuestionsResponse = Self::check(response)
            .await?
            .json()
            .await
            .map_err(ApiError::from_transport)?;

        let questions = body.into_questions();
        if questions.is_empty() {
            return Err(ApiError::InvalidResponse("no questions returned".into()));
        }
        tracing::info!(count = questions.len(), "fetched interview questions");
        Ok(questions)
    }

    async fn parse_resume(&self, upload: &ResumeUpload) -> Result<ParsedResume, ApiError> {
        let part = Part::bytes(upload.bytes().to_vec())
            .file_name(upload.filename().to_string())
            .mime_str(upload.format().mime_type())?;
        let form = Form::new().part("resume", part);

        let response = self
            .client
            .post(self.config.endpoint("resume-upload/"))
            .multipart(form)
            .send()
            .await
            .map_err(ApiError::from_transport)?;
        let parsed: ParsedResume = Self::check(response)
            .await?
            .json()
            .await
            .map_err(ApiError::from_transport)?;

        tracing::info!(
            filename = upload.filename(),
            complete = parsed.parsed_fields.is_complete(),
            "resume parsed"
        );
        Ok(parsed)
    }

    async fn submit_answers(
        &self,
        submission: &InterviewSubmission,
    ) -> Result<InterviewResult, ApiError> {
        let response = self
            .client
            .post(self.config.endpoint("submit-answers/"))
            .json(submission)
            .send()
            .await
            .map_err(ApiError::from_transport)?;
        let result: InterviewResult = Self::check(response)
            .await?
            .json()
            .await
            .map_err(ApiError::from_transport)?;

        tracing::info!(score = result.score, "interview scored");
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use interview_core::model::{AnswerReason, Difficulty, Transition};

    #[test]
    fn questions_accept_wrapped_and_bare_shapes() {
        let wrapped = r#"{"questions": [
            {"text": "A", "difficulty": "Easy", "time": 20},
            {"text": "B", "difficulty": "Hard", "time": 120}
        ]}"#;
        let bare = r#"[{"text": "C", "difficulty": "Medium"}]"#;

        let wrapped: QuestionsResponse = serde_json::from_str(wrapped).unwrap();
        let wrapped = wrapped.into_questions();
        assert_eq!(wrapped.len(), 2);
        assert_eq!(wrapped[1].difficulty(), Difficulty::Hard);
        assert_eq!(wrapped[1].time_limit_secs(), 120);

        let bare: QuestionsResponse = serde_json::from_str(bare).unwrap();
        assert_eq!(bare.into_questions()[0].time_limit_secs(), 60);
    }

    #[test]
    fn missing_difficulty_uses_fallback_budget() {
        let body: QuestionsResponse = serde_json::from_str(r#"[{"text": "D"}]"#).unwrap();
        assert_eq!(body.into_questions()[0].time_limit_secs(), 30);
    }

    #[test]
    fn parsed_resume_tolerates_missing_fields() {
        let parsed: ParsedResume =
            serde_json::from_str(r#"{"filename": "cv.pdf", "parsed_fields": {"email": "a@b.co"}}"#)
                .unwrap();
        assert_eq!(parsed.filename.as_deref(), Some("cv.pdf"));
        assert_eq!(parsed.parsed_fields.email.as_deref(), Some("a@b.co"));
        assert_eq!(parsed.parsed_fields.name, None);
        assert!(!parsed.parsed_fields.is_complete());
    }

    #[test]
    fn submission_mirrors_session() {
        let session = CandidateSession::default()
            .apply(Transition::SetCandidateInfo {
                name: "Ken".into(),
                email: "ken@example.com".into(),
                phone: "12345678".into(),
                resume_filename: None,
            })
            .apply(Transition::AppendAnswer {
                question: "Q".into(),
                answer_text: String::new(),
                difficulty: Difficulty::Easy,
                attended: false,
                reason: AnswerReason::Skipped,
            });

        let value = serde_json::to_value(InterviewSubmission::from_session(&session)).unwrap();
        assert_eq!(value["name"], "Ken");
        assert!(value.get("resume").is_none());
        assert_eq!(value["answers"][0]["reason"], "skipped");
    }

    #[test]
    fn result_reads_optional_counters() {
        let result: InterviewResult =
            serde_json::from_str(r#"{"score": 58, "summary": "ok", "attended": 4, "total": 6}"#)
                .unwrap();
        assert!((result.score - 58.0).abs() < f64::EPSILON);
        assert_eq!(result.total, Some(6));
        assert_eq!(result.id, None);
    }
}
