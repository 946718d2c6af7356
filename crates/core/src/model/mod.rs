mod answer;
mod profile;
mod question;
mod resume;
mod session;

pub use answer::{AnswerReason, AnswerRecord};
pub use profile::{
    CandidateProfile, ProfileDraft, ProfileError, ProfileField, is_valid_email, is_valid_phone,
};
pub use question::{Difficulty, INTERVIEW_QUESTION_COUNT, Question};
pub use resume::{
    MAX_RESUME_BYTES, ResumeFormat, ResumeUpload, UploadError, check_size, detect_format,
};
pub use session::{CandidateSession, SessionParts, SessionStateError, Transition};
