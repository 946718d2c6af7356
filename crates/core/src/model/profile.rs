use regex::Regex;
use std::fmt;
use std::sync::LazyLock;
use thiserror::Error;

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r".+@.+\..+").expect("email pattern is valid"));

static PHONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+?\d[\d\s\-]{7,}$").expect("phone pattern is valid"));

//
// ─── ERRORS ───────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ProfileError {
    #[error("name cannot be empty")]
    MissingName,

    #[error("enter a valid email")]
    InvalidEmail,

    #[error("enter a valid phone")]
    InvalidPhone,
}

impl ProfileError {
    /// The input the error should be reported next to.
    #[must_use]
    pub fn field(&self) -> ProfileField {
        match self {
            ProfileError::MissingName => ProfileField::Name,
            ProfileError::InvalidEmail => ProfileField::Email,
            ProfileError::InvalidPhone => ProfileField::Phone,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileField {
    Name,
    Email,
    Phone,
}

impl fmt::Display for ProfileField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ProfileField::Name => "Name",
            ProfileField::Email => "Email",
            ProfileField::Phone => "Phone",
        })
    }
}

//
// ─── DRAFT ────────────────────────────────────────────────────────────────────
//

/// Editable contact details, prefilled from the parsed resume.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileDraft {
    pub name: String,
    pub email: String,
    pub phone: String,
}

/// Contact details that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateProfile {
    name: String,
    email: String,
    phone: String,
}

impl ProfileDraft {
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        phone: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            phone: phone.into(),
        }
    }

    /// Fields that are still blank, in form order.
    #[must_use]
    pub fn missing_fields(&self) -> Vec<ProfileField> {
        let mut missing = Vec::new();
        if self.name.trim().is_empty() {
            missing.push(ProfileField::Name);
        }
        if self.email.trim().is_empty() {
            missing.push(ProfileField::Email);
        }
        if self.phone.trim().is_empty() {
            missing.push(ProfileField::Phone);
        }
        missing
    }

    /// Validate the draft.
    ///
    /// # Errors
    ///
    /// Returns the first failing field, checked in form order.
    pub fn validate(self) -> Result<CandidateProfile, ProfileError> {
        let name = self.name.trim().to_string();
        let email = self.email.trim().to_string();
        let phone = self.phone.trim().to_string();

        if name.is_empty() {
            return Err(ProfileError::MissingName);
        }
        if !is_valid_email(&email) {
            return Err(ProfileError::InvalidEmail);
        }
        if !is_valid_phone(&phone) {
            return Err(ProfileError::InvalidPhone);
        }

        Ok(CandidateProfile { name, email, phone })
    }
}

impl CandidateProfile {
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn email(&self) -> &str {
        &self.email
    }

    #[must_use]
    pub fn phone(&self) -> &str {
        &self.phone
    }
}

/// Loose `local@domain.tld` shape check.
#[must_use]
pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

/// Optional leading `+`, a digit, then at least seven digits, spaces or hyphens.
#[must_use]
pub fn is_valid_phone(phone: &str) -> bool {
    PHONE_RE.is_match(phone)
}
