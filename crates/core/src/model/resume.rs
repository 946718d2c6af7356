use std::path::Path;
use thiserror::Error;

/// Largest resume accepted for upload (10 MiB).
pub const MAX_RESUME_BYTES: u64 = 10 * 1024 * 1024;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum UploadError {
    #[error("please select a file")]
    MissingFile,

    #[error("invalid file type, please upload a PDF or DOCX file")]
    UnsupportedType,

    #[error("file too large, maximum size is 10MB")]
    TooLarge { size: u64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResumeFormat {
    Pdf,
    Docx,
}

impl ResumeFormat {
    /// MIME type sent along with the upload.
    #[must_use]
    pub fn mime_type(self) -> &'static str {
        match self {
            ResumeFormat::Pdf => "application/pdf",
            ResumeFormat::Docx => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
        }
    }
}

/// A resume file that passed client-side checks and may be sent to the parser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResumeUpload {
    filename: String,
    format: ResumeFormat,
    bytes: Vec<u8>,
}

impl ResumeUpload {
    /// Check the file name and size before anything is sent.
    ///
    /// # Errors
    ///
    /// Returns `UploadError` for an empty name, an extension other than
    /// `.pdf`/`.docx`, or a file larger than [`MAX_RESUME_BYTES`].
    pub fn new(filename: impl Into<String>, bytes: Vec<u8>) -> Result<Self, UploadError> {
        let filename = filename.into();
        let format = detect_format(&filename)?;
        let size = u64::try_from(bytes.len()).unwrap_or(u64::MAX);
        check_size(size)?;
        Ok(Self {
            filename,
            format,
            bytes,
        })
    }

    #[must_use]
    pub fn filename(&self) -> &str {
        &self.filename
    }

    #[must_use]
    pub fn format(&self) -> ResumeFormat {
        self.format
    }

    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

/// Classify a file by its extension (case-insensitive).
///
/// # Errors
///
/// Returns `UploadError::MissingFile` for a blank name and
/// `UploadError::UnsupportedType` for any other extension.
pub fn detect_format(filename: &str) -> Result<ResumeFormat, UploadError> {
    if filename.trim().is_empty() {
        return Err(UploadError::MissingFile);
    }
    let extension = Path::new(filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);
    match extension.as_deref() {
        Some("pdf") => Ok(ResumeFormat::Pdf),
        Some("docx") => Ok(ResumeFormat::Docx),
        _ => Err(UploadError::UnsupportedType),
    }
}

/// # Errors
///
/// Returns `UploadError::TooLarge` above [`MAX_RESUME_BYTES`].
pub fn check_size(size: u64) -> Result<(), UploadError> {
    if size > MAX_RESUME_BYTES {
        return Err(UploadError::TooLarge { size });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_pdf_and_docx_in_any_case() {
        assert_eq!(detect_format("cv.pdf").unwrap(), ResumeFormat::Pdf);
        assert_eq!(detect_format("CV.PDF").unwrap(), ResumeFormat::Pdf);
        assert_eq!(detect_format("resume.final.Docx").unwrap(), ResumeFormat::Docx);
    }

    #[test]
    fn rejects_other_types() {
        assert_eq!(detect_format("cv.doc"), Err(UploadError::UnsupportedType));
        assert_eq!(detect_format("cv"), Err(UploadError::UnsupportedType));
        assert_eq!(detect_format("  "), Err(UploadError::MissingFile));
    }

    #[test]
    fn size_limit_is_inclusive() {
        assert!(check_size(MAX_RESUME_BYTES).is_ok());
        assert_eq!(
            check_size(MAX_RESUME_BYTES + 1),
            Err(UploadError::TooLarge {
                size: MAX_RESUME_BYTES + 1
            })
        );
    }

    #[test]
    fn upload_keeps_bytes() {
        let upload = ResumeUpload::new("ada.pdf", b"%PDF-1.7".to_vec()).unwrap();
        assert_eq!(upload.filename(), "ada.pdf");
        assert_eq!(upload.format().mime_type(), "application/pdf");
        assert_eq!(upload.bytes(), b"%PDF-1.7");
    }
}
