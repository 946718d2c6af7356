use thiserror::Error;

use crate::model::{ProfileError, SessionStateError, UploadError};

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error(transparent)]
    SessionState(#[from] SessionStateError),
    #[error(transparent)]
    Profile(#[from] ProfileError),
    #[error(transparent)]
    Upload(#[from] UploadError),
}
