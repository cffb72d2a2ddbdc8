use crib_common::ProfileId;
use thiserror::Error;

use crate::registration::ValidationError;

/// Failures reported by a backend capability.
#[derive(Error, Debug)]
pub enum BackendError {
    #[error("backend unreachable: {0}")]
    Unreachable(String),

    #[error("{collection}/{id} not found")]
    NotFound { collection: String, id: String },

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("malformed document: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("storage error: {0}")]
    Storage(String),
}

#[derive(Error, Debug)]
pub enum ClientError {
    #[error(transparent)]
    Backend(#[from] BackendError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("profile {0} does not exist")]
    MissingProfile(ProfileId),

    #[error("profile has no internship city")]
    MissingCity,
}

impl ClientError {
    /// Precondition failures abort the operation without telling the user.
    pub fn is_precondition(&self) -> bool {
        matches!(self, ClientError::MissingProfile(_) | ClientError::MissingCity)
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        ClientError::Backend(BackendError::Malformed(err))
    }
}

pub type Result<T> = std::result::Result<T, ClientError>;
