//! The operation error taxonomy shared by every service in this crate.

use thiserror::Error;

use crate::domain::security::FieldThreat;

use super::principal::AccessDenied;
use super::repos::RepoError;

#[derive(Debug, Error)]
pub enum SeoError {
    #[error(transparent)]
    AccessDenied(#[from] AccessDenied),
    #[error("path `{path}` is not in the page catalog")]
    InvalidPath { path: String },
    #[error("slug `{slug}` is already in use for this site")]
    SlugConflict { slug: String },
    #[error("content failed security validation ({} threats)", .threats.len())]
    SecurityValidationFailed { threats: Vec<FieldThreat> },
    #[error("bulk operation touches {requested} paths, the limit is {limit}")]
    BulkLimitExceeded { limit: usize, requested: usize },
    #[error("no override record exists for `{path}`")]
    NotFound { path: String },
    #[error("validation failed: {message}")]
    Validation { message: String },
    /// Unexpected store failure. The repo error is kept as the source but
    /// its text never reaches API responses.
    #[error("persistence failure")]
    Persistence(#[source] RepoError),
}

impl SeoError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn invalid_path(path: impl Into<String>) -> Self {
        Self::InvalidPath { path: path.into() }
    }

    pub fn not_found(path: impl Into<String>) -> Self {
        Self::NotFound { path: path.into() }
    }
}

impl From<RepoError> for SeoError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound => SeoError::Validation {
                message: "referenced record no longer exists".to_string(),
            },
            other => SeoError::Persistence(other),
        }
    }
}
