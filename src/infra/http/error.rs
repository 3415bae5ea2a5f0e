use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use crate::application::error::SeoError;
use crate::application::redirects::RedirectDenial;

#[derive(Debug, Serialize)]
pub struct ApiErrorBody {
    pub error: ApiErrorMessage,
}

pub mod codes {
    pub const BAD_REQUEST: &str = "bad_request";
    pub const UNAUTHORIZED: &str = "unauthorized";
    pub const FORBIDDEN: &str = "forbidden";
    pub const NOT_FOUND: &str = "not_found";
    pub const INVALID_PATH: &str = "invalid_path";
    pub const SLUG_CONFLICT: &str = "slug_conflict";
    pub const SECURITY_VALIDATION: &str = "security_validation_failed";
    pub const BULK_LIMIT: &str = "bulk_limit_exceeded";
    pub const INVALID_INPUT: &str = "invalid_input";
    pub const REDIRECT_LOOP: &str = "redirect_loop";
    pub const REDIRECT_CHAIN: &str = "redirect_chain_too_long";
    pub const REDIRECT_EXISTS: &str = "redirect_exists";
    pub const REPO: &str = "persistence_error";
}

#[derive(Debug, Serialize)]
pub struct ApiErrorMessage {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    /// Structured payload for errors that carry one, e.g. the threat list
    /// behind a security rejection.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    code: &'static str,
    message: String,
    hint: Option<String>,
    details: Option<serde_json::Value>,
}

impl ApiError {
    pub fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
            hint: None,
            details: None,
        }
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, codes::BAD_REQUEST, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, codes::UNAUTHORIZED, message)
    }

    pub fn from_denial(denial: &RedirectDenial) -> Self {
        let code = match denial {
            RedirectDenial::Loop { .. } => codes::REDIRECT_LOOP,
            RedirectDenial::ChainTooLong { .. } => codes::REDIRECT_CHAIN,
            RedirectDenial::AlreadyExists { .. } => codes::REDIRECT_EXISTS,
        };
        Self::new(StatusCode::CONFLICT, code, denial.to_string())
            .with_details(serde_json::to_value(denial).unwrap_or(serde_json::Value::Null))
    }
}

impl From<SeoError> for ApiError {
    fn from(err: SeoError) -> Self {
        match &err {
            SeoError::AccessDenied(_) => {
                Self::new(StatusCode::FORBIDDEN, codes::FORBIDDEN, err.to_string())
            }
            SeoError::InvalidPath { .. } => {
                Self::new(StatusCode::NOT_FOUND, codes::INVALID_PATH, err.to_string())
            }
            SeoError::SlugConflict { .. } => {
                Self::new(StatusCode::CONFLICT, codes::SLUG_CONFLICT, err.to_string())
            }
            SeoError::SecurityValidationFailed { threats } => Self::new(
                StatusCode::UNPROCESSABLE_ENTITY,
                codes::SECURITY_VALIDATION,
                err.to_string(),
            )
            .with_details(serde_json::to_value(threats).unwrap_or(serde_json::Value::Null)),
            SeoError::BulkLimitExceeded { .. } => {
                Self::new(StatusCode::BAD_REQUEST, codes::BULK_LIMIT, err.to_string())
            }
            SeoError::NotFound { .. } => {
                Self::new(StatusCode::NOT_FOUND, codes::NOT_FOUND, err.to_string())
            }
            SeoError::Validation { .. } => {
                Self::new(StatusCode::BAD_REQUEST, codes::INVALID_INPUT, err.to_string())
            }
            // Repository details stay in the logs; the response is generic.
            SeoError::Persistence(_) => Self::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                codes::REPO,
                "persistence failure",
            ),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ApiErrorBody {
            error: ApiErrorMessage {
                code: self.code.to_string(),
                message: self.message,
                hint: self.hint,
                details: self.details,
            },
        };
        (self.status, Json(body)).into_response()
    }
}
