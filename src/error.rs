//! Application error type and its HTTP representation.
//!
//! Every failure a request can hit is one [`AppError`] variant. The variant
//! decides the status code and the `{"error": ...}` body; [`AppError::kind`]
//! groups variants into the coarse [`ErrorKind`] taxonomy used by callers
//! that don't care about HTTP.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use std::time::Duration;

use crate::infrastructure::store::StoreError;
use crate::utils::duration::whole_minutes;

/// Coarse error classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed body, URL, identifier, or a self-referencing target.
    InvalidInput,
    /// Quota exhausted; recoverable after the window resets.
    RateLimited,
    /// Identifier already in use.
    Conflict,
    /// Unknown or expired identifier.
    NotFound,
    /// Backing store unreachable or a write failed.
    StorageError,
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("cannot parse JSON")]
    MalformedBody,

    #[error("invalid URL")]
    InvalidUrl,

    #[error("invalid domain")]
    InvalidDomain,

    #[error("invalid short URL")]
    InvalidShortId,

    #[error("invalid expiry")]
    InvalidExpiry,

    #[error("cannot determine client address")]
    MissingClientAddr,

    #[error("rate limit exceeded")]
    RateLimited { reset_in: Duration },

    #[error("short URL already exists")]
    AlreadyExists,

    #[error("short url not found")]
    NotFound,

    #[error("cannot save URL")]
    SaveFailed(#[source] StoreError),

    #[error("database error")]
    Storage(#[from] StoreError),
}

impl AppError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::MalformedBody
            | Self::InvalidUrl
            | Self::InvalidDomain
            | Self::InvalidShortId
            | Self::InvalidExpiry
            | Self::MissingClientAddr => ErrorKind::InvalidInput,
            Self::RateLimited { .. } => ErrorKind::RateLimited,
            Self::AlreadyExists => ErrorKind::Conflict,
            Self::NotFound => ErrorKind::NotFound,
            Self::SaveFailed(_) | Self::Storage(_) => ErrorKind::StorageError,
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self.kind() {
            ErrorKind::InvalidInput => StatusCode::BAD_REQUEST,
            ErrorKind::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            // Forbidden rather than 409 so existing identifiers are harder to probe.
            ErrorKind::Conflict => StatusCode::FORBIDDEN,
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::StorageError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// JSON body of every error response.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,

    /// Minutes until the quota window resets; only set for 429 responses.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rate_limit_reset: Option<u64>,
}

impl From<&AppError> for ErrorBody {
    fn from(err: &AppError) -> Self {
        let rate_limit_reset = match err {
            AppError::RateLimited { reset_in } => Some(whole_minutes(*reset_in)),
            _ => None,
        };

        Self {
            error: err.to_string(),
            rate_limit_reset,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if status.is_server_error() {
            tracing::error!(error = %self, source = ?std::error::Error::source(&self), "Request failed");
        }

        (status, Json(ErrorBody::from(&self))).into_response()
    }
}
