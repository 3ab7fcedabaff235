//! Fetch failures, reduced to cloneable values so one result can be shared by
//! every caller waiting on the same request.

use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;

/// Upper bound on how much of an error body is kept.
pub(crate) const MAX_ERROR_BODY_BYTES: usize = 4 * 1024;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    #[error("could not reach the catalog backend: {0}")]
    Transport(String),
    #[error("the catalog backend did not respond in time")]
    Timeout,
    #[error("catalog backend returned {status}{}", message.as_deref().map(|m| format!(": {m}")).unwrap_or_default())]
    Status {
        status: u16,
        message: Option<String>,
    },
    #[error("catalog backend sent a malformed response: {0}")]
    Decode(String),
    #[error("invalid catalog url: {0}")]
    InvalidUrl(String),
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

impl ApiError {
    pub(crate) fn from_reqwest(err: &reqwest::Error) -> Self {
        if err.is_timeout() {
            ApiError::Timeout
        } else if err.is_decode() {
            ApiError::Decode(err.to_string())
        } else {
            ApiError::Transport(err.to_string())
        }
    }

    /// Build a status error, lifting `{"message": "..."}` out of the body when present.
    pub(crate) fn from_status(status: StatusCode, body: &str) -> Self {
        let message = serde_json::from_str::<ErrorBody>(body)
            .ok()
            .and_then(|parsed| parsed.message)
            .map(|m| m.trim().to_string())
            .filter(|m| !m.is_empty());
        ApiError::Status {
            status: status.as_u16(),
            message,
        }
    }

    /// Short headline for an error panel.
    #[must_use]
    pub fn headline(&self) -> &'static str {
        match self {
            ApiError::Transport(_) => "Network error",
            ApiError::Timeout => "Request timed out",
            ApiError::Status { status, .. } if *status == 404 => "Not found",
            ApiError::Status { status, .. } if *status >= 500 => "Server error",
            ApiError::Status { .. } => "Request failed",
            ApiError::Decode(_) => "Unexpected response",
            ApiError::InvalidUrl(_) => "Invalid backend URL",
        }
    }

    /// Backend-supplied or transport detail, if any.
    #[must_use]
    pub fn detail(&self) -> Option<&str> {
        match self {
            ApiError::Transport(detail) | ApiError::Decode(detail) | ApiError::InvalidUrl(detail) => {
                Some(detail)
            }
            ApiError::Status { message, .. } => message.as_deref(),
            ApiError::Timeout => None,
        }
    }

    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::Status { status: 404, .. })
    }
}
