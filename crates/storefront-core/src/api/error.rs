use std::fmt;

use serde::Deserialize;
use thiserror::Error;

/// Body of a non-success response.
///
/// The catalog API answers failures with `{"message": "..."}`; when the body
/// has that shape the message is kept separately so it can be shown to the
/// user verbatim.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ErrorBody {
    pub message: Option<String>,
    pub raw: String,
}

#[derive(Deserialize)]
struct MessageBody {
    message: Option<String>,
}

impl ErrorBody {
    pub fn parse(body: &str) -> Self {
        let message = serde_json::from_str::<MessageBody>(body)
            .ok()
            .and_then(|b| b.message)
            .filter(|m| !m.trim().is_empty());
        Self {
            message,
            raw: truncate_body(body),
        }
    }
}

impl fmt::Display for ErrorBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.message {
            Some(ref message) => f.write_str(message),
            None => f.write_str(&self.raw),
        }
    }
}

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Bad request: {0}")]
    BadRequest(ErrorBody),

    #[error("Unauthorized: {0}")]
    Unauthorized(ErrorBody),

    #[error("Access denied: {0}")]
    AccessDenied(ErrorBody),

    #[error("Resource not found: {0}")]
    NotFound(ErrorBody),

    #[error("Rate limited - please wait before retrying")]
    RateLimited,

    #[error("Server error: {0}")]
    ServerError(ErrorBody),

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Maximum length for error response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

/// Truncate a response body to avoid logging excessive data
fn truncate_body(body: &str) -> String {
    match body.char_indices().nth(MAX_ERROR_BODY_LENGTH) {
        None => body.to_string(),
        Some((cut, _)) => format!(
            "{}... (truncated, {} total bytes)",
            &body[..cut],
            body.len()
        ),
    }
}

impl ApiError {
    pub fn from_status(status: reqwest::StatusCode, body: &str) -> Self {
        let body = ErrorBody::parse(body);
        match status.as_u16() {
            401 => ApiError::Unauthorized(body),
            403 => ApiError::AccessDenied(body),
            404 => ApiError::NotFound(body),
            429 => ApiError::RateLimited,
            400..=499 => ApiError::BadRequest(body),
            500..=599 => ApiError::ServerError(body),
            _ => ApiError::InvalidResponse(format!("Status {}: {}", status, body)),
        }
    }

    /// The `message` field the server sent with the failure, if any.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            ApiError::BadRequest(body)
            | ApiError::Unauthorized(body)
            | ApiError::AccessDenied(body)
            | ApiError::NotFound(body)
            | ApiError::ServerError(body) => body.message.as_deref(),
            _ => None,
        }
    }
}

/// Message to show the user for a failed request: the server's own message
/// when one is anywhere in the error chain, the error description otherwise.
pub fn user_message(err: &anyhow::Error) -> String {
    err.chain()
        .find_map(|cause| cause.downcast_ref::<ApiError>())
        .and_then(|api| api.server_message())
        .map(str::to_string)
        .unwrap_or_else(|| err.to_string())
}
