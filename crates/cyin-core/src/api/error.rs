use reqwest::StatusCode;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum ApiError {
    /// The request never produced a response (DNS, refused connection, reset)
    #[error("Network error occurred")]
    NetworkError(#[from] reqwest::Error),

    /// The backend rejected the call; carries its message or a fallback
    #[error("{0}")]
    Rejected(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// A client-side precondition failed; no request was sent
    #[error("{0}")]
    Validation(String),

    #[error("{0} is already in progress")]
    Busy(&'static str),
}

/// Maximum length for response bodies echoed into logs and errors
const MAX_ERROR_BODY_LENGTH: usize = 500;

impl ApiError {
    /// Truncate a response body to avoid logging excessive data
    pub(crate) fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            body.to_string()
        } else {
            let mut end = MAX_ERROR_BODY_LENGTH;
            while !body.is_char_boundary(end) {
                end -= 1;
            }
            format!("{}... (truncated, {} total bytes)", &body[..end], body.len())
        }
    }

    /// Build the error for a non-2xx response.
    ///
    /// Uses the body's `message` field when it is a non-empty string,
    /// otherwise the operation's fallback message.
    pub fn from_status(status: StatusCode, body: &str, fallback: &str) -> Self {
        debug!(%status, body = %Self::truncate_body(body), "Request rejected");
        let message = serde_json::from_str::<Value>(body)
            .ok()
            .and_then(|value| server_message(&value));
        ApiError::Rejected(message.unwrap_or_else(|| fallback.to_string()))
    }

    pub fn is_network(&self) -> bool {
        matches!(self, ApiError::NetworkError(_))
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, ApiError::Validation(_))
    }
}

/// Extract a non-empty `message` string from a response body
pub(crate) fn server_message(value: &Value) -> Option<String> {
    value
        .get("message")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .map(str::to_string)
}
