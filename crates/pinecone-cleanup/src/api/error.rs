//! Pinecone API error classification
//!
//! Provides typed errors for REST calls using the HTTP status code
//! instead of string matching on response bodies.

use reqwest::StatusCode;
use thiserror::Error;

/// API error categories for retry and cleanup logic
#[derive(Debug, Error)]
pub enum ApiError {
    /// Resource was not found (safe to skip in cleanup)
    #[error("Resource not found: {message}")]
    NotFound { message: String },

    /// Rate limit exceeded (retryable)
    #[error("Rate limit exceeded: {message}")]
    Throttled { message: String },

    /// Request conflicts with the resource's current state
    /// (e.g. deletion protection, pending operation)
    #[error("Conflict: {message}")]
    Conflict { message: String },

    /// Credentials were rejected
    #[error("Unauthorized ({status}): {message}")]
    Unauthorized { status: u16, message: String },

    /// Any other non-success HTTP status
    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    /// Request never produced a response
    #[error("Transport error: {0}")]
    Transport(#[source] reqwest::Error),

    /// Response body did not have the expected shape
    #[error("Failed to decode response: {0}")]
    Decode(String),
}

impl ApiError {
    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::NotFound { .. })
    }

    /// Check if this is a retryable error
    pub fn is_retryable(&self) -> bool {
        match self {
            ApiError::Throttled { .. } | ApiError::Conflict { .. } | ApiError::Transport(_) => true,
            ApiError::Http { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            ApiError::Decode(e.to_string())
        } else {
            ApiError::Transport(e)
        }
    }
}

/// Classify a non-success response by its status code.
///
/// `body` is the raw response body; the `error.message` field of Pinecone's
/// JSON error envelope is used when present.
pub fn classify_status(status: StatusCode, body: &str) -> ApiError {
    let message = extract_message(body).unwrap_or_else(|| {
        if body.trim().is_empty() {
            status
                .canonical_reason()
                .unwrap_or("Unknown error")
                .to_string()
        } else {
            body.trim().to_string()
        }
    });

    match status {
        StatusCode::NOT_FOUND => ApiError::NotFound { message },
        StatusCode::TOO_MANY_REQUESTS => ApiError::Throttled { message },
        StatusCode::CONFLICT | StatusCode::PRECONDITION_FAILED => ApiError::Conflict { message },
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ApiError::Unauthorized {
            status: status.as_u16(),
            message,
        },
        _ => ApiError::Http {
            status: status.as_u16(),
            message,
        },
    }
}

/// Pull `error.message` (or a top-level `message`) out of a JSON error body
fn extract_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    value
        .pointer("/error/message")
        .or_else(|| value.get("message"))
        .or_else(|| value.get("error_description"))
        .and_then(|m| m.as_str())
        .map(|m| m.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_status() {
        let err = classify_status(StatusCode::NOT_FOUND, "");
        assert!(err.is_not_found());
        assert!(!err.is_retryable());
    }

    #[test]
    fn throttling_is_retryable() {
        let err = classify_status(StatusCode::TOO_MANY_REQUESTS, "slow down");
        assert!(matches!(err, ApiError::Throttled { .. }));
        assert!(err.is_retryable());
    }

    #[test]
    fn conflict_and_precondition() {
        for status in [StatusCode::CONFLICT, StatusCode::PRECONDITION_FAILED] {
            let err = classify_status(status, "");
            assert!(matches!(err, ApiError::Conflict { .. }), "status {status}");
        }
    }

    #[test]
    fn auth_failures() {
        let err = classify_status(StatusCode::FORBIDDEN, "");
        assert!(matches!(err, ApiError::Unauthorized { status: 403, .. }));
        assert!(!err.is_retryable());
    }

    #[test]
    fn server_errors_are_retryable_client_errors_are_not() {
        assert!(classify_status(StatusCode::BAD_GATEWAY, "").is_retryable());
        assert!(!classify_status(StatusCode::BAD_REQUEST, "").is_retryable());
    }

    #[test]
    fn message_from_error_envelope() {
        let body = r#"{"error":{"code":"NOT_FOUND","message":"Resource my-index not found"},"status":404}"#;
        let err = classify_status(StatusCode::NOT_FOUND, body);
        assert_eq!(err.to_string(), "Resource not found: Resource my-index not found");
    }

    #[test]
    fn message_falls_back_to_raw_body_then_reason() {
        let err = classify_status(StatusCode::INTERNAL_SERVER_ERROR, "boom\n");
        assert_eq!(err.to_string(), "HTTP 500: boom");

        let err = classify_status(StatusCode::INTERNAL_SERVER_ERROR, "  ");
        assert_eq!(err.to_string(), "HTTP 500: Internal Server Error");
    }
}
