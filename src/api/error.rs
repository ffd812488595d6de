//! API Error Types
//!
//! Errors raised by the HTTP client and surfaced to page models. Page
//! models only distinguish "succeeded" from "failed"; the variants exist
//! for logging and for the auth gate.

use crate::storage::StorageError;
use crate::validation::ValidationErrors;
use thiserror::Error;

/// API client error types
#[derive(Error, Debug)]
pub enum ApiError {
    /// Could not reach the server
    #[error("Network error: {0}")]
    Network(String),

    /// Request exceeded the configured timeout
    #[error("Request timeout")]
    Timeout,

    /// No valid session, or the refresh token was rejected
    #[error("Not authenticated")]
    Unauthorized,

    /// Server answered with a non-success status
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    /// Response body did not match the expected shape
    #[error("Failed to decode response: {0}")]
    Decode(String),

    /// Form rejected before any request was made
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationErrors),

    /// Local storage failed
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Client could not be constructed
    #[error("Configuration error: {0}")]
    Config(String),
}

impl ApiError {
    /// HTTP status for server errors
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Api { status, .. } => Some(*status),
            ApiError::Unauthorized => Some(401),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ApiError::Timeout
        } else if err.is_decode() {
            ApiError::Decode(err.to_string())
        } else {
            ApiError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::Decode(err.to_string())
    }
}

/// Pull a human-readable message out of an error body
///
/// Accepts `{"detail": ..}`, `{"error": ..}`, `{"message": ..}`,
/// `{"warning": ..}` and field-error maps such as
/// `{"username": ["already taken"]}`. Falls back to the raw body.
pub(crate) fn message_from_body(body: &str) -> String {
    let value: serde_json::Value = match serde_json::from_str(body) {
        Ok(v) => v,
        Err(_) => return body.trim().to_string(),
    };

    for key in ["detail", "error", "message", "warning"] {
        if let Some(msg) = value.get(key).and_then(|v| v.as_str()) {
            return msg.to_string();
        }
    }

    if let Some(obj) = value.as_object() {
        let parts: Vec<String> = obj
            .iter()
            .map(|(field, v)| {
                let text = match v {
                    serde_json::Value::Array(items) => items
                        .iter()
                        .map(|i| i.as_str().map(str::to_string).unwrap_or_else(|| i.to_string()))
                        .collect::<Vec<_>>()
                        .join(" "),
                    serde_json::Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                format!("{}: {}", field, text)
            })
            .collect();
        if !parts.is_empty() {
            return parts.join("; ");
        }
    }

    body.trim().to_string()
}

/// Result type for API operations
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_from_detail() {
        assert_eq!(
            message_from_body(r#"{"detail": "Not found."}"#),
            "Not found."
        );
    }

    #[test]
    fn test_message_from_field_errors() {
        assert_eq!(
            message_from_body(r#"{"username": ["A user with that username already exists."]}"#),
            "username: A user with that username already exists."
        );
    }

    #[test]
    fn test_message_from_plain_text() {
        assert_eq!(message_from_body("Bad Gateway\n"), "Bad Gateway");
    }

    #[test]
    fn test_status() {
        let err = ApiError::Api {
            status: 404,
            message: "Not found.".into(),
        };
        assert!(err.is_not_found());
        assert_eq!(ApiError::Timeout.status(), None);
    }
}
