//! Error types for the pipedeck client

use pipedeck_core::dto::ApiStatus;
use thiserror::Error;

/// Result type alias for client operations
pub type Result<T> = std::result::Result<T, ClientError>;

/// Errors that can occur when using the pipedeck client
#[derive(Debug, Error)]
pub enum ClientError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// API returned an error status code
    #[error("API error (status {status}): {message}")]
    ApiError {
        /// HTTP status code
        status: u16,
        /// Error message from the API
        message: String,
    },

    /// Failed to parse response
    #[error("Failed to parse response: {0}")]
    ParseError(String),

    /// Resource not found
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Invalid request
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Internal error
    #[error("Internal error: {0}")]
    InternalError(String),
}

impl ClientError {
    /// Create an API error from status code and message
    pub fn api_error(status: u16, message: impl Into<String>) -> Self {
        Self::ApiError {
            status,
            message: message.into(),
        }
    }

    /// Create an API error from a raw response body
    ///
    /// The backend answers failures with an `ApiStatus` JSON body; its `error`
    /// field is the human-readable message. Any other body is kept verbatim.
    pub fn from_body(status: u16, body: &str) -> Self {
        let message = match serde_json::from_str::<ApiStatus>(body) {
            Ok(api_status) if !api_status.error.is_empty() => api_status.error,
            _ if body.trim().is_empty() => "Unknown error".to_string(),
            _ => body.trim().to_string(),
        };
        Self::api_error(status, message)
    }

    /// Check if this error is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_)) || matches!(self, Self::ApiError { status: 404, .. })
    }

    /// Check if this error is a client error (4xx status)
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::ApiError { status, .. } if *status >= 400 && *status < 500)
    }

    /// Check if this error is a server error (5xx status)
    pub fn is_server_error(&self) -> bool {
        matches!(self, Self::ApiError { status, .. } if *status >= 500)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_body_prefers_api_status_message() {
        let err = ClientError::from_body(404, r#"{"error":"pipeline p-1 not found","code":5}"#);
        assert!(err.is_not_found());
        assert_eq!(
            err.to_string(),
            "API error (status 404): pipeline p-1 not found"
        );
    }

    #[test]
    fn test_from_body_keeps_plain_text() {
        let err = ClientError::from_body(502, "bad gateway\n");
        assert!(err.is_server_error());
        assert!(!err.is_client_error());
        assert_eq!(err.to_string(), "API error (status 502): bad gateway");
    }

    #[test]
    fn test_from_body_empty() {
        let err = ClientError::from_body(400, "");
        assert!(err.is_client_error());
        assert_eq!(err.to_string(), "API error (status 400): Unknown error");
    }
}
