//! Error types for VOC client operations

use thiserror::Error;

/// Result type alias for VOC client operations
pub type Result<T> = std::result::Result<T, VocError>;

/// Errors that can occur during VOC client operations
#[derive(Error, Debug)]
pub enum VocError {
    /// Connection-level HTTP failure (DNS, TLS, refused, reset...)
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Server answered with a non-success status; `body` is the raw response text
    #[error("Server error {status}: {body}")]
    Server { status: u16, body: String },

    /// Response body could not be decoded into the expected shape
    #[error("Failed to decode response: {0}")]
    Decode(String),

    /// The server answered 204 No Content where a resource was expected,
    /// e.g. a command that returned no service status
    #[error("No content returned from {url}")]
    NoContent { url: String },

    /// A required argument was missing or malformed; no request was sent
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Client configuration is unusable (bad header name/value, etc.)
    #[error("Configuration error: {0}")]
    Config(String),

    /// The vehicle does not support the requested operation
    #[error("{operation} is not supported by {vehicle}")]
    Unsupported { operation: String, vehicle: String },

    /// The server reported the command as `Failed`
    #[error("request ({service}) failed: {reason}")]
    CommandFailed { service: String, reason: String },

    /// The server reported a status outside the known lifecycle
    #[error("request ({service}) failed with status ({status}): {reason}")]
    UnrecognizedStatus {
        service: String,
        status: String,
        reason: String,
    },

    /// Polling exceeded the effective timeout
    #[error("request timeout ({seconds}s)")]
    Timeout { seconds: u32 },
}

impl VocError {
    /// Create a server error from status code and raw body
    pub fn server_error(status: u16, body: impl Into<String>) -> Self {
        Self::Server {
            status,
            body: body.into(),
        }
    }

    /// Create an invalid-input error
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    /// HTTP status of a server error, if this is one
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Server { status, .. } => Some(*status),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_error_carries_body() {
        let err = VocError::server_error(403, r#"{"errorLabel":"Forbidden"}"#);
        assert_eq!(err.status(), Some(403));
        assert!(err.to_string().contains(r#"{"errorLabel":"Forbidden"}"#));
    }

    #[test]
    fn test_timeout_names_seconds() {
        let err = VocError::Timeout { seconds: 90 };
        assert_eq!(err.to_string(), "request timeout (90s)");
        assert_eq!(err.status(), None);
    }

    #[test]
    fn test_unsupported_names_vehicle() {
        let err = VocError::Unsupported {
            operation: "lock/unlock".into(),
            vehicle: "ABC123 [YV1XZ]".into(),
        };
        assert_eq!(err.to_string(), "lock/unlock is not supported by ABC123 [YV1XZ]");
    }
}
