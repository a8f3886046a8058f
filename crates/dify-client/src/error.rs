//! Client error types.
//!
//! The request executor is the single place where transport failures and
//! HTTP outcomes are translated into [`Error`]. Façades pass these errors
//! through unchanged.

use std::time::Duration;

use thiserror::Error;

use crate::types::Payload;

/// Context carried by every HTTP-outcome error.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiError {
    /// HTTP status code.
    pub status: u16,
    /// Response body, decoded as JSON when possible, otherwise raw text.
    pub body: Payload,
    /// Correlation id: the server's `x-request-id` if it sent one, otherwise
    /// the id generated locally for the call.
    pub request_id: String,
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "API request failed with status {} (request_id: {}): {}",
            self.status, self.request_id, self.body
        )
    }
}

/// Client error type.
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid configuration: unknown or unset credential scope, bad builder
    /// input, unresolved path placeholder. Raised before any network attempt.
    #[error("Configuration error: {0}")]
    Config(String),

    /// 401 Unauthorized.
    #[error("Authentication failed: {0}")]
    Authentication(ApiError),

    /// 404 Not Found.
    #[error("Not found: {0}")]
    NotFound(ApiError),

    /// 422 Unprocessable Entity.
    #[error("Validation failed: {0}")]
    Validation(ApiError),

    /// 429 Too Many Requests.
    #[error("Rate limited: {0}")]
    RateLimit(ApiError),

    /// Any 5xx status.
    #[error("Server error: {0}")]
    Server(ApiError),

    /// Any other non-2xx status.
    #[error("API error: {0}")]
    Api(ApiError),

    /// DNS failure, refused or reset connection (retryable).
    #[error("Connection error: {0}")]
    Connection(String),

    /// Attempt exceeded its timeout (retryable).
    #[error("Timeout: {0}")]
    Timeout(String),

    /// URL parsing failed.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Local I/O failed (reading an upload, starting a runtime).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Transport failure that is neither a timeout nor a connection problem.
    #[error("HTTP error: {0}")]
    Http(reqwest::Error),

    /// Malformed server-sent event framing.
    #[error("Stream error: {0}")]
    Stream(String),
}

impl Error {
    /// Classify a non-2xx response.
    pub fn from_status(status: u16, body: Payload, request_id: impl Into<String>) -> Self {
        let api = ApiError {
            status,
            body,
            request_id: request_id.into(),
        };
        match status {
            401 => Error::Authentication(api),
            404 => Error::NotFound(api),
            422 => Error::Validation(api),
            429 => Error::RateLimit(api),
            500..=599 => Error::Server(api),
            _ => Error::Api(api),
        }
    }

    /// Classify a transport failure from `reqwest`.
    pub(crate) fn from_transport(err: reqwest::Error, timeout: Duration) -> Self {
        if err.is_timeout() {
            Error::timed_out(timeout)
        } else if err.is_connect() || err.is_request() || err.is_body() {
            Error::Connection(err.to_string())
        } else {
            Error::Http(err)
        }
    }

    pub(crate) fn timed_out(timeout: Duration) -> Self {
        Error::Timeout(format!(
            "Request timed out after {:.2} seconds",
            timeout.as_secs_f64()
        ))
    }

    /// Returns true for transport failures that the executor retries.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::Connection(_) | Error::Timeout(_))
    }

    /// The HTTP-outcome context, if this error came from a response.
    pub fn api_error(&self) -> Option<&ApiError> {
        match self {
            Error::Authentication(api)
            | Error::NotFound(api)
            | Error::Validation(api)
            | Error::RateLimit(api)
            | Error::Server(api)
            | Error::Api(api) => Some(api),
            _ => None,
        }
    }

    /// HTTP status, if this error came from a response.
    pub fn status(&self) -> Option<u16> {
        self.api_error().map(|api| api.status)
    }

    /// Correlation id, if this error came from a response.
    pub fn request_id(&self) -> Option<&str> {
        self.api_error().map(|api| api.request_id.as_str())
    }

    /// Check if this is a not-found error.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound(_))
    }

    /// Check if this is an authentication error.
    pub fn is_auth_error(&self) -> bool {
        matches!(self, Error::Authentication(_))
    }

    /// Check if this is a rate limit error.
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, Error::RateLimit(_))
    }

    /// Check if this is a server error.
    pub fn is_server_error(&self) -> bool {
        matches!(self, Error::Server(_))
    }
}

impl From<dify_config::ConfigError> for Error {
    fn from(err: dify_config::ConfigError) -> Self {
        Error::Config(err.to_string())
    }
}

/// Result type for client operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn classify(status: u16) -> Error {
        Error::from_status(status, Payload::Text("boom".to_string()), "req-1")
    }

    #[test]
    fn test_status_classification() {
        assert!(matches!(classify(401), Error::Authentication(_)));
        assert!(matches!(classify(404), Error::NotFound(_)));
        assert!(matches!(classify(422), Error::Validation(_)));
        assert!(matches!(classify(429), Error::RateLimit(_)));
        assert!(matches!(classify(500), Error::Server(_)));
        assert!(matches!(classify(502), Error::Server(_)));
        assert!(matches!(classify(503), Error::Server(_)));
        assert!(matches!(classify(599), Error::Server(_)));
        assert!(matches!(classify(400), Error::Api(_)));
        assert!(matches!(classify(403), Error::Api(_)));
        assert!(matches!(classify(409), Error::Api(_)));
        assert!(matches!(classify(600), Error::Api(_)));
    }

    #[test]
    fn test_api_error_accessors() {
        let err = Error::from_status(404, Payload::Json(json!({"code": "not_found"})), "srv-42");
        assert_eq!(err.status(), Some(404));
        assert_eq!(err.request_id(), Some("srv-42"));
        assert!(err.is_not_found());
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_message_is_self_describing() {
        let err = Error::from_status(
            429,
            Payload::Json(json!({"message": "slow down"})),
            "srv-7",
        );
        let msg = err.to_string();
        assert!(msg.contains("429"));
        assert!(msg.contains("srv-7"));
        assert!(msg.contains("slow down"));
    }

    #[test]
    fn test_transport_errors_are_retryable() {
        assert!(Error::Timeout("t".to_string()).is_retryable());
        assert!(Error::Connection("c".to_string()).is_retryable());
        assert!(!Error::Config("x".to_string()).is_retryable());
        assert!(!classify(503).is_retryable());
        assert_eq!(Error::Timeout("t".to_string()).status(), None);
    }

    #[test]
    fn test_timed_out_message() {
        let err = Error::timed_out(Duration::from_millis(1500));
        assert_eq!(err.to_string(), "Timeout: Request timed out after 1.50 seconds");
    }

    #[test]
    fn test_config_error_conversion() {
        let err: Error = dify_config::ConfigError::MissingCredential("default".to_string()).into();
        assert!(matches!(err, Error::Config(ref m) if m.contains("default")));
    }
}
