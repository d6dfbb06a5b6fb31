//! Error types for pagekit
//!
//! Every public API returns `Result<T, Error>`. Transport failures
//! (`Auth`, `HttpStatus`, `Network`) and pagination failures
//! (`PaginationProtocol`) are kept apart so callers can tell a rejected
//! credential from a broken upstream contract.

use serde_json::Value;
use thiserror::Error;

/// The main error type for pagekit
#[derive(Error, Debug)]
pub enum Error {
    // ============================================================================
    // Transport Errors
    // ============================================================================
    #[error("Authentication failed: {message}")]
    Auth { message: String },

    #[error("HTTP {status}: {message}")]
    HttpStatus {
        status: u16,
        message: String,
        body: String,
    },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    // ============================================================================
    // Pagination Errors
    // ============================================================================
    #[error("Pagination protocol error: {message}")]
    PaginationProtocol { message: String },

    // ============================================================================
    // Credential Errors
    // ============================================================================
    #[error("Token refresh failed: {message}")]
    TokenRefresh { message: String },

    #[error("JWT generation failed: {message}")]
    JwtGeneration { message: String },

    // ============================================================================
    // Configuration Errors
    // ============================================================================
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("Undefined variable in template: {variable}")]
    UndefinedVariable { variable: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an auth error
    pub fn auth(message: impl Into<String>) -> Self {
        Self::Auth {
            message: message.into(),
        }
    }

    /// Create an HTTP status error, refining the reason phrase from the body
    pub fn http_status(status: u16, body: impl Into<String>) -> Self {
        let body = body.into();
        let message = refine_message(status, &body);
        Self::HttpStatus {
            status,
            message,
            body,
        }
    }

    /// Create a pagination protocol error
    pub fn protocol(message: impl Into<String>) -> Self {
        Self::PaginationProtocol {
            message: message.into(),
        }
    }

    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create an undefined variable error
    pub fn undefined_var(variable: impl Into<String>) -> Self {
        Self::UndefinedVariable {
            variable: variable.into(),
        }
    }

    /// True for errors raised by the transport layer
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            Error::Auth { .. } | Error::HttpStatus { .. } | Error::Network(_)
        )
    }

    /// HTTP status carried by this error, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::HttpStatus { status, .. } => Some(*status),
            Error::Network(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

/// Reason phrase used when a status has no canonical one
const UNKNOWN_ERROR: &str = "Unknown error";

/// Pick the user-facing message for a failed call.
///
/// The raw message is the canonical reason phrase for `status`. When it is
/// uninformative (contains "bad request" or "unknown error", ignoring case)
/// and the body carries a description, the description wins.
pub fn refine_message(status: u16, body: &str) -> String {
    let raw = reqwest::StatusCode::from_u16(status)
        .ok()
        .and_then(|s| s.canonical_reason())
        .unwrap_or(UNKNOWN_ERROR)
        .to_string();

    let lowered = raw.to_lowercase();
    if lowered.contains("bad request") || lowered.contains("unknown error") {
        if let Some(description) = body_description(body) {
            return description;
        }
    }
    raw
}

/// Find a human-readable description inside an error body
pub fn body_description(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;

    let candidates = [
        value.pointer("/error/message"),
        value.get("error_description"),
        value.pointer("/error/errors/0/message"),
        value.get("message"),
        value.get("description"),
    ];

    let found = candidates
        .into_iter()
        .flatten()
        .filter_map(Value::as_str)
        .find(|s| !s.is_empty())
        .map(String::from);
    found
}

/// Result type alias for pagekit
pub type Result<T> = std::result::Result<T, Error>;

/// Extension trait for adding context to errors
pub trait ResultExt<T> {
    /// Add context to an error
    fn context(self, message: impl Into<String>) -> Result<T>;

    /// Add context with a closure (lazy evaluation)
    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T>;
}

impl<T, E: Into<Error>> ResultExt<T> for std::result::Result<T, E> {
    fn context(self, message: impl Into<String>) -> Result<T> {
        self.map_err(|e| {
            let inner = e.into();
            Error::Other(format!("{}: {}", message.into(), inner))
        })
    }

    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T> {
        self.map_err(|e| {
            let inner = e.into();
            Error::Other(format!("{}: {}", f(), inner))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test]
    fn test_error_display() {
        let err = Error::config("test message");
        assert_eq!(err.to_string(), "Configuration error: test message");

        let err = Error::protocol("missing field 'value'");
        assert_eq!(
            err.to_string(),
            "Pagination protocol error: missing field 'value'"
        );

        let err = Error::http_status(404, "");
        assert_eq!(err.to_string(), "HTTP 404: Not Found");
    }

    #[test_case(400, r#"{"error":{"code":"BadRequest","message":"Invalid filter clause"}}"#, "Invalid filter clause" ; "graph style body")]
    #[test_case(400, r#"{"error":"invalid_grant","error_description":"Token expired"}"#, "Token expired" ; "oauth style body")]
    #[test_case(400, r#"{"error":{"errors":[{"message":"Invalid Value"}],"code":400}}"#, "Invalid Value" ; "google style body")]
    #[test_case(400, r#"{"message":"plain message"}"#, "plain message" ; "top level message")]
    #[test_case(400, "not json", "Bad Request" ; "unparseable body keeps reason")]
    #[test_case(400, r#"{"error":{"message":""}}"#, "Bad Request" ; "empty description keeps reason")]
    #[test_case(599, r#"{"description":"custom failure"}"#, "custom failure" ; "unknown status uses description")]
    #[test_case(599, "", "Unknown error" ; "unknown status without body")]
    #[test_case(404, r#"{"error":{"message":"Item not found"}}"#, "Not Found" ; "informative reason is kept")]
    #[test_case(500, r#"{"error":{"message":"boom"}}"#, "Internal Server Error" ; "server error is kept")]
    fn test_refine_message(status: u16, body: &str, expected: &str) {
        assert_eq!(refine_message(status, body), expected);
    }

    #[test]
    fn test_body_description_order() {
        assert_eq!(
            body_description(r#"{"error":{"message":""},"error_description":"expired"}"#),
            Some("expired".to_string())
        );
        assert_eq!(
            body_description(r#"{"error":{"errors":[{"message":"Bad q"}]}}"#),
            Some("Bad q".to_string())
        );
        assert_eq!(body_description("not json"), None);
        assert_eq!(body_description(r#"{"message":42}"#), None);
    }

    #[test]
    fn test_http_status_keeps_body() {
        let body = r#"{"error":{"message":"Invalid filter"}}"#;
        match Error::http_status(400, body) {
            Error::HttpStatus {
                status,
                message,
                body: raw,
            } => {
                assert_eq!(status, 400);
                assert_eq!(message, "Invalid filter");
                assert_eq!(raw, body);
            }
            other => panic!("Expected HttpStatus, got {other:?}"),
        }
    }

    #[test]
    fn test_is_transport() {
        assert!(Error::auth("expired").is_transport());
        assert!(Error::http_status(500, "").is_transport());
        assert!(!Error::protocol("bad").is_transport());
        assert!(!Error::config("bad").is_transport());
    }

    #[test]
    fn test_status() {
        assert_eq!(Error::http_status(403, "").status(), Some(403));
        assert_eq!(Error::auth("nope").status(), None);
    }

    #[test]
    fn test_result_context() {
        let result: Result<()> = Err(Error::config("inner"));
        let with_context = result.context("outer");
        assert!(with_context
            .unwrap_err()
            .to_string()
            .contains("outer: Configuration error: inner"));
    }
}
