//! Error types for the hook bridge
//!
//! All errors use the `thiserror` crate. Three families matter to handler
//! authors:
//!
//! 1. **Handler failures**: anything a registered filter, action or schedule
//!    handler returns as `Err` (or panics with). The dispatcher logs these
//!    exactly once through the context logger and then re-raises them.
//!
//! 2. **Payload validation failures** ([`ValidationError`]): raised by the
//!    payload readers when no schema alternative accepts a value. From the
//!    handler's point of view they are ordinary handler failures.
//!
//! 3. **Domain validation failures** ([`FailedValidationError`]): built by
//!    handler code to reject a value for a business reason. They carry the
//!    collection, field and message and map to HTTP status `400`.
//!
//! # Examples
//!
//! ```ignore
//! if payload["title"].as_str().map_or(true, str::is_empty) {
//!     return Err(FailedValidationError::new("articles", "title", "Title is required").into());
//! }
//! ```

use serde::Serialize;
use thiserror::Error;

use crate::payload::Diagnostic;

/// Errors that can occur in the hook bridge
#[derive(Debug, Error)]
pub enum HooksError {
    /// A handler failed
    ///
    /// The string carries whatever the handler reported.
    #[error("Hook execution failed: {0}")]
    ExecutionFailed(String),

    /// A handler panicked
    ///
    /// Panics are caught by the isolation wrapper and surfaced like any other
    /// handler failure so that they are logged through the context logger.
    #[error("{kind} handler '{name}' panicked: {message}")]
    HandlerPanicked {
        kind: &'static str,
        name: String,
        message: String,
    },

    /// A payload did not match its schema
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// A handler rejected a field value
    #[error(transparent)]
    FailedValidation(#[from] FailedValidationError),

    /// No tokio runtime was available to run detached handlers
    #[error("No async runtime available: {0}")]
    RuntimeUnavailable(String),

    /// The host rejected a registration
    #[error("Registration failed: {0}")]
    Registration(String),

    /// Registration id not known to the host
    #[error("Registration not found: {0}")]
    RegistrationNotFound(String),

    /// Service name missing from the service registry
    #[error("Service not registered: {0}")]
    ServiceNotRegistered(String),

    /// A service constructor failed
    #[error("Service construction failed: {0}")]
    ServiceConstruction(String),

    /// A constructed service was not of the requested type
    #[error("Service '{name}' is not a {expected}")]
    ServiceTypeMismatch { name: String, expected: &'static str },

    /// Invalid bridge configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Serialization error
    ///
    /// Wraps `serde_yaml::Error` for YAML parsing failures.
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_yaml::Error),

    /// IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON error
    ///
    /// Typically raised when a validated payload does not deserialize into
    /// the requested Rust type.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl HooksError {
    /// Build a generic handler failure from any displayable message
    pub fn handler(message: impl std::fmt::Display) -> Self {
        Self::ExecutionFailed(message.to_string())
    }

    /// HTTP-style status code for errors that surface to API callers
    pub fn status(&self) -> u16 {
        match self {
            Self::Validation(_) | Self::FailedValidation(_) => 400,
            Self::ServiceNotRegistered(_) | Self::RegistrationNotFound(_) => 404,
            _ => 500,
        }
    }
}

/// Result type for hook bridge operations
pub type Result<T> = std::result::Result<T, HooksError>;

/// A payload matched none of the schema alternatives
#[derive(Debug, Clone, Error)]
#[error("Payload validation failed: {diagnostic}")]
pub struct ValidationError {
    pub diagnostic: Diagnostic,
}

impl ValidationError {
    pub fn new(diagnostic: Diagnostic) -> Self {
        Self { diagnostic }
    }
}

/// Field-level rejection raised by handler code
///
/// Serializes to the shape API consumers expect:
///
/// ```json
/// {
///   "code": "FAILED_VALIDATION",
///   "status": 400,
///   "message": "...",
///   "extensions": { "collection": "articles", "field": "title" }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Validation failed for field \"{field}\" in collection \"{collection}\": {message}")]
pub struct FailedValidationError {
    pub collection: String,
    pub field: String,
    pub message: String,
}

impl FailedValidationError {
    pub const CODE: &'static str = "FAILED_VALIDATION";

    pub fn new(
        collection: impl Into<String>,
        field: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            collection: collection.into(),
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn code(&self) -> &'static str {
        Self::CODE
    }

    pub fn status(&self) -> u16 {
        400
    }
}

#[derive(Serialize)]
struct FailedValidationBody<'a> {
    code: &'static str,
    status: u16,
    message: &'a str,
    extensions: FailedValidationExtensions<'a>,
}

#[derive(Serialize)]
struct FailedValidationExtensions<'a> {
    collection: &'a str,
    field: &'a str,
}

impl Serialize for FailedValidationError {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        FailedValidationBody {
            code: self.code(),
            status: self.status(),
            message: &self.message,
            extensions: FailedValidationExtensions {
                collection: &self.collection,
                field: &self.field,
            },
        }
        .serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_failed_validation_shape() {
        let err = FailedValidationError::new("articles", "title", "Title is required");
        assert_eq!(err.code(), "FAILED_VALIDATION");
        assert_eq!(err.status(), 400);

        let body = serde_json::to_value(&err).unwrap();
        assert_eq!(
            body,
            json!({
                "code": "FAILED_VALIDATION",
                "status": 400,
                "message": "Title is required",
                "extensions": { "collection": "articles", "field": "title" }
            })
        );
    }

    #[test]
    fn test_failed_validation_converts_to_hooks_error() {
        let err: HooksError = FailedValidationError::new("articles", "slug", "taken").into();
        assert_eq!(err.status(), 400);
        assert!(err.to_string().contains("slug"));
    }

    #[test]
    fn test_handler_error_status() {
        let err = HooksError::handler("boom");
        assert_eq!(err.status(), 500);
        assert_eq!(err.to_string(), "Hook execution failed: boom");
    }
}
