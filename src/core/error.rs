//! Typed error handling for user-guard
//!
//! Every failure the validation layer can produce is a [`GuardError`]. The
//! enum splits errors by category so callers can tell a batch of
//! client-caused field problems apart from a broken user datastore.
//!
//! # Error Categories
//!
//! - [`ValidationError`]: field-level failures and malformed request bodies
//! - [`LookupError`]: the user lookup collaborator itself failed
//! - [`ConfigError`]: invalid or unreadable validation configuration
//! - [`RequestError`]: the request could not be turned into a context
//!
//! # Example
//!
//! ```rust,ignore
//! use user_guard::prelude::*;
//!
//! match validations.post.run(&ctx).await {
//!     Ok(()) => { /* proceed to the create handler */ }
//!     Err(GuardError::Validation(ValidationError::FieldErrors(failures))) => {
//!         for failure in failures {
//!             println!("{}: {}", failure.field, failure.message);
//!         }
//!     }
//!     Err(e) => eprintln!("fatal: {}", e),
//! }
//! ```

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use std::fmt;

use crate::core::validation::context::FieldLocation;

/// Message carried by every aggregated validation error
pub const VALIDATION_ERRORS_MESSAGE: &str = "Validation Errors";

/// The main error type for user-guard
#[derive(Debug)]
pub enum GuardError {
    /// Client-caused validation errors
    Validation(ValidationError),

    /// The user lookup collaborator failed
    Lookup(LookupError),

    /// Configuration errors
    Config(ConfigError),

    /// HTTP/Request errors
    Request(RequestError),

    /// Internal errors (should not happen in normal operation)
    Internal(String),
}

impl fmt::Display for GuardError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GuardError::Validation(e) => write!(f, "{}", e),
            GuardError::Lookup(e) => write!(f, "{}", e),
            GuardError::Config(e) => write!(f, "{}", e),
            GuardError::Request(e) => write!(f, "{}", e),
            GuardError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for GuardError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            GuardError::Validation(e) => Some(e),
            GuardError::Lookup(e) => Some(e),
            GuardError::Config(e) => Some(e),
            GuardError::Request(e) => Some(e),
            GuardError::Internal(_) => None,
        }
    }
}

/// Error response structure for HTTP responses
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error code for programmatic handling
    pub code: String,
    /// Human-readable error message
    pub message: String,
    /// Optional additional details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl GuardError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            GuardError::Validation(_) => StatusCode::BAD_REQUEST,
            GuardError::Lookup(_) => StatusCode::INTERNAL_SERVER_ERROR,
            GuardError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            GuardError::Request(e) => e.status_code(),
            GuardError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error code for this error
    pub fn error_code(&self) -> &'static str {
        match self {
            GuardError::Validation(e) => e.error_code(),
            GuardError::Lookup(_) => "LOOKUP_FAILED",
            GuardError::Config(_) => "CONFIG_ERROR",
            GuardError::Request(e) => e.error_code(),
            GuardError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Convert to an error response
    pub fn to_response(&self) -> ErrorResponse {
        ErrorResponse {
            code: self.error_code().to_string(),
            message: self.to_string(),
            details: self.details(),
        }
    }

    /// Field failures carried by an aggregated validation error, if any
    pub fn field_errors(&self) -> Option<&[FieldValidationError]> {
        match self {
            GuardError::Validation(ValidationError::FieldErrors(errors)) => Some(errors),
            _ => None,
        }
    }

    fn details(&self) -> Option<serde_json::Value> {
        match self {
            GuardError::Validation(ValidationError::FieldErrors(errors)) => {
                Some(serde_json::json!({ "errors": errors }))
            }
            GuardError::Lookup(LookupError::Failed { field }) => {
                Some(serde_json::json!({ "field": field }))
            }
            _ => None,
        }
    }
}

impl IntoResponse for GuardError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(self.to_response());
        (status, body).into_response()
    }
}

// =============================================================================
// Validation Errors
// =============================================================================

/// Client-caused validation errors
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    /// Every failure recorded by a rule chain, in evaluation order
    #[error("Validation Errors")]
    FieldErrors(Vec<FieldValidationError>),

    /// The request body is not a JSON object
    #[error("Invalid JSON: {message}")]
    InvalidJson { message: String },
}

impl ValidationError {
    /// Terminal step of a rule chain
    ///
    /// Returns `Ok(())` when nothing was recorded, otherwise the single
    /// aggregated 400 error holding every failure.
    pub fn aggregate(failures: Vec<FieldValidationError>) -> Result<(), GuardError> {
        if failures.is_empty() {
            Ok(())
        } else {
            Err(GuardError::Validation(ValidationError::FieldErrors(failures)))
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            ValidationError::FieldErrors(_) => "VALIDATION_ERROR",
            ValidationError::InvalidJson { .. } => "INVALID_JSON",
        }
    }
}

/// A single field validation failure
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldValidationError {
    pub field: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<FieldLocation>,
}

impl FieldValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            location: None,
        }
    }

    pub fn at(mut self, location: Option<FieldLocation>) -> Self {
        self.location = location;
        self
    }
}

impl From<ValidationError> for GuardError {
    fn from(err: ValidationError) -> Self {
        GuardError::Validation(err)
    }
}

// =============================================================================
// Lookup Errors
// =============================================================================

/// Failures of the user lookup collaborator
///
/// These are never batched with field failures: the chain stops at the
/// first one. The datastore's own error is logged, not carried.
#[derive(Debug, thiserror::Error)]
pub enum LookupError {
    #[error("User lookup for field '{field}' failed")]
    Failed { field: String },
}

impl From<LookupError> for GuardError {
    fn from(err: LookupError) -> Self {
        GuardError::Lookup(err)
    }
}

// =============================================================================
// Config Errors
// =============================================================================

/// Errors related to validation configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to parse config: {message}")]
    ParseError { message: String },

    #[error("Invalid value '{value}' for field '{field}': {message}")]
    InvalidValue {
        field: String,
        value: String,
        message: String,
    },

    #[error("Missing required setting: {field}")]
    MissingField { field: String },
}

impl From<ConfigError> for GuardError {
    fn from(err: ConfigError) -> Self {
        GuardError::Config(err)
    }
}

// =============================================================================
// Request Errors
// =============================================================================

/// Errors raised while reading the request into a validation context
#[derive(Debug, thiserror::Error)]
pub enum RequestError {
    #[error("Request body exceeds {limit} bytes")]
    BodyTooLarge { limit: usize },

    #[error("Invalid path parameters: {message}")]
    InvalidPath { message: String },

    #[error("Validation chains are not installed on this router")]
    MissingValidations,
}

impl RequestError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            RequestError::BodyTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            RequestError::InvalidPath { .. } => StatusCode::BAD_REQUEST,
            RequestError::MissingValidations => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            RequestError::BodyTooLarge { .. } => "BODY_TOO_LARGE",
            RequestError::InvalidPath { .. } => "INVALID_PATH",
            RequestError::MissingValidations => "MISSING_VALIDATIONS",
        }
    }
}

impl From<RequestError> for GuardError {
    fn from(err: RequestError) -> Self {
        GuardError::Request(err)
    }
}

// =============================================================================
// Conversions from external errors
// =============================================================================

impl From<serde_json::Error> for GuardError {
    fn from(err: serde_json::Error) -> Self {
        GuardError::Validation(ValidationError::InvalidJson {
            message: err.to_string(),
        })
    }
}

impl From<serde_yaml::Error> for GuardError {
    fn from(err: serde_yaml::Error) -> Self {
        GuardError::Config(ConfigError::ParseError {
            message: err.to_string(),
        })
    }
}

impl From<anyhow::Error> for GuardError {
    fn from(err: anyhow::Error) -> Self {
        GuardError::Internal(err.to_string())
    }
}

// =============================================================================
// Result type alias
// =============================================================================

/// A specialized Result type for user-guard operations
pub type GuardResult<T> = Result<T, GuardError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aggregate_empty_is_ok() {
        assert!(ValidationError::aggregate(vec![]).is_ok());
    }

    #[test]
    fn test_aggregate_keeps_order() {
        let err = ValidationError::aggregate(vec![
            FieldValidationError::new("name", "Name required"),
            FieldValidationError::new("password", "Password required"),
        ])
        .unwrap_err();

        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        let fields: Vec<&str> = err
            .field_errors()
            .unwrap()
            .iter()
            .map(|f| f.field.as_str())
            .collect();
        assert_eq!(fields, vec!["name", "password"]);
    }

    #[test]
    fn test_aggregated_response_lists_errors() {
        let err = GuardError::Validation(ValidationError::FieldErrors(vec![
            FieldValidationError::new("email", "Email is invalid").at(Some(FieldLocation::Body)),
        ]));
        let response = err.to_response();

        assert_eq!(response.code, "VALIDATION_ERROR");
        assert_eq!(response.message, VALIDATION_ERRORS_MESSAGE);
        let details = response.details.unwrap();
        assert_eq!(details["errors"][0]["field"], "email");
        assert_eq!(details["errors"][0]["message"], "Email is invalid");
        assert_eq!(details["errors"][0]["location"], "body");
    }

    #[test]
    fn test_lookup_error_is_server_error() {
        let err: GuardError = LookupError::Failed {
            field: "email".to_string(),
        }
        .into();
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.error_code(), "LOOKUP_FAILED");
        assert_eq!(err.to_string(), "User lookup for field 'email' failed");
        assert!(err.field_errors().is_none());
    }

    #[test]
    fn test_request_error_status_codes() {
        assert_eq!(
            RequestError::BodyTooLarge { limit: 10 }.status_code(),
            StatusCode::PAYLOAD_TOO_LARGE
        );
        assert_eq!(
            RequestError::InvalidPath {
                message: "x".to_string()
            }
            .status_code(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_from_serde_json_error() {
        let json_err = serde_json::from_str::<serde_json::Value>("invalid json").unwrap_err();
        let err: GuardError = json_err.into();
        assert!(matches!(
            err,
            GuardError::Validation(ValidationError::InvalidJson { .. })
        ));
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.error_code(), "INVALID_JSON");
    }
}
