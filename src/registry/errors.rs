//! # Registry Errors
//!
//! Error types for submission validation and the record lifecycle.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

use super::record::StudentSubmission;
use crate::store::StoreError;

/// Result type for registry operations
pub type RegistryResult<T> = Result<T, RegistryError>;

/// Why a submission was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Invalid Email (.com or .in required)")]
    InvalidEmail,

    #[error("Invalid Contact (Start with +91, 13 digits)")]
    InvalidContact,

    /// First empty or absent field, by form order
    #[error("All fields are required")]
    MissingField(&'static str),
}

impl ValidationError {
    /// Stable machine-readable kind
    pub fn kind(&self) -> &'static str {
        match self {
            ValidationError::InvalidEmail => "invalid_email",
            ValidationError::InvalidContact => "invalid_contact",
            ValidationError::MissingField(_) => "missing_field",
        }
    }
}

/// Lifecycle errors
#[derive(Debug, Error)]
pub enum RegistryError {
    // ==================
    // Client Errors (4xx)
    // ==================
    /// Submission failed validation; nothing was written
    #[error("Invalid Input: {0}")]
    Invalid(ValidationError),

    // ==================
    // Server Errors (5xx)
    // ==================
    /// The document store failed or was unreachable
    #[error("DB Error: {0}")]
    Store(#[from] StoreError),
}

impl From<ValidationError> for RegistryError {
    fn from(err: ValidationError) -> Self {
        RegistryError::Invalid(err)
    }
}

impl RegistryError {
    /// Get HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            RegistryError::Invalid(_) => StatusCode::BAD_REQUEST,
            RegistryError::Store(StoreError::NotFound(_)) => StatusCode::NOT_FOUND,
            RegistryError::Store(_) => StatusCode::BAD_GATEWAY,
        }
    }

    /// Stable machine-readable kind
    pub fn kind(&self) -> &'static str {
        match self {
            RegistryError::Invalid(v) => v.kind(),
            RegistryError::Store(_) => "store_error",
        }
    }

    /// The validation failure, if this is one
    pub fn validation(&self) -> Option<ValidationError> {
        match self {
            RegistryError::Invalid(v) => Some(*v),
            RegistryError::Store(_) => None,
        }
    }

    /// Build an HTTP response that echoes the rejected input back to the caller
    pub fn into_response_with(self, submitted: StudentSubmission) -> Response {
        let status = self.status_code();
        let mut body = ErrorResponse::from(self);
        body.submitted = Some(submitted);
        (status, Json(body)).into_response()
    }
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: u16,
    pub kind: &'static str,
    pub submitted: Option<StudentSubmission>,
}

impl From<RegistryError> for ErrorResponse {
    fn from(err: RegistryError) -> Self {
        Self {
            code: err.status_code().as_u16(),
            kind: err.kind(),
            error: err.to_string(),
            submitted: None,
        }
    }
}

impl IntoResponse for RegistryError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(ErrorResponse::from(self));
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            RegistryError::Invalid(ValidationError::InvalidEmail).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            RegistryError::Store(StoreError::Unavailable("down".into())).status_code(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            RegistryError::Store(StoreError::NotFound("x".into())).status_code(),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn test_messages() {
        let err = RegistryError::from(ValidationError::InvalidContact);
        assert_eq!(
            err.to_string(),
            "Invalid Input: Invalid Contact (Start with +91, 13 digits)"
        );
        assert_eq!(err.kind(), "invalid_contact");
        assert_eq!(err.validation(), Some(ValidationError::InvalidContact));

        let err = RegistryError::from(StoreError::Unavailable("timeout".into()));
        assert!(err.to_string().starts_with("DB Error:"));
        assert_eq!(err.kind(), "store_error");
    }

    #[test]
    fn test_missing_field_message() {
        assert_eq!(
            ValidationError::MissingField("stream").to_string(),
            "All fields are required"
        );
    }
}
