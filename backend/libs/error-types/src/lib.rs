//! Shared API response envelopes and error codes
//!
//! Every Vidra service responds with the same JSON shapes: successful calls
//! wrap their payload in [`ApiResponse`], failures render an
//! [`ErrorResponse`]. Keeping both here prevents services from drifting on
//! field names or casing.

use serde::{Deserialize, Serialize};

/// Stable machine-readable error codes carried in the `code` field of
/// [`ErrorResponse`]. Clients match on these, so additions are fine but
/// renames are breaking.
pub mod error_codes {
    pub const INVALID_ARGUMENT: &str = "INVALID_ARGUMENT";
    pub const VALIDATION_ERROR: &str = "VALIDATION_ERROR";
    pub const UNAUTHORIZED: &str = "UNAUTHORIZED";
    pub const NOT_FOUND: &str = "NOT_FOUND";
    pub const DEPENDENCY_FAILURE: &str = "DEPENDENCY_FAILURE";
    pub const INTERNAL_ERROR: &str = "INTERNAL_ERROR";
}

/// Envelope for successful responses.
///
/// `success` is derived from the status code so callers cannot construct a
/// "successful" envelope around an error status.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T> {
    pub status_code: u16,
    pub data: T,
    pub message: String,
    pub success: bool,
}

impl<T> ApiResponse<T> {
    pub fn new(status_code: u16, data: T, message: impl Into<String>) -> Self {
        Self {
            status_code,
            data,
            message: message.into(),
            success: status_code < 400,
        }
    }

    /// Shorthand for the common 200 case.
    pub fn ok(data: T, message: impl Into<String>) -> Self {
        Self::new(200, data, message)
    }
}

/// Envelope for error responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub status_code: u16,
    pub code: String,
    pub message: String,
    pub success: bool,
    /// Per-field validation details, present only when applicable.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<String>>,
}

impl ErrorResponse {
    pub fn new(status_code: u16, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            status_code,
            code: code.into(),
            message: message.into(),
            success: false,
            errors: None,
        }
    }

    pub fn with_details(mut self, errors: Vec<String>) -> Self {
        self.errors = Some(errors);
        self
    }
}
