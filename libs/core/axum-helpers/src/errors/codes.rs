//! Stable error codes carried in every error body.
//!
//! ```rust
//! use axum_helpers::errors::ErrorCode;
//!
//! let code = ErrorCode::ValidationError;
//! assert_eq!(code.as_str(), "VALIDATION_ERROR");
//! assert_eq!(code.code(), 1001);
//! assert_eq!(code.default_message(), "Request validation failed");
//! ```

use serde::{Deserialize, Serialize};
use strum::{Display, IntoStaticStr};
use utoipa::ToSchema;

/// Machine-readable identifier plus an integer code for logs and metrics.
///
/// Ranges: 1000-1999 client errors, 1500-1599 server errors.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    ToSchema,
    Display,
    IntoStaticStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Body or query failed `validator` rules
    ValidationError,
    InvalidUuid,
    /// Body could not be parsed as JSON
    InvalidJson,
    /// Query string could not be deserialized
    InvalidQuery,
    /// Multipart body was malformed or rejected
    InvalidUpload,
    BadRequest,
    NotFound,
    PayloadTooLarge,

    InternalError,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        self.into()
    }

    pub fn code(&self) -> i32 {
        match self {
            Self::ValidationError => 1001,
            Self::InvalidUuid => 1002,
            Self::InvalidJson => 1003,
            Self::InvalidQuery => 1004,
            Self::InvalidUpload => 1005,
            Self::BadRequest => 1006,
            Self::NotFound => 1007,
            Self::PayloadTooLarge => 1009,
            Self::InternalError => 1500,
        }
    }

    pub fn default_message(&self) -> &'static str {
        match self {
            Self::ValidationError => "Request validation failed",
            Self::InvalidUuid => "Invalid UUID format",
            Self::InvalidJson => "Invalid JSON body",
            Self::InvalidQuery => "Invalid query parameters",
            Self::InvalidUpload => "Invalid file upload",
            Self::BadRequest => "Bad request",
            Self::NotFound => "Resource not found",
            Self::PayloadTooLarge => "Request body is too large",
            Self::InternalError => "An internal server error occurred",
        }
    }
}
