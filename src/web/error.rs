//! API error handling for the Stowage web layer.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::collections::HashMap;

use crate::upload::{ALLOWED_EXACT_TYPES, ALLOWED_TYPE_PREFIXES};
use crate::StowageError;

/// API error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Bad request (400).
    BadRequest,
    /// Payload too large (413).
    PayloadTooLarge,
    /// Unsupported media type (415).
    UnsupportedMediaType,
    /// Internal server error (500).
    InternalError,
}

impl ErrorCode {
    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ErrorCode::BadRequest => StatusCode::BAD_REQUEST,
            ErrorCode::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            ErrorCode::UnsupportedMediaType => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// API error response body.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// Error details.
    pub error: ErrorDetail,
}

/// Error detail.
#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    /// Error code.
    pub code: ErrorCode,
    /// Human-readable message.
    pub message: String,
    /// Field-level error details.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<HashMap<String, Vec<String>>>,
}

/// API error type.
///
/// Carries the HTTP status (through its code), a message, and optional
/// field-level details.
#[derive(Debug)]
pub struct ApiError {
    code: ErrorCode,
    message: String,
    details: Option<HashMap<String, Vec<String>>>,
}

impl ApiError {
    /// Create a new API error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
        }
    }

    /// Create a new API error with field-level details.
    pub fn with_details(
        code: ErrorCode,
        message: impl Into<String>,
        details: HashMap<String, Vec<String>>,
    ) -> Self {
        Self {
            code,
            message: message.into(),
            details: Some(details),
        }
    }

    /// Create a bad request error.
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::BadRequest, message)
    }

    /// Create a payload too large error.
    pub fn payload_too_large(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::PayloadTooLarge, message)
    }

    /// Create an internal server error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }

    /// Error code.
    pub fn code(&self) -> ErrorCode {
        self.code
    }

    /// HTTP status carried by this error.
    pub fn status(&self) -> StatusCode {
        self.code.status_code()
    }

    /// Human-readable message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Whether this is a client-side (4xx) error.
    pub fn is_operational(&self) -> bool {
        self.status().is_client_error()
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.code.status_code();
        if self.is_operational() {
            tracing::warn!(status = status.as_u16(), message = %self.message, "Request rejected");
        }
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code,
                message: self.message,
                details: self.details,
            },
        };
        (status, Json(body)).into_response()
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}: {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

impl From<StowageError> for ApiError {
    fn from(err: StowageError) -> Self {
        match &err {
            StowageError::TooLarge { limit } => {
                let max_mb = limit / 1024 / 1024;
                if max_mb > 0 {
                    ApiError::payload_too_large(format!("File too large (max {max_mb}MB)"))
                } else {
                    ApiError::payload_too_large(format!("File too large (max {limit} bytes)"))
                }
            }
            StowageError::UnsupportedType(mime) => {
                let allowed = ALLOWED_TYPE_PREFIXES
                    .iter()
                    .map(|prefix| format!("{prefix}*"))
                    .chain(ALLOWED_EXACT_TYPES.iter().map(|t| t.to_string()))
                    .collect();
                let mut details = HashMap::new();
                details.insert("allowed_types".to_string(), allowed);
                ApiError::with_details(
                    ErrorCode::UnsupportedMediaType,
                    format!("Unsupported media type: {mime}"),
                    details,
                )
            }
            StowageError::TooManyFiles { max } => {
                ApiError::bad_request(format!("Too many files (max {max})"))
            }
            _ => {
                tracing::error!(status = 500, "Internal error: {}", err);
                ApiError::internal("An internal error occurred")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_status() {
        assert_eq!(ErrorCode::BadRequest.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ErrorCode::PayloadTooLarge.status_code(),
            StatusCode::PAYLOAD_TOO_LARGE
        );
        assert_eq!(
            ErrorCode::UnsupportedMediaType.status_code(),
            StatusCode::UNSUPPORTED_MEDIA_TYPE
        );
        assert_eq!(
            ErrorCode::InternalError.status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_api_error_constructors() {
        assert_eq!(ApiError::bad_request("bad").code(), ErrorCode::BadRequest);
        assert_eq!(
            ApiError::payload_too_large("big").code(),
            ErrorCode::PayloadTooLarge
        );
        assert_eq!(ApiError::internal("error").code(), ErrorCode::InternalError);
    }

    #[test]
    fn test_operational_errors() {
        assert!(ApiError::bad_request("bad").is_operational());
        assert!(ApiError::payload_too_large("big").is_operational());
        assert!(!ApiError::internal("boom").is_operational());
    }

    #[test]
    fn test_from_too_large() {
        let err: ApiError = StowageError::TooLarge {
            limit: 20 * 1024 * 1024,
        }
        .into();
        assert_eq!(err.status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(err.message(), "File too large (max 20MB)");

        let err: ApiError = StowageError::TooLarge { limit: 16 }.into();
        assert_eq!(err.message(), "File too large (max 16 bytes)");
    }

    #[test]
    fn test_from_unsupported_type() {
        let err: ApiError = StowageError::UnsupportedType("application/zip".to_string()).into();
        assert_eq!(err.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
        assert_eq!(err.code(), ErrorCode::UnsupportedMediaType);
        assert!(err.message().contains("application/zip"));
        assert_eq!(
            err.details.unwrap().get("allowed_types").unwrap(),
            &vec![
                "image/*".to_string(),
                "video/*".to_string(),
                "application/pdf".to_string(),
                "text/plain".to_string(),
            ]
        );
    }

    #[test]
    fn test_from_io_is_masked() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: ApiError = StowageError::Io(io_err).into();

        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.message(), "An internal error occurred");
    }

    #[test]
    fn test_display() {
        let err = ApiError::bad_request("No file provided");
        assert_eq!(err.to_string(), "BadRequest: No file provided");
    }
}
