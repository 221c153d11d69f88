// src/api/error.rs
// Centralized error handling for HTTP API responses

use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::fmt;
use tracing::error;

use crate::error::{ErrorKind, HtError};

/// Standard API error response, rendered as `{"message": ...}`
#[derive(Debug)]
pub struct ApiError {
    pub message: String,
    pub status_code: StatusCode,
}

impl ApiError {
    /// Create a new internal server error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::custom(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    /// Create a new bad request error
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::custom(StatusCode::BAD_REQUEST, message)
    }

    /// Create a new not found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::custom(StatusCode::NOT_FOUND, message)
    }

    /// Create a new unauthorized error
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::custom(StatusCode::UNAUTHORIZED, message)
    }

    /// Create a new custom error with specific status code
    pub fn custom(status_code: StatusCode, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status_code,
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status_code, Json(json!({ "message": self.message }))).into_response()
    }
}

/// Result type alias for API operations
pub type ApiResult<T> = Result<T, ApiError>;

/// Strip one pair of quotes wrapping the whole message, as left behind by
/// errors that render a bare key (`'Foo'`)
pub fn clean_message(message: &str) -> String {
    let trimmed = message.trim();
    for quote in ['\'', '"'] {
        if trimmed.len() >= 2 && trimmed.starts_with(quote) && trimmed.ends_with(quote) {
            return trimmed[1..trimmed.len() - 1].to_string();
        }
    }
    trimmed.to_string()
}

impl From<HtError> for ApiError {
    fn from(err: HtError) -> Self {
        match err.kind() {
            ErrorKind::NotFound => ApiError::not_found(err.to_string()),
            ErrorKind::InvalidParameterClass => ApiError::bad_request(err.to_string()),
            ErrorKind::Connectivity | ErrorKind::Unhandled => {
                error!("Unhandled error: {:?}", err);
                ApiError::internal(clean_message(&err.to_string()))
            }
        }
    }
}

// Malformed payloads count as unhandled errors
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        error!("Rejected JSON payload: {}", rejection.body_text());
        ApiError::internal(rejection.body_text())
    }
}

// A path segment that does not parse (e.g. a non-numeric index) names nothing
impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::not_found(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::bad_request(rejection.body_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_creation() {
        let error = ApiError::internal("Test error");
        assert_eq!(error.status_code, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(error.message, "Test error");
    }

    #[test]
    fn test_clean_message_strips_wrapping_quotes() {
        assert_eq!(clean_message("'Foo'"), "Foo");
        assert_eq!(clean_message("\"Foo\""), "Foo");
        assert_eq!(clean_message("Parameter 'Foo' not found"), "Parameter 'Foo' not found");
        assert_eq!(clean_message("'"), "'");
    }

    #[test]
    fn test_status_mapping() {
        let not_found: ApiError = HtError::UnknownParams(vec!["Foo".into()]).into();
        assert_eq!(not_found.status_code, StatusCode::NOT_FOUND);
        assert_eq!(not_found.message, "Parameter 'Foo' not found");

        let bad: ApiError = HtError::NotFastQueryable("Betriebsart".into()).into();
        assert_eq!(bad.status_code, StatusCode::BAD_REQUEST);

        let conn: ApiError = HtError::Connectivity("no answer".into()).into();
        assert_eq!(conn.status_code, StatusCode::INTERNAL_SERVER_ERROR);

        let other: ApiError = HtError::Other("'Foo'".into()).into();
        assert_eq!(other.status_code, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(other.message, "Foo");
    }
}
