/// Error handling for the API server
///
/// Handlers return `Result<T, ApiError>`. Domain errors convert through
/// `From<AppError>`, which picks the status from the root [`ErrorKind`]
/// and logs the full context chain.
///
/// | Root kind          | Status |
/// |--------------------|--------|
/// | `NotFound`         | 404    |
/// | `BadRequest`       | 400    |
/// | `PermissionDenied` | 403    |
/// | `Conflict`         | 409    |
/// | `InvalidPassword`  | 401    |
/// | `Internal`         | 500    |
///
/// Body format:
///
/// ```json
/// { "error": "not_found", "message": "not found" }
/// ```

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use timetracker_shared::error::{AppError, ErrorKind};
use validator::Validate;

/// API result type alias
pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug)]
pub enum ApiError {
    /// 400
    BadRequest(String),

    /// 401: missing or unknown session, wrong password
    Unauthorized(String),

    /// 403
    Forbidden(String),

    /// 404
    NotFound(String),

    /// 409: duplicate email or friend relation
    Conflict(String),

    /// 422: request body failed validation
    ValidationError(Vec<ValidationErrorDetail>),

    /// 500; the message is logged, never sent
    InternalError(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationErrorDetail {
    pub field: String,
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Machine-readable code, e.g. `not_found`
    pub error: String,

    pub message: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<ValidationErrorDetail>>,
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            ApiError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            ApiError::Forbidden(msg) => write!(f, "Forbidden: {}", msg),
            ApiError::NotFound(msg) => write!(f, "Not found: {}", msg),
            ApiError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            ApiError::ValidationError(errors) => {
                write!(f, "Validation failed: {} errors", errors.len())
            }
            ApiError::InternalError(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message, details) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg, None),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "unauthorized", msg, None),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, "forbidden", msg, None),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg, None),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, "conflict", msg, None),
            ApiError::ValidationError(errors) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "validation_error",
                "Request validation failed".to_string(),
                Some(errors),
            ),
            ApiError::InternalError(msg) => {
                tracing::error!(error = %msg, "Internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal error occurred".to_string(),
                    None,
                )
            }
        };

        let body = Json(ErrorResponse {
            error: error_code.to_string(),
            message,
            details,
        });

        (status, body).into_response()
    }
}

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        let kind = err.kind();
        if kind != ErrorKind::Internal {
            tracing::debug!(error = %err.chain(), ?kind, "Request rejected");
        }

        let public = match err.root() {
            AppError::BadRequest(msg) => msg.clone(),
            root => root.to_string(),
        };

        match kind {
            ErrorKind::NotFound => ApiError::NotFound(public),
            ErrorKind::BadRequest => ApiError::BadRequest(public),
            ErrorKind::PermissionDenied => ApiError::Forbidden(public),
            ErrorKind::Conflict => ApiError::Conflict(public),
            ErrorKind::InvalidPassword => ApiError::Unauthorized(public),
            ErrorKind::Internal => ApiError::InternalError(err.chain()),
        }
    }
}

/// Runs `validator` rules on a request body
pub fn validate_request<T: Validate>(req: &T) -> ApiResult<()> {
    req.validate().map_err(|e| {
        let mut errors: Vec<ValidationErrorDetail> = e
            .field_errors()
            .iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(move |error| ValidationErrorDetail {
                    field: field.to_string(),
                    message: error
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| "Validation failed".to_string()),
                })
            })
            .collect();
        errors.sort_by(|a, b| a.field.cmp(&b.field));
        ApiError::ValidationError(errors)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use timetracker_shared::error::ResultExt;

    fn status_of(err: AppError) -> StatusCode {
        ApiError::from(err).into_response().status()
    }

    #[test]
    fn test_root_kind_decides_status() {
        assert_eq!(status_of(AppError::NotFound), StatusCode::NOT_FOUND);
        assert_eq!(status_of(AppError::bad_request("x")), StatusCode::BAD_REQUEST);
        assert_eq!(status_of(AppError::PermissionDenied), StatusCode::FORBIDDEN);
        assert_eq!(status_of(AppError::ConflictEmail), StatusCode::CONFLICT);
        assert_eq!(status_of(AppError::ConflictFriend), StatusCode::CONFLICT);
        assert_eq!(status_of(AppError::InvalidPassword), StatusCode::UNAUTHORIZED);
        assert_eq!(
            status_of(AppError::Internal("boom".to_string())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_context_is_unwrapped() {
        let wrapped: Result<(), AppError> = Err(AppError::PermissionDenied);
        let err = wrapped
            .context("entry.usecase.get_entry")
            .context("handler")
            .unwrap_err();

        assert!(matches!(ApiError::from(err), ApiError::Forbidden(_)));
    }

    #[test]
    fn test_bad_request_message_is_the_reason() {
        let err = ApiError::from(AppError::bad_request("invalid secret_token").wrap("auth"));
        match err {
            ApiError::BadRequest(msg) => assert_eq!(msg, "invalid secret_token"),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_internal_message_keeps_chain_for_logs() {
        let err = ApiError::from(AppError::Internal("pool closed".to_string()).wrap("db"));
        match err {
            ApiError::InternalError(msg) => assert!(msg.contains("pool closed")),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_error_display() {
        let err = ApiError::BadRequest("Invalid input".to_string());
        assert_eq!(err.to_string(), "Bad request: Invalid input");

        let err = ApiError::ValidationError(vec![ValidationErrorDetail {
            field: "email".to_string(),
            message: "Invalid email format".to_string(),
        }]);
        assert_eq!(err.to_string(), "Validation failed: 1 errors");
    }
}
