//! HTTP error handling and response types.
//!
//! Every failure a handler can produce is an [`AppError`]. The mapping to a
//! status code and machine-readable code lives in one exhaustive `match`.
//! Internal errors are logged here and answered with a generic message; the
//! [`reveal_internal_errors`] middleware puts the real message back in
//! development.

use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use tracing::error;

use super::dto::{ApiResponse, ErrorCode};
use super::state::AppState;
use crate::db::repository::RepositoryError;
use crate::validation::{FieldErrors, ValidationError};

/// Message returned for every 500 outside development.
pub const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";

/// Application error type for HTTP handlers.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Missing or malformed input
    #[error("{message}")]
    Validation {
        message: String,
        details: FieldErrors,
    },
    /// Required path parameter absent
    #[error("{0}")]
    MissingParameter(String),
    /// Malformed entity reference
    #[error("{0}")]
    InvalidIdentifier(String),
    /// Entity or referenced entity absent
    #[error("{0}")]
    NotFound(String),
    /// Known path, unsupported method
    #[error("{0}")]
    MethodNotAllowed(String),
    /// Unique constraint violated on write
    #[error("{0}")]
    DuplicateKey(String),
    /// Anything unanticipated
    #[error("{0}")]
    Internal(String),
}

impl AppError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
            details: FieldErrors::new(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn status_and_code(&self) -> (StatusCode, ErrorCode) {
        match self {
            Self::Validation { .. } => (StatusCode::BAD_REQUEST, ErrorCode::ValidationError),
            Self::MissingParameter(_) => (StatusCode::BAD_REQUEST, ErrorCode::MissingParameter),
            Self::InvalidIdentifier(_) => (StatusCode::BAD_REQUEST, ErrorCode::InvalidObjectId),
            Self::NotFound(_) => (StatusCode::NOT_FOUND, ErrorCode::NotFound),
            Self::MethodNotAllowed(_) => {
                (StatusCode::METHOD_NOT_ALLOWED, ErrorCode::MethodNotAllowed)
            }
            Self::DuplicateKey(_) => (StatusCode::CONFLICT, ErrorCode::DuplicateKeyError),
            Self::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorCode::InternalServerError,
            ),
        }
    }
}

/// Underlying message of a 500, attached to the response for the
/// development-mode middleware.
#[derive(Debug, Clone)]
pub struct InternalErrorDetail(pub String);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        match self {
            AppError::Internal(detail) => {
                error!(error = %detail, "Request failed with internal error");
                let mut response = (
                    status,
                    Json(ApiResponse::<()>::error(code, INTERNAL_ERROR_MESSAGE, None)),
                )
                    .into_response();
                response.extensions_mut().insert(InternalErrorDetail(detail));
                response
            }
            AppError::Validation { message, details } => {
                let details = (!details.is_empty()).then_some(details);
                (status, Json(ApiResponse::<()>::error(code, message, details))).into_response()
            }
            AppError::MissingParameter(message)
            | AppError::InvalidIdentifier(message)
            | AppError::NotFound(message)
            | AppError::MethodNotAllowed(message)
            | AppError::DuplicateKey(message) => {
                (status, Json(ApiResponse::<()>::error(code, message, None))).into_response()
            }
        }
    }
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        match err {
            ValidationError::MissingParameter(_) => AppError::MissingParameter(err.to_string()),
            ValidationError::InvalidIdentifier { .. } => {
                AppError::InvalidIdentifier(err.to_string())
            }
            ValidationError::InvalidFields { message, fields } => AppError::Validation {
                message,
                details: fields,
            },
        }
    }
}

impl From<RepositoryError> for AppError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound { message, .. } => AppError::NotFound(message),
            RepositoryError::DuplicateKey { message, .. } => AppError::DuplicateKey(message),
            RepositoryError::ValidationError { message, .. } => AppError::validation(message),
            other => AppError::Internal(other.to_string()),
        }
    }
}

/// In development, replace the generic 500 message with the logged one.
pub async fn reveal_internal_errors(
    State(state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let response = next.run(request).await;

    if !state.environment.is_development() {
        return response;
    }

    match response.extensions().get::<InternalErrorDetail>() {
        Some(InternalErrorDetail(detail)) => {
            let body = ApiResponse::<()>::error(ErrorCode::InternalServerError, detail.clone(), None);
            (response.status(), Json(body)).into_response()
        }
        None => response,
    }
}
