//! Data Transfer Objects for the HTTP API.
//!
//! Every JSON response is wrapped in [`ApiResponse`]. Request bodies are
//! re-exported from [`crate::api`], where they are validated.

use serde::{Deserialize, Serialize};

pub use crate::api::{
    CreateComicRequest, CreateSeriesRequest, UpdateComicRequest, UpdateSeriesRequest,
};
use crate::validation::FieldErrors;

/// Machine-readable error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    ValidationError,
    MissingParameter,
    InvalidObjectId,
    NotFound,
    MethodNotAllowed,
    DuplicateKeyError,
    InternalServerError,
}

/// Uniform response envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorCode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<FieldErrors>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
            error: None,
            details: None,
        }
    }

    pub fn error(code: ErrorCode, message: impl Into<String>, details: Option<FieldErrors>) -> Self {
        Self {
            success: false,
            data: None,
            message: Some(message.into()),
            error: Some(code),
            details,
        }
    }
}

/// Query parameters for `GET /series`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SeriesListQuery {
    pub publisher: Option<String>,
}

/// Query parameters for `GET /series/search`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
}

/// Query parameters carrying a `limit`.
///
/// Kept as text so each endpoint applies its own limit policy.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LimitQuery {
    pub limit: Option<String>,
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub database: String,
}
