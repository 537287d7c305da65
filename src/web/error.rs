//! API error type shared by all handlers.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde::Serialize;
use serde_json::json;
use thiserror::Error;
use tracing::error;
use ts_rs::TS;

/// Machine-readable error codes exposed in response bodies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum ApiErrorCode {
    BadRequest,
    Unauthorized,
    Forbidden,
    NotFound,
    Internal,
}

impl ApiErrorCode {
    fn status(self) -> StatusCode {
        match self {
            ApiErrorCode::BadRequest => StatusCode::BAD_REQUEST,
            ApiErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiErrorCode::Forbidden => StatusCode::FORBIDDEN,
            ApiErrorCode::NotFound => StatusCode::NOT_FOUND,
            ApiErrorCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Debug, Error)]
#[error("{message}")]
pub struct ApiError {
    pub code: ApiErrorCode,
    pub message: String,
}

impl ApiError {
    pub fn new(code: ApiErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(ApiErrorCode::BadRequest, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(ApiErrorCode::Unauthorized, message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(ApiErrorCode::Forbidden, message)
    }

    pub fn not_found(kind: &str, identifier: impl std::fmt::Display) -> Self {
        Self::new(ApiErrorCode::NotFound, format!("{kind} '{identifier}' not found"))
    }

    /// Internal errors carry no detail to the client; the cause is logged
    /// at the point of failure.
    pub fn internal() -> Self {
        Self::new(ApiErrorCode::Internal, "internal server error")
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "error": self.code,
            "message": self.message,
        }));
        (self.code.status(), body).into_response()
    }
}

/// Log a data-layer failure and hide it behind a generic 500.
pub fn db_error(context: &str, err: anyhow::Error) -> ApiError {
    error!(error = %err, "{context} failed");
    ApiError::internal()
}

/// `Option -> Result` sugar for the common "fetch or 404" shape.
pub trait OptionNotFoundExt<T> {
    fn or_not_found(self, kind: &str, identifier: impl std::fmt::Display) -> Result<T, ApiError>;
}

impl<T> OptionNotFoundExt<T> for Option<T> {
    fn or_not_found(self, kind: &str, identifier: impl std::fmt::Display) -> Result<T, ApiError> {
        self.ok_or_else(|| ApiError::not_found(kind, identifier))
    }
}
