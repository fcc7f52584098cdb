// src/error.rs
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

use crate::db::StoreError;
use crate::validation::ValidationError;

#[derive(Debug, Serialize)]
pub struct ErrorResponseBody {
    pub error: String,
}

/// Every failure a handler can answer with. The message is sent to the
/// client verbatim; `Internal` keeps its cause for the server log only.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("{message}")]
    Internal {
        message: String,
        #[source]
        source: StoreError,
    },
}

impl AppError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        AppError::BadRequest(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        AppError::Conflict(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        AppError::NotFound(msg.into())
    }

    pub fn internal(msg: impl Into<String>, source: StoreError) -> Self {
        AppError::Internal {
            message: msg.into(),
            source,
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        AppError::BadRequest(err.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let msg = match self {
            AppError::BadRequest(msg) | AppError::Conflict(msg) | AppError::NotFound(msg) => msg,
            AppError::Internal { message, source } => {
                error!("{message}: {source}");
                message
            }
        };

        let body = Json(ErrorResponseBody { error: msg });
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_follow_the_error_kind() {
        assert_eq!(AppError::bad_request("x").status(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::conflict("x").status(), StatusCode::CONFLICT);
        assert_eq!(AppError::not_found("x").status(), StatusCode::NOT_FOUND);
        assert_eq!(
            AppError::internal("x", StoreError::Storage(sqlx::Error::PoolTimedOut)).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn validation_errors_become_bad_requests() {
        let err: AppError = ValidationError::MissingField.into();
        assert!(matches!(err, AppError::BadRequest(ref m) if m == "Name and email are required"));
    }
}
