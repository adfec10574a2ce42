//! # Web API Error Types
//!
//! HTTP-facing errors and their status-code mappings. The core's denial
//! kinds map 1:1: Unauthenticated → 401, Forbidden → 403. Everything else
//! is the usual 400/404/500 split. Database details never reach the
//! client.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::error::{Denial, DenialKind, LiftopsError};

/// Web API specific errors with HTTP status code mappings.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Authentication required")]
    Unauthorized,

    #[error("Access denied")]
    Forbidden,

    #[error("Resource not found")]
    NotFound,

    #[error("Invalid request: {message}")]
    BadRequest { message: String },

    #[error("Email already registered")]
    Conflict,

    #[error("Database operation failed")]
    Database,

    #[error("Internal server error")]
    Internal,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest {
            message: message.into(),
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden => StatusCode::FORBIDDEN,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            ApiError::Conflict => StatusCode::CONFLICT,
            ApiError::Database | ApiError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = Json(json!({ "message": self.to_string() }));
        (status, body).into_response()
    }
}

impl From<Denial> for ApiError {
    fn from(denial: Denial) -> Self {
        match denial.kind {
            DenialKind::Unauthenticated => ApiError::Unauthorized,
            DenialKind::Forbidden => ApiError::Forbidden,
        }
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(e: sqlx::Error) -> Self {
        error!(error = %e, "database operation failed");
        ApiError::Database
    }
}

impl From<LiftopsError> for ApiError {
    fn from(e: LiftopsError) -> Self {
        match e {
            LiftopsError::Validation(message) => ApiError::BadRequest { message },
            // An invariant violation is an internal bug; clients get a
            // plain denial while the log keeps the distinction.
            LiftopsError::InvalidState(detail) => {
                error!(%detail, "invariant violation surfaced at the web layer");
                ApiError::Forbidden
            }
            LiftopsError::Database(e) => ApiError::from(e),
            other => {
                error!(error = %other, "internal error");
                ApiError::Internal
            }
        }
    }
}
