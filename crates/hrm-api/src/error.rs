//! API error handling
//!
//! Every failure leaving a handler becomes an [`AppError`], rendered as a
//! JSON [`ApiError`] body. Internal error text is logged, never returned.
//!
//! Author: hephaex@gmail.com

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use hrm_core::HrmError;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

/// API error response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiError {
    /// Error code
    #[schema(example = "VALIDATION_ERROR")]
    pub code: String,
    /// Human-readable message
    pub message: String,
    /// Field level details, only for validation errors
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn not_found(resource: &str) -> Self {
        Self::new("NOT_FOUND", format!("{resource} not found"))
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new("BAD_REQUEST", message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new("UNAUTHORIZED", message)
    }

    pub fn internal_error() -> Self {
        Self::new("INTERNAL_ERROR", "Internal server error")
    }
}

/// Application error type
#[derive(Debug, Error)]
pub enum AppError {
    /// Request body or parameters failed validation
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Username already exists")]
    DuplicateUsername,

    /// Unknown username or wrong password; the two are never distinguished
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Unauthorized")]
    Unauthorized,

    #[error("{0} not found")]
    NotFound(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Database error: {0}")]
    Database(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::DuplicateUsername => StatusCode::CONFLICT,
            AppError::InvalidCredentials | AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Internal(_) | AppError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let error = match self {
            AppError::Validation(details) => {
                ApiError::new("VALIDATION_ERROR", "Request validation failed").with_details(details)
            }
            AppError::BadRequest(msg) => ApiError::bad_request(msg),
            AppError::DuplicateUsername => {
                ApiError::new("DUPLICATE_USERNAME", "Username already exists")
            }
            AppError::InvalidCredentials => {
                ApiError::new("INVALID_CREDENTIALS", "Invalid username or password")
            }
            AppError::Unauthorized => ApiError::unauthorized("Authentication required"),
            AppError::NotFound(resource) => ApiError::not_found(&resource),
            AppError::Internal(msg) => {
                tracing::error!(error = %msg, "Internal error");
                ApiError::internal_error()
            }
            AppError::Database(msg) => {
                tracing::error!(error = %msg, "Database error");
                ApiError::new("DATABASE_ERROR", "Database operation failed")
            }
        };

        (status, Json(error)).into_response()
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl From<HrmError> for AppError {
    fn from(err: HrmError) -> Self {
        match err {
            HrmError::NotFound(what) => AppError::NotFound(what),
            HrmError::ValidationError(msg) => AppError::Validation(msg),
            HrmError::DatabaseError(msg) => AppError::Database(msg),
            HrmError::ConfigError(msg) => AppError::Internal(format!("Configuration error: {msg}")),
            HrmError::Other(err) => AppError::Internal(err.to_string()),
        }
    }
}
