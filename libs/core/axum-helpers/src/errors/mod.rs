pub mod codes;
pub mod handlers;
pub mod responses;

pub use codes::ErrorCode;

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use core_config::Environment;
use sea_orm::DbErr;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use thiserror::Error;
use tracing_error::SpanTrace;
use utoipa::ToSchema;
use uuid::Error as UuidError;
use validator::ValidationErrors;

static EXPOSE_ERROR_STACK: OnceLock<bool> = OnceLock::new();

/// Decide once, at startup, whether error bodies carry `errorStack`.
///
/// Only `development` exposes it. Until this is called the stack stays empty.
pub fn init_error_reporting(environment: &Environment) {
    if EXPOSE_ERROR_STACK.set(environment.is_development()).is_err() {
        tracing::debug!("Error reporting already initialized");
    }
}

fn expose_error_stack() -> bool {
    EXPOSE_ERROR_STACK.get().copied().unwrap_or(false)
}

/// Body of every error response.
///
/// ```json
/// { "message": "Product not found", "errorStack": "" }
/// ```
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Human-readable error message
    pub message: String,
    /// Debug chain and span trace in development, empty otherwise
    #[serde(rename = "errorStack")]
    pub error_stack: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            error_stack: String::new(),
        }
    }
}

/// Terminal error type of the HTTP layer.
///
/// Domain errors convert into it; its `IntoResponse` is the single place where
/// failures become status codes and `{message, errorStack}` bodies.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] DbErr),

    #[error("JSON extraction error: {0}")]
    JsonExtractorRejection(#[from] JsonRejection),

    #[error("Validation error: {0}")]
    ValidationError(#[from] ValidationErrors),

    #[error("UUID error: {0}")]
    UuidError(#[from] UuidError),

    #[error("Bad Request: {0}")]
    BadRequest(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not Found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal Server Error: {0}")]
    InternalServerError(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Database(_) | AppError::InternalServerError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            AppError::JsonExtractorRejection(_)
            | AppError::ValidationError(_)
            | AppError::UuidError(_)
            | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
        }
    }

    pub fn error_code(&self) -> ErrorCode {
        match self {
            AppError::Database(_) => ErrorCode::DatabaseError,
            AppError::JsonExtractorRejection(_) => ErrorCode::JsonExtraction,
            AppError::ValidationError(_) => ErrorCode::ValidationError,
            AppError::UuidError(_) => ErrorCode::InvalidUuid,
            AppError::BadRequest(_) => ErrorCode::BadRequest,
            AppError::Unauthorized(_) => ErrorCode::Unauthorized,
            AppError::Forbidden(_) => ErrorCode::Forbidden,
            AppError::NotFound(_) => ErrorCode::NotFound,
            AppError::Conflict(_) => ErrorCode::Conflict,
            AppError::InternalServerError(_) => ErrorCode::InternalError,
        }
    }

    /// Text placed in the `message` field.
    ///
    /// Database failures never leak driver details.
    pub fn message(&self) -> String {
        let code = self.error_code();
        let text = match self {
            AppError::Database(_) | AppError::UuidError(_) => String::new(),
            AppError::JsonExtractorRejection(e) => e.body_text(),
            AppError::ValidationError(e) => validation_message(e),
            AppError::BadRequest(msg)
            | AppError::Unauthorized(msg)
            | AppError::Forbidden(msg)
            | AppError::NotFound(msg)
            | AppError::Conflict(msg)
            | AppError::InternalServerError(msg) => msg.clone(),
        };

        if text.trim().is_empty() {
            code.default_message().to_string()
        } else {
            text
        }
    }

    /// Build the response body, with or without the debug stack.
    pub fn to_error_response(&self, include_stack: bool) -> ErrorResponse {
        let error_stack = if include_stack {
            format!("{self:?}\n{}", SpanTrace::capture())
        } else {
            String::new()
        };

        ErrorResponse {
            message: self.message(),
            error_stack,
        }
    }

    fn log(&self) {
        let code = self.error_code();
        match self {
            AppError::Database(e) => {
                tracing::error!(error_code = code.code(), "Database error: {:?}", e);
            }
            AppError::InternalServerError(msg) => {
                tracing::error!(error_code = code.code(), "Internal server error: {}", msg);
            }
            AppError::JsonExtractorRejection(e) => {
                tracing::warn!(error_code = code.code(), "JSON extraction error: {:?}", e);
            }
            AppError::UuidError(e) => {
                tracing::warn!(error_code = code.code(), "UUID error: {:?}", e);
            }
            other => {
                tracing::info!(error_code = code.code(), "{}", other);
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        self.log();
        let body = self.to_error_response(expose_error_stack());
        (self.status(), Json(body)).into_response()
    }
}

/// "field: reason" pairs, sorted by field name.
fn validation_message(errors: &ValidationErrors) -> String {
    let mut parts: Vec<String> = errors
        .field_errors()
        .iter()
        .filter_map(|(field, errs)| {
            errs.first().map(|err| {
                let reason = err
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| err.code.to_string());
                format!("{field}: {reason}")
            })
        })
        .collect();
    parts.sort();
    parts.join(", ")
}

/// Respond with an arbitrary status and message in the standard body shape.
pub fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(ErrorResponse::new(message))).into_response()
}
