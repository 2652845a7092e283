use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not Found: {0}")]
    NotFound(String),

    #[error("Bad Request: {0}")]
    BadRequest(String),

    #[error("Internal Server Error: {0}")]
    Internal(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Precondition failed: {0}")]
    PreconditionFailed(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("External service error: {0}")]
    ExternalService(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message, retryable) = match &self {
            AppError::Auth(msg) => (StatusCode::UNAUTHORIZED, msg, false),
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg, false),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg, false),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg, false),
            AppError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg, false),
            AppError::Database(msg) => (StatusCode::SERVICE_UNAVAILABLE, msg, true),
            AppError::ValidationError(msg) => (StatusCode::BAD_REQUEST, msg, false),
            AppError::PreconditionFailed(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg, false),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg, false),
            AppError::ExternalService(msg) => (StatusCode::BAD_GATEWAY, msg, true),
        };

        tracing::error!("Error: {}: {}", status, message);

        let body = Json(json!({
            "error": message,
            "retryable": retryable
        }));

        (status, body).into_response()
    }
}
