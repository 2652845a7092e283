// libs/consultation-cell/src/error.rs
use thiserror::Error;
use uuid::Uuid;

use shared_models::error::AppError;

use crate::models::ConsultationStatus;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConsultationError {
    #[error("Consultation not found: {0}")]
    NotFound(Uuid),

    #[error("Invalid transition from {from} to {to}")]
    InvalidTransition {
        from: ConsultationStatus,
        to: ConsultationStatus,
    },

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Precondition failed: {0}")]
    PreconditionFailed(String),

    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("Upstream unavailable: {0}")]
    UpstreamUnavailable(String),
}

impl ConsultationError {
    /// Transient failures; the caller may retry the same request.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ConsultationError::StorageError(_) | ConsultationError::UpstreamUnavailable(_)
        )
    }
}

impl From<ConsultationError> for AppError {
    fn from(err: ConsultationError) -> Self {
        match err {
            ConsultationError::NotFound(_) => AppError::NotFound(err.to_string()),
            ConsultationError::InvalidTransition { .. } => AppError::Conflict(err.to_string()),
            ConsultationError::Forbidden(msg) => AppError::Forbidden(msg),
            ConsultationError::PreconditionFailed(msg) => AppError::PreconditionFailed(msg),
            ConsultationError::StorageError(msg) => AppError::Database(msg),
            ConsultationError::UpstreamUnavailable(msg) => AppError::ExternalService(msg),
        }
    }
}
