use thiserror::Error;

use consultation_cell::ConsultationError;

#[derive(Error, Debug)]
pub enum EscalationError {
    #[error("Failed to read consultations: {0}")]
    Storage(#[from] ConsultationError),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}
