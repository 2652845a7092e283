//! Escalation board: a background worker that watches open consultations,
//! ranks them by urgency and wait, and broadcasts an alert the first time a
//! consultation exceeds the maximum wait for its classification.

pub mod error;
pub mod handlers;
pub mod models;
pub mod router;
pub mod services;

pub use error::EscalationError;
pub use models::*;
pub use services::*;
pub use router::escalation_routes;
