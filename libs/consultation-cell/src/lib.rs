// libs/consultation-cell/src/lib.rs
//! # Consultation Cell
//!
//! Owns the consultation lifecycle: the state machine in
//! [`services::transitions`], the [`RoutingEngine`] that applies it, the
//! append-only status ledger and the read-only wait-time queries used by the
//! escalation worker.
//!
//! ```text
//! requested -> triage -> awaiting_nurse -> in_nursing_attendance
//!           -> awaiting_doctor -> in_medical_attendance -> finalized
//! (any non-terminal state) -> cancelled
//! ```
//!
//! Persistence goes through [`ConsultationRepository`]; the Supabase
//! implementation relies on the `commit_consultation_transition` function in
//! `migrations/` for atomic status changes.

pub mod error;
pub mod handlers;
pub mod models;
pub mod router;
pub mod services;

pub use error::ConsultationError;
pub use models::*;
pub use services::*;
pub use router::consultation_routes;
