pub mod ledger;
pub mod repository;
pub mod routing;
pub mod supabase_store;
pub mod transitions;
pub mod triage;
pub mod wait_time;

pub use ledger::{time_in_states, HistoryLedger, StateDuration};
pub use repository::{ConsultationRepository, ExpectedState, InMemoryConsultationRepository};
pub use routing::{RoutingConfig, RoutingEngine};
pub use supabase_store::SupabaseConsultationRepository;
pub use transitions::{rule_for, valid_targets, TransitionEffect, TransitionRule};
pub use triage::classify_urgency;
pub use wait_time::{current_wait_minutes, is_overdue, max_wait_minutes};
