pub mod board;
pub mod notifier;
pub mod worker;

pub use board::build_board;
pub use notifier::{AlertNotifier, AlertReceiver};
pub use worker::EscalationWorker;
