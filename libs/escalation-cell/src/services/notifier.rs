use tokio::sync::broadcast;
use tracing::debug;

use crate::error::EscalationError;
use crate::models::EscalationAlert;

pub type AlertSender = broadcast::Sender<String>;
pub type AlertReceiver = broadcast::Receiver<String>;

/// Fan-out of overdue alerts as JSON strings.
pub struct AlertNotifier {
    sender: AlertSender,
}

impl AlertNotifier {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    pub fn subscribe(&self) -> AlertReceiver {
        self.sender.subscribe()
    }

    /// Returns how many subscribers received the alert.
    pub fn publish(&self, alert: &EscalationAlert) -> Result<usize, EscalationError> {
        let message = serde_json::to_string(alert)?;

        // Sending with no subscribers is not an error for alerts.
        let delivered = self.sender.send(message).unwrap_or(0);
        debug!("Alert for consultation {} delivered to {} subscribers", alert.consultation_id, delivered);
        Ok(delivered)
    }
}
