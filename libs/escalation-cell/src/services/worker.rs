use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tokio::time::{interval, Duration, MissedTickBehavior};
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

use consultation_cell::{ConsultationFilter, ConsultationRepository};

use crate::error::EscalationError;
use crate::models::{EscalationAlert, EscalationBoard, EscalationConfig};
use crate::services::board::build_board;
use crate::services::notifier::AlertNotifier;

/// Periodically rebuilds the escalation board from the repository. Reads
/// only; it never writes consultations.
pub struct EscalationWorker {
    config: EscalationConfig,
    repository: Arc<dyn ConsultationRepository>,
    notifier: Arc<AlertNotifier>,
    board: RwLock<EscalationBoard>,
    overdue: RwLock<HashSet<Uuid>>,
    is_shutdown: RwLock<bool>,
}

impl EscalationWorker {
    pub fn new(config: EscalationConfig, repository: Arc<dyn ConsultationRepository>) -> Self {
        let notifier = Arc::new(AlertNotifier::new(config.alert_channel_capacity));

        Self {
            config,
            repository,
            notifier,
            board: RwLock::new(EscalationBoard::empty()),
            overdue: RwLock::new(HashSet::new()),
            is_shutdown: RwLock::new(false),
        }
    }

    pub fn notifier(&self) -> Arc<AlertNotifier> {
        Arc::clone(&self.notifier)
    }

    pub async fn board(&self) -> EscalationBoard {
        self.board.read().await.clone()
    }

    #[instrument(skip(self), fields(worker = %self.config.worker_id))]
    pub async fn start(&self) -> Result<(), EscalationError> {
        info!("Starting escalation worker, interval {}s", self.config.interval_seconds);

        let mut ticker = interval(Duration::from_secs(self.config.interval_seconds.max(1)));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {}
                _ = self.wait_for_shutdown() => {
                    break;
                }
            }

            // A failed read keeps the previous board and retries next tick.
            if let Err(e) = self.tick(Utc::now()).await {
                error!("Escalation refresh failed: {}", e);
            }
        }

        info!("Escalation worker {} stopped", self.config.worker_id);
        Ok(())
    }

    pub async fn shutdown(&self) {
        info!("Initiating shutdown for escalation worker {}", self.config.worker_id);
        *self.is_shutdown.write().await = true;
    }

    /// Rebuild the board as of `now` and alert on newly overdue consultations.
    pub async fn tick(&self, now: DateTime<Utc>) -> Result<EscalationBoard, EscalationError> {
        let records = self.repository.list(&ConsultationFilter::open()).await?;
        let board = build_board(&records, now);

        let overdue_now: HashSet<Uuid> = board
            .entries
            .iter()
            .filter(|e| e.overdue)
            .map(|e| e.consultation_id)
            .collect();

        {
            let previous = self.overdue.read().await;
            for entry in board.entries.iter().filter(|e| e.overdue && !previous.contains(&e.consultation_id)) {
                warn!(
                    "Consultation {} overdue: waiting {} min in {} ({:?}, limit {} min)",
                    entry.consultation_id, entry.wait_minutes, entry.status, entry.classification, entry.max_wait_minutes
                );
                self.notifier.publish(&EscalationAlert::for_entry(entry, now))?;
            }
        }

        debug!("Escalation board: {} open, {} overdue", board.total, board.overdue);

        *self.overdue.write().await = overdue_now;
        *self.board.write().await = board.clone();
        Ok(board)
    }

    async fn wait_for_shutdown(&self) {
        loop {
            if *self.is_shutdown.read().await {
                break;
            }
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
    }
}
