use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use consultation_cell::{ConsultationKind, ConsultationStatus, UrgencyClassification};
use shared_config::AppConfig;

#[derive(Debug, Clone)]
pub struct EscalationConfig {
    pub worker_id: String,
    pub interval_seconds: u64,
    pub alert_channel_capacity: usize,
}

impl EscalationConfig {
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            interval_seconds: config.escalation_interval_seconds,
            ..Self::default()
        }
    }
}

impl Default for EscalationConfig {
    fn default() -> Self {
        Self {
            worker_id: format!("escalation-{}", Uuid::new_v4()),
            interval_seconds: 30,
            alert_channel_capacity: 256,
        }
    }
}

/// One open consultation as seen by the escalation board.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EscalationEntry {
    pub consultation_id: Uuid,
    pub patient_id: Uuid,
    pub kind: ConsultationKind,
    pub status: ConsultationStatus,
    pub classification: UrgencyClassification,
    pub wait_minutes: i64,
    pub max_wait_minutes: i64,
    pub overdue: bool,
    pub assigned_nurse_id: Option<Uuid>,
    pub assigned_doctor_id: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EscalationBoard {
    pub generated_at: DateTime<Utc>,
    pub total: usize,
    pub overdue: usize,
    pub entries: Vec<EscalationEntry>,
}

impl EscalationBoard {
    pub fn empty() -> Self {
        Self {
            generated_at: Utc::now(),
            total: 0,
            overdue: 0,
            entries: Vec::new(),
        }
    }
}

/// Published once when a consultation crosses its maximum wait.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EscalationAlert {
    pub consultation_id: Uuid,
    pub status: ConsultationStatus,
    pub classification: UrgencyClassification,
    pub wait_minutes: i64,
    pub max_wait_minutes: i64,
    pub raised_at: DateTime<Utc>,
}

impl EscalationAlert {
    pub fn for_entry(entry: &EscalationEntry, raised_at: DateTime<Utc>) -> Self {
        Self {
            consultation_id: entry.consultation_id,
            status: entry.status,
            classification: entry.classification,
            wait_minutes: entry.wait_minutes,
            max_wait_minutes: entry.max_wait_minutes,
            raised_at,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct BoardQuery {
    #[serde(default)]
    pub overdue_only: bool,
}
