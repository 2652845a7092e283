// libs/consultation-cell/src/services/ledger.rs
use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::models::{ConsultationStatus, StatusHistoryEntry};

/// Append-only status history, keyed by consultation.
#[derive(Debug, Default)]
pub struct HistoryLedger {
    entries: HashMap<Uuid, Vec<StatusHistoryEntry>>,
}

impl HistoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, entry: StatusHistoryEntry) {
        self.entries
            .entry(entry.consultation_id)
            .or_default()
            .push(entry);
    }

    /// Entries for one consultation in the order they were committed.
    pub fn list_for(&self, consultation_id: Uuid) -> Vec<StatusHistoryEntry> {
        self.entries
            .get(&consultation_id)
            .cloned()
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StateDuration {
    pub status: ConsultationStatus,
    pub entered_at: DateTime<Utc>,
    pub left_at: Option<DateTime<Utc>>,
    pub minutes: i64,
}

/// Time spent in each state reached through the ledger. The open segment is
/// measured up to `now`. The initial `requested` segment has no entry of its
/// own and is only reported from its first exit.
pub fn time_in_states(history: &[StatusHistoryEntry], now: DateTime<Utc>) -> Vec<StateDuration> {
    let mut segments = Vec::with_capacity(history.len());

    for (i, entry) in history.iter().enumerate() {
        let left_at = history.get(i + 1).map(|next| next.recorded_at);
        let until = left_at.unwrap_or(now);

        segments.push(StateDuration {
            status: entry.to_status,
            entered_at: entry.recorded_at,
            left_at,
            minutes: (until - entry.recorded_at).num_minutes().max(0),
        });
    }

    segments
}

/// When the record last entered `status`, if the ledger shows it.
pub fn entered_at(history: &[StatusHistoryEntry], status: ConsultationStatus) -> Option<DateTime<Utc>> {
    history
        .iter()
        .rev()
        .find(|entry| entry.to_status == status)
        .map(|entry| entry.recorded_at)
}
