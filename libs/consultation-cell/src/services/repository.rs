// libs/consultation-cell/src/services/repository.rs
use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::ConsultationError;
use crate::models::{ConsultationFilter, ConsultationRecord, ConsultationStatus, StatusHistoryEntry};
use crate::services::ledger::HistoryLedger;

/// Status and version a conditional write expects to find stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpectedState {
    pub status: ConsultationStatus,
    pub version: i64,
}

impl ExpectedState {
    pub fn of(record: &ConsultationRecord) -> Self {
        Self {
            status: record.status,
            version: record.version,
        }
    }

    pub fn matches(&self, record: &ConsultationRecord) -> bool {
        record.status == self.status && record.version == self.version
    }
}

/// Persistence for consultations and their status ledger.
///
/// `commit_transition` and `update_if_status` are compare-and-set operations:
/// they only write when the stored record still has the `expected` status and
/// version, and report `false` otherwise.
#[async_trait]
pub trait ConsultationRepository: Send + Sync {
    async fn insert(&self, record: &ConsultationRecord) -> Result<(), ConsultationError>;

    async fn get(&self, id: Uuid) -> Result<Option<ConsultationRecord>, ConsultationError>;

    async fn list(&self, filter: &ConsultationFilter) -> Result<Vec<ConsultationRecord>, ConsultationError>;

    /// Replace the record and append `entry` as one atomic unit.
    async fn commit_transition(
        &self,
        expected: ExpectedState,
        record: &ConsultationRecord,
        entry: &StatusHistoryEntry,
    ) -> Result<bool, ConsultationError>;

    /// Replace the record without touching the ledger.
    async fn update_if_status(
        &self,
        expected: ExpectedState,
        record: &ConsultationRecord,
    ) -> Result<bool, ConsultationError>;

    async fn history(&self, consultation_id: Uuid) -> Result<Vec<StatusHistoryEntry>, ConsultationError>;
}

#[derive(Default)]
struct Store {
    records: HashMap<Uuid, ConsultationRecord>,
    ledger: HistoryLedger,
}

/// Process-local repository. Records and ledger sit behind one lock so a
/// transition and its history entry become visible together.
#[derive(Default)]
pub struct InMemoryConsultationRepository {
    store: RwLock<Store>,
}

impl InMemoryConsultationRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ConsultationRepository for InMemoryConsultationRepository {
    async fn insert(&self, record: &ConsultationRecord) -> Result<(), ConsultationError> {
        let mut store = self.store.write().await;
        if store.records.contains_key(&record.id) {
            return Err(ConsultationError::StorageError(format!(
                "Consultation {} already exists",
                record.id
            )));
        }
        store.records.insert(record.id, record.clone());
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Option<ConsultationRecord>, ConsultationError> {
        Ok(self.store.read().await.records.get(&id).cloned())
    }

    async fn list(&self, filter: &ConsultationFilter) -> Result<Vec<ConsultationRecord>, ConsultationError> {
        let store = self.store.read().await;
        let mut records: Vec<ConsultationRecord> = store
            .records
            .values()
            .filter(|record| filter.matches(record))
            .cloned()
            .collect();

        records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(records)
    }

    async fn commit_transition(
        &self,
        expected: ExpectedState,
        record: &ConsultationRecord,
        entry: &StatusHistoryEntry,
    ) -> Result<bool, ConsultationError> {
        let mut store = self.store.write().await;

        match store.records.get_mut(&record.id) {
            Some(current) if expected.matches(current) => {
                *current = record.clone();
            }
            Some(_) => return Ok(false),
            None => return Err(ConsultationError::NotFound(record.id)),
        }

        store.ledger.append(entry.clone());
        Ok(true)
    }

    async fn update_if_status(
        &self,
        expected: ExpectedState,
        record: &ConsultationRecord,
    ) -> Result<bool, ConsultationError> {
        let mut store = self.store.write().await;

        match store.records.get_mut(&record.id) {
            Some(current) if expected.matches(current) => {
                *current = record.clone();
                Ok(true)
            }
            Some(_) => Ok(false),
            None => Err(ConsultationError::NotFound(record.id)),
        }
    }

    async fn history(&self, consultation_id: Uuid) -> Result<Vec<StatusHistoryEntry>, ConsultationError> {
        Ok(self.store.read().await.ledger.list_for(consultation_id))
    }
}
