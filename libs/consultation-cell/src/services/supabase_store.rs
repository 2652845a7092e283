// libs/consultation-cell/src/services/supabase_store.rs
use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::{debug, error, warn};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;

use crate::error::ConsultationError;
use crate::models::{ConsultationFilter, ConsultationRecord, StatusHistoryEntry};
use crate::services::repository::{ConsultationRepository, ExpectedState};

const CONSULTATIONS: &str = "consultations";
const HISTORY: &str = "consultation_status_history";
const COMMIT_FUNCTION: &str = "commit_consultation_transition";

/// PostgREST-backed repository. Transitions go through the
/// `commit_consultation_transition` function so the status check, the record
/// update and the ledger insert share one database transaction.
pub struct SupabaseConsultationRepository {
    supabase: SupabaseClient,
}

impl SupabaseConsultationRepository {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
        }
    }

    fn build_list_query(filter: &ConsultationFilter) -> String {
        let mut query_parts = Vec::new();

        if let Some(status) = filter.status {
            query_parts.push(format!("status=eq.{}", status));
        }
        if filter.open_only {
            query_parts.push("status=not.in.(finalized,cancelled)".to_string());
        }
        if let Some(patient_id) = filter.patient_id {
            query_parts.push(format!("patient_id=eq.{}", patient_id));
        }
        if let Some(professional_id) = filter.assigned_to {
            query_parts.push(format!(
                "or=(assigned_nurse_id.eq.{0},assigned_doctor_id.eq.{0})",
                professional_id
            ));
        }
        query_parts.push("order=created_at.desc".to_string());

        query_parts.join("&")
    }

    fn to_row(record: &ConsultationRecord) -> Result<Value, ConsultationError> {
        serde_json::to_value(record)
            .map_err(|e| ConsultationError::StorageError(format!("Failed to encode consultation: {}", e)))
    }
}

fn storage_error(context: &str, err: anyhow::Error) -> ConsultationError {
    error!("{}: {}", context, err);
    ConsultationError::StorageError(format!("{}: {}", context, err))
}

#[async_trait]
impl ConsultationRepository for SupabaseConsultationRepository {
    async fn insert(&self, record: &ConsultationRecord) -> Result<(), ConsultationError> {
        let row = Self::to_row(record)?;
        let _: Vec<Value> = self
            .supabase
            .insert(CONSULTATIONS, row)
            .await
            .map_err(|e| storage_error("Failed to insert consultation", e))?;
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Option<ConsultationRecord>, ConsultationError> {
        let rows: Vec<ConsultationRecord> = self
            .supabase
            .select(CONSULTATIONS, &format!("id=eq.{}", id))
            .await
            .map_err(|e| storage_error("Failed to fetch consultation", e))?;
        Ok(rows.into_iter().next())
    }

    async fn list(&self, filter: &ConsultationFilter) -> Result<Vec<ConsultationRecord>, ConsultationError> {
        let query = Self::build_list_query(filter);
        debug!("Listing consultations: {}", query);

        self.supabase
            .select(CONSULTATIONS, &query)
            .await
            .map_err(|e| storage_error("Failed to list consultations", e))
    }

    async fn commit_transition(
        &self,
        expected: ExpectedState,
        record: &ConsultationRecord,
        entry: &StatusHistoryEntry,
    ) -> Result<bool, ConsultationError> {
        let args = json!({
            "p_expected_status": expected.status,
            "p_expected_version": expected.version,
            "p_record": Self::to_row(record)?,
            "p_entry": serde_json::to_value(entry)
                .map_err(|e| ConsultationError::StorageError(e.to_string()))?,
        });

        let applied: bool = self
            .supabase
            .rpc(COMMIT_FUNCTION, args)
            .await
            .map_err(|e| storage_error("Failed to commit transition", e))?;

        if !applied {
            warn!(
                "Consultation {} changed since {} v{} was read",
                record.id, expected.status, expected.version
            );
        }
        Ok(applied)
    }

    async fn update_if_status(
        &self,
        expected: ExpectedState,
        record: &ConsultationRecord,
    ) -> Result<bool, ConsultationError> {
        let filter = format!(
            "id=eq.{}&status=eq.{}&version=eq.{}",
            record.id, expected.status, expected.version
        );
        let rows: Vec<Value> = self
            .supabase
            .update_where(CONSULTATIONS, &filter, Self::to_row(record)?)
            .await
            .map_err(|e| storage_error("Failed to update consultation", e))?;
        Ok(!rows.is_empty())
    }

    async fn history(&self, consultation_id: Uuid) -> Result<Vec<StatusHistoryEntry>, ConsultationError> {
        self.supabase
            .select(
                HISTORY,
                &format!("consultation_id=eq.{}&order=recorded_at.asc", consultation_id),
            )
            .await
            .map_err(|e| storage_error("Failed to fetch status history", e))
    }
}
