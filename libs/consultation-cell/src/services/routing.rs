// libs/consultation-cell/src/services/routing.rs
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::time::timeout;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use professional_cell::{AvailabilityResolver, Professional, ProfessionalRole};
use shared_config::AppConfig;
use shared_models::auth::{Actor, Role};
use video_conferencing_cell::MeetingProvisioner;

use crate::error::ConsultationError;
use crate::models::{
    ClinicalData, ConsultationFilter, ConsultationKind, ConsultationRecord, ConsultationStatus,
    StatusHistoryEntry, TransitionPayload, TriageData,
};
use crate::services::repository::{ConsultationRepository, ExpectedState};
use crate::services::transitions::{authorize, rule_for, TransitionEffect};
use crate::services::triage::classify_urgency;

#[derive(Debug, Clone)]
pub struct RoutingConfig {
    /// Bound applied to every resolver and provisioner call.
    pub upstream_timeout: Duration,
}

impl RoutingConfig {
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            upstream_timeout: Duration::from_millis(config.upstream_timeout_ms),
        }
    }
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            upstream_timeout: Duration::from_millis(5000),
        }
    }
}

/// Drives consultations through their lifecycle. Holds no per-consultation
/// state; every write is a conditional update against the repository.
pub struct RoutingEngine {
    repository: Arc<dyn ConsultationRepository>,
    availability: Arc<dyn AvailabilityResolver>,
    meetings: Arc<dyn MeetingProvisioner>,
    config: RoutingConfig,
}

/// Record changes produced by a transition's side effect.
#[derive(Default)]
struct EffectOutcome {
    assigned_to: Option<Uuid>,
    note: Option<String>,
}

impl RoutingEngine {
    pub fn new(
        repository: Arc<dyn ConsultationRepository>,
        availability: Arc<dyn AvailabilityResolver>,
        meetings: Arc<dyn MeetingProvisioner>,
        config: RoutingConfig,
    ) -> Self {
        Self {
            repository,
            availability,
            meetings,
            config,
        }
    }

    pub fn repository(&self) -> Arc<dyn ConsultationRepository> {
        Arc::clone(&self.repository)
    }

    #[instrument(skip(self, initial_triage), fields(actor = %actor.id))]
    pub async fn create_consultation(
        &self,
        actor: &Actor,
        patient_id: Uuid,
        kind: ConsultationKind,
        initial_triage: Option<TriageData>,
    ) -> Result<ConsultationRecord, ConsultationError> {
        match actor.role {
            Role::Patient if actor.id != patient_id => {
                return Err(ConsultationError::Forbidden(
                    "Patients can only request consultations for themselves".to_string(),
                ));
            }
            Role::Patient | Role::Attendant | Role::Admin | Role::System => {}
            Role::Nurse | Role::Doctor => {
                return Err(ConsultationError::Forbidden(format!(
                    "Role {} cannot request consultations",
                    actor.role
                )));
            }
        }

        let mut record = ConsultationRecord::new(patient_id, kind);
        if let Some(mut triage) = initial_triage {
            // Self-reported intake: the nurse may still override it.
            triage.classification = None;
            triage.automatic_classification = Some(classify_urgency(&triage));
            triage.recorded_by = None;
            record.triage_data = Some(triage);
        }

        self.repository.insert(&record).await?;

        info!("Created {:?} consultation {} for patient {}", kind, record.id, patient_id);
        Ok(record)
    }

    pub async fn get_consultation(&self, id: Uuid) -> Result<ConsultationRecord, ConsultationError> {
        self.repository
            .get(id)
            .await?
            .ok_or(ConsultationError::NotFound(id))
    }

    pub async fn list_consultations(
        &self,
        filter: &ConsultationFilter,
    ) -> Result<Vec<ConsultationRecord>, ConsultationError> {
        self.repository.list(filter).await
    }

    pub async fn get_history(&self, id: Uuid) -> Result<Vec<StatusHistoryEntry>, ConsultationError> {
        // Unknown ids are an error rather than an empty ledger.
        self.get_consultation(id).await?;
        self.repository.history(id).await
    }

    /// Validate and apply `current -> target` for `actor`.
    #[instrument(skip(self, payload), fields(actor = %actor.id, role = %actor.role))]
    pub async fn attempt_transition(
        &self,
        id: Uuid,
        target: ConsultationStatus,
        actor: &Actor,
        payload: TransitionPayload,
    ) -> Result<ConsultationRecord, ConsultationError> {
        let current = self.get_consultation(id).await?;

        if actor.role == Role::Patient && current.patient_id != actor.id {
            return Err(ConsultationError::Forbidden(
                "Patients can only act on their own consultations".to_string(),
            ));
        }

        if current.status == target {
            if Self::claimed_by_another(&current, actor) {
                return Err(ConsultationError::InvalidTransition { from: current.status, to: target });
            }
            debug!("Consultation {} already {}, nothing to do", id, target);
            return Ok(current);
        }

        let from = current.status;
        let rule = rule_for(from, target)
            .ok_or(ConsultationError::InvalidTransition { from, to: target })?;
        authorize(&rule, actor, &current)?;

        let expected = ExpectedState::of(&current);
        let mut next = current;
        let outcome = self.apply_effect(rule.effect, &mut next, actor, payload).await?;

        next.status = target;
        next.touch(Utc::now());

        if !next.is_consistent() {
            return Err(ConsultationError::PreconditionFailed(format!(
                "Consultation {} would enter {} without its required assignment",
                id, target
            )));
        }

        let mut entry = StatusHistoryEntry::new(id, from, target, actor, next.updated_at);
        entry.assigned_to = outcome.assigned_to;
        entry.note = outcome.note;

        if !self.repository.commit_transition(expected, &next, &entry).await? {
            warn!("Lost race on consultation {}: {} -> {}", id, from, target);
            return Err(self.conflict_after_lost_race(id, from, target).await);
        }

        info!("Consultation {} moved {} -> {}", id, from, target);
        Ok(next)
    }

    /// Draft or amend triage data while the nurse is attending. No ledger entry.
    #[instrument(skip(self, triage), fields(actor = %actor.id))]
    pub async fn record_triage(
        &self,
        id: Uuid,
        actor: &Actor,
        triage: TriageData,
    ) -> Result<ConsultationRecord, ConsultationError> {
        let mut record = self.get_consultation(id).await?;

        if actor.role != Role::Nurse {
            return Err(ConsultationError::Forbidden("Only nurses record triage".to_string()));
        }
        match record.status {
            ConsultationStatus::InNursingAttendance => {}
            ConsultationStatus::AwaitingDoctor
            | ConsultationStatus::InMedicalAttendance
            | ConsultationStatus::Finalized => {
                return Err(ConsultationError::PreconditionFailed(
                    "Triage data is immutable after hand-off".to_string(),
                ));
            }
            other => {
                return Err(ConsultationError::PreconditionFailed(format!(
                    "Triage cannot be recorded while consultation is {}",
                    other
                )));
            }
        }
        if record.assigned_nurse_id != Some(actor.id) {
            return Err(ConsultationError::Forbidden(
                "Only the attending nurse can record triage".to_string(),
            ));
        }

        let expected = ExpectedState::of(&record);
        record.triage_data = Some(Self::complete_triage(triage, actor));
        record.touch(Utc::now());

        self.write_if_unchanged(expected, &record).await?;
        Ok(record)
    }

    /// Save clinical notes during medical attendance. No ledger entry.
    #[instrument(skip(self, clinical), fields(actor = %actor.id))]
    pub async fn record_clinical_notes(
        &self,
        id: Uuid,
        actor: &Actor,
        clinical: ClinicalData,
    ) -> Result<ConsultationRecord, ConsultationError> {
        let mut record = self.get_consultation(id).await?;

        if actor.role != Role::Doctor {
            return Err(ConsultationError::Forbidden("Only doctors record clinical notes".to_string()));
        }
        if record.status != ConsultationStatus::InMedicalAttendance {
            return Err(ConsultationError::PreconditionFailed(format!(
                "Clinical notes cannot be recorded while consultation is {}",
                record.status
            )));
        }
        if record.assigned_doctor_id != Some(actor.id) {
            return Err(ConsultationError::Forbidden(
                "Only the attending doctor can record clinical notes".to_string(),
            ));
        }

        let expected = ExpectedState::of(&record);
        record.clinical_data = Some(clinical);
        record.touch(Utc::now());

        self.write_if_unchanged(expected, &record).await?;
        Ok(record)
    }

    async fn write_if_unchanged(
        &self,
        expected: ExpectedState,
        record: &ConsultationRecord,
    ) -> Result<(), ConsultationError> {
        if self.repository.update_if_status(expected, record).await? {
            Ok(())
        } else {
            Err(ConsultationError::PreconditionFailed(format!(
                "Consultation {} changed while it was being edited",
                record.id
            )))
        }
    }

    /// A status change by someone else makes the edge invalid; a concurrent
    /// edit in the same status only invalidates what this caller read.
    async fn conflict_after_lost_race(
        &self,
        id: Uuid,
        from: ConsultationStatus,
        target: ConsultationStatus,
    ) -> ConsultationError {
        match self.repository.get(id).await {
            Ok(Some(stored)) if stored.status == from => ConsultationError::PreconditionFailed(format!(
                "Consultation {} was modified concurrently, reload and retry",
                id
            )),
            Ok(_) => ConsultationError::InvalidTransition { from, to: target },
            Err(e) => e,
        }
    }

    async fn apply_effect(
        &self,
        effect: TransitionEffect,
        record: &mut ConsultationRecord,
        actor: &Actor,
        payload: TransitionPayload,
    ) -> Result<EffectOutcome, ConsultationError> {
        let mut outcome = EffectOutcome::default();

        match effect {
            TransitionEffect::None => {}

            TransitionEffect::QueueForNurse => {
                match self.find_candidate(ProfessionalRole::Nurse, None).await {
                    Some(nurse) => {
                        record.assigned_nurse_id = Some(nurse.id);
                        outcome.assigned_to = Some(nurse.id);
                    }
                    None => debug!("No nurse free, consultation {} queued for pickup", record.id),
                }
            }

            TransitionEffect::ClaimForNurse => {
                record.assigned_nurse_id = Some(actor.id);
                outcome.assigned_to = Some(actor.id);
                self.provision_meeting(record).await;
            }

            TransitionEffect::HandOffToDoctor => {
                let triage = payload
                    .triage_data
                    .or_else(|| record.triage_data.clone())
                    .filter(|triage| !triage.symptoms.trim().is_empty())
                    .ok_or_else(|| {
                        ConsultationError::PreconditionFailed(
                            "Triage data with symptoms is required for hand-off".to_string(),
                        )
                    })?;
                record.triage_data = Some(Self::complete_triage(triage, actor));

                let specialty = payload
                    .specialty
                    .as_deref()
                    .map(str::trim)
                    .filter(|s| !s.is_empty());

                match (self.find_candidate(ProfessionalRole::Doctor, specialty).await, specialty) {
                    (Some(doctor), _) => {
                        record.assigned_doctor_id = Some(doctor.id);
                        outcome.assigned_to = Some(doctor.id);
                    }
                    (None, Some(specialty)) => {
                        return Err(ConsultationError::PreconditionFailed(format!(
                            "No {} doctor available for hand-off",
                            specialty
                        )));
                    }
                    (None, None) => {
                        debug!("No doctor free, consultation {} queued for pickup", record.id)
                    }
                }
            }

            TransitionEffect::ClaimForDoctor => {
                record.assigned_doctor_id = Some(actor.id);
                outcome.assigned_to = Some(actor.id);
                self.provision_meeting(record).await;
            }

            TransitionEffect::Finalize => {
                let clinical = payload
                    .clinical_data
                    .or_else(|| record.clinical_data.clone())
                    .filter(ClinicalData::has_summary)
                    .ok_or_else(|| {
                        ConsultationError::PreconditionFailed(
                            "A clinical summary is required to finalize".to_string(),
                        )
                    })?;
                record.clinical_data = Some(clinical);
            }

            TransitionEffect::Cancel => {
                let reason = payload
                    .reason
                    .map(|r| r.trim().to_string())
                    .filter(|r| !r.is_empty());
                record.cancellation_reason = reason.clone();
                outcome.note = reason;
            }
        }

        Ok(outcome)
    }

    /// Top-ranked candidate, or `None` when the resolver is empty, failing or slow.
    async fn find_candidate(&self, role: ProfessionalRole, specialty: Option<&str>) -> Option<Professional> {
        match timeout(self.config.upstream_timeout, self.availability.find_candidates(role, specialty)).await {
            Ok(Ok(candidates)) => candidates.into_iter().next(),
            Ok(Err(e)) => {
                warn!("Availability lookup for {} failed: {}", role, e);
                None
            }
            Err(_) => {
                warn!("Availability lookup for {} timed out", role);
                None
            }
        }
    }

    /// Attach meeting links, or flag the record when provisioning fails.
    async fn provision_meeting(&self, record: &mut ConsultationRecord) {
        match timeout(self.config.upstream_timeout, self.meetings.provision(record.id)).await {
            Ok(Ok(links)) => {
                record.meeting = Some(links);
                record.meeting_provisioning_failed = false;
            }
            Ok(Err(e)) => {
                warn!("Meeting provisioning for {} failed: {}", record.id, e);
                record.meeting_provisioning_failed = true;
            }
            Err(_) => {
                warn!("Meeting provisioning for {} timed out", record.id);
                record.meeting_provisioning_failed = true;
            }
        }
    }

    /// A repeated claim from a professional who is not the one holding it.
    fn claimed_by_another(record: &ConsultationRecord, actor: &Actor) -> bool {
        match record.status {
            ConsultationStatus::InNursingAttendance => {
                actor.role == Role::Nurse && record.assigned_nurse_id != Some(actor.id)
            }
            ConsultationStatus::InMedicalAttendance => {
                actor.role == Role::Doctor && record.assigned_doctor_id != Some(actor.id)
            }
            _ => false,
        }
    }

    fn complete_triage(mut triage: TriageData, actor: &Actor) -> TriageData {
        triage.automatic_classification = Some(classify_urgency(&triage));
        triage.recorded_by = Some(actor.id);
        triage
    }
}
