// libs/consultation-cell/src/models.rs
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use shared_models::auth::{Actor, Role};
use video_conferencing_cell::MeetingLinks;

// ==============================================================================
// LIFECYCLE ENUMS
// ==============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConsultationStatus {
    Requested,
    Triage,
    AwaitingNurse,
    InNursingAttendance,
    AwaitingDoctor,
    InMedicalAttendance,
    Finalized,
    Cancelled,
}

impl ConsultationStatus {
    pub const ALL: [ConsultationStatus; 8] = [
        ConsultationStatus::Requested,
        ConsultationStatus::Triage,
        ConsultationStatus::AwaitingNurse,
        ConsultationStatus::InNursingAttendance,
        ConsultationStatus::AwaitingDoctor,
        ConsultationStatus::InMedicalAttendance,
        ConsultationStatus::Finalized,
        ConsultationStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ConsultationStatus::Requested => "requested",
            ConsultationStatus::Triage => "triage",
            ConsultationStatus::AwaitingNurse => "awaiting_nurse",
            ConsultationStatus::InNursingAttendance => "in_nursing_attendance",
            ConsultationStatus::AwaitingDoctor => "awaiting_doctor",
            ConsultationStatus::InMedicalAttendance => "in_medical_attendance",
            ConsultationStatus::Finalized => "finalized",
            ConsultationStatus::Cancelled => "cancelled",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, ConsultationStatus::Finalized | ConsultationStatus::Cancelled)
    }

    /// States in which the patient is waiting for someone to act.
    pub fn is_waiting(&self) -> bool {
        matches!(
            self,
            ConsultationStatus::Requested
                | ConsultationStatus::Triage
                | ConsultationStatus::AwaitingNurse
                | ConsultationStatus::AwaitingDoctor
        )
    }
}

impl fmt::Display for ConsultationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConsultationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ConsultationStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| format!("Unknown consultation status: {}", s))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConsultationKind {
    Urgent,
    Scheduled,
}

/// Manchester-style colour bands, each bounding the acceptable wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UrgencyClassification {
    Green,
    Yellow,
    Orange,
    Red,
}

impl UrgencyClassification {
    pub fn max_wait_minutes(&self) -> i64 {
        match self {
            UrgencyClassification::Green => 240,
            UrgencyClassification::Yellow => 120,
            UrgencyClassification::Orange => 60,
            UrgencyClassification::Red => 0,
        }
    }

    /// Band assumed for consultations nobody has classified yet.
    pub fn default_for(kind: ConsultationKind) -> Self {
        match kind {
            ConsultationKind::Urgent => UrgencyClassification::Yellow,
            ConsultationKind::Scheduled => UrgencyClassification::Green,
        }
    }
}

// ==============================================================================
// PAYLOADS
// ==============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Vitals {
    pub temperature_celsius: Option<f64>,
    pub blood_pressure: Option<String>,
    pub heart_rate: Option<u32>,
    pub oxygen_saturation: Option<u32>,
    pub pain_scale: Option<u8>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TriageData {
    pub symptoms: String,
    #[serde(default)]
    pub vitals: Vitals,
    pub medical_history: Option<String>,
    pub medications: Option<String>,
    pub allergies: Option<String>,
    /// Classification chosen by the nurse; overrides the automatic one.
    pub classification: Option<UrgencyClassification>,
    pub automatic_classification: Option<UrgencyClassification>,
    pub recorded_by: Option<Uuid>,
}

impl TriageData {
    pub fn effective_classification(&self) -> Option<UrgencyClassification> {
        self.classification.or(self.automatic_classification)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClinicalData {
    #[serde(default)]
    pub summary: String,
    pub anamnesis: Option<String>,
    pub prescription: Option<String>,
    pub certificate: Option<String>,
}

impl ClinicalData {
    pub fn has_summary(&self) -> bool {
        !self.summary.trim().is_empty()
    }
}

// ==============================================================================
// AGGREGATE
// ==============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsultationRecord {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub kind: ConsultationKind,
    pub status: ConsultationStatus,
    pub assigned_nurse_id: Option<Uuid>,
    pub assigned_doctor_id: Option<Uuid>,
    pub triage_data: Option<TriageData>,
    pub clinical_data: Option<ClinicalData>,
    pub meeting: Option<MeetingLinks>,
    #[serde(default)]
    pub meeting_provisioning_failed: bool,
    pub cancellation_reason: Option<String>,
    /// Bumped on every write; conditional updates compare it.
    #[serde(default)]
    pub version: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ConsultationRecord {
    pub fn new(patient_id: Uuid, kind: ConsultationKind) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            patient_id,
            kind,
            status: ConsultationStatus::Requested,
            assigned_nurse_id: None,
            assigned_doctor_id: None,
            triage_data: None,
            clinical_data: None,
            meeting: None,
            meeting_provisioning_failed: false,
            cancellation_reason: None,
            version: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Mark a new revision of the record.
    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.version += 1;
        self.updated_at = now;
    }

    /// Whether the assignment fields and payloads agree with `status`.
    pub fn is_consistent(&self) -> bool {
        match self.status {
            ConsultationStatus::InNursingAttendance => self.assigned_nurse_id.is_some(),
            ConsultationStatus::AwaitingDoctor => {
                self.assigned_nurse_id.is_some() && self.triage_data.is_some()
            }
            ConsultationStatus::InMedicalAttendance => self.assigned_doctor_id.is_some(),
            ConsultationStatus::Finalized => {
                self.assigned_doctor_id.is_some()
                    && self.clinical_data.as_ref().map(ClinicalData::has_summary).unwrap_or(false)
            }
            _ => true,
        }
    }

    pub fn involves(&self, professional_id: Uuid) -> bool {
        self.assigned_nurse_id == Some(professional_id)
            || self.assigned_doctor_id == Some(professional_id)
    }

    pub fn classification(&self) -> UrgencyClassification {
        self.triage_data
            .as_ref()
            .and_then(TriageData::effective_classification)
            .unwrap_or_else(|| UrgencyClassification::default_for(self.kind))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusHistoryEntry {
    pub id: Uuid,
    pub consultation_id: Uuid,
    pub from_status: ConsultationStatus,
    pub to_status: ConsultationStatus,
    pub actor_role: Role,
    pub actor_id: Uuid,
    /// Professional assigned by this transition, if any.
    pub assigned_to: Option<Uuid>,
    pub note: Option<String>,
    pub recorded_at: DateTime<Utc>,
}

impl StatusHistoryEntry {
    pub fn new(
        consultation_id: Uuid,
        from_status: ConsultationStatus,
        to_status: ConsultationStatus,
        actor: &Actor,
        recorded_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            consultation_id,
            from_status,
            to_status,
            actor_role: actor.role,
            actor_id: actor.id,
            assigned_to: None,
            note: None,
            recorded_at,
        }
    }
}

// ==============================================================================
// REQUEST TYPES
// ==============================================================================

/// Optional data supplied alongside a transition.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TransitionPayload {
    pub triage_data: Option<TriageData>,
    pub clinical_data: Option<ClinicalData>,
    /// Restricts doctor selection during hand-off.
    pub specialty: Option<String>,
    /// Cancellation reason.
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TransitionRequest {
    pub target_status: ConsultationStatus,
    #[serde(default)]
    pub payload: TransitionPayload,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateConsultationRequest {
    /// Defaults to the caller when the caller is a patient.
    pub patient_id: Option<Uuid>,
    pub kind: ConsultationKind,
    pub initial_triage: Option<TriageData>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConsultationFilter {
    pub status: Option<ConsultationStatus>,
    pub assigned_to: Option<Uuid>,
    pub patient_id: Option<Uuid>,
    /// Skip finalized and cancelled records.
    #[serde(default)]
    pub open_only: bool,
}

impl ConsultationFilter {
    pub fn open() -> Self {
        Self {
            open_only: true,
            ..Self::default()
        }
    }

    pub fn matches(&self, record: &ConsultationRecord) -> bool {
        !(self.open_only && record.status.is_terminal())
            && self.status.map_or(true, |s| record.status == s)
            && self.patient_id.map_or(true, |p| record.patient_id == p)
            && self.assigned_to.map_or(true, |a| record.involves(a))
    }
}
