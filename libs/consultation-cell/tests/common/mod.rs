#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use uuid::Uuid;

use consultation_cell::*;
use professional_cell::{
    AvailabilityResolver, InMemoryAvailabilityResolver, Professional, ProfessionalError, ProfessionalRole,
};
use shared_models::auth::{Actor, Role};
use video_conferencing_cell::{MeetingLinks, MeetingProvisioner, VideoConferencingError};

pub const TEST_TIMEOUT: Duration = Duration::from_millis(50);

#[derive(Clone, Copy)]
pub enum Meetings {
    Working,
    Failing,
    Hanging,
}

pub struct StubProvisioner {
    pub mode: Meetings,
}

#[async_trait]
impl MeetingProvisioner for StubProvisioner {
    async fn provision(&self, consultation_id: Uuid) -> Result<MeetingLinks, VideoConferencingError> {
        match self.mode {
            Meetings::Working => Ok(MeetingLinks::for_session(
                "https://video.test/join",
                consultation_id,
                "session-1",
            )),
            Meetings::Failing => Err(VideoConferencingError::CloudflareApiError {
                message: "HTTP 500".to_string(),
            }),
            Meetings::Hanging => {
                tokio::time::sleep(Duration::from_secs(30)).await;
                Err(VideoConferencingError::Internal { message: "unreachable".to_string() })
            }
        }
    }
}

pub struct UnavailableDirectory;

#[async_trait]
impl AvailabilityResolver for UnavailableDirectory {
    async fn find_candidates(
        &self,
        _role: ProfessionalRole,
        _specialty: Option<&str>,
    ) -> Result<Vec<Professional>, ProfessionalError> {
        Err(ProfessionalError::DirectoryUnavailable("connection refused".to_string()))
    }
}

/// Directory that answers with nobody after `delay`.
pub struct SlowDirectory {
    pub delay: Duration,
}

#[async_trait]
impl AvailabilityResolver for SlowDirectory {
    async fn find_candidates(
        &self,
        _role: ProfessionalRole,
        _specialty: Option<&str>,
    ) -> Result<Vec<Professional>, ProfessionalError> {
        tokio::time::sleep(self.delay).await;
        Ok(Vec::new())
    }
}

pub struct Harness {
    pub engine: Arc<RoutingEngine>,
    pub repository: Arc<InMemoryConsultationRepository>,
    pub cast: Cast,
}

impl Harness {
    pub fn new() -> Self {
        Self::with(Arc::new(InMemoryAvailabilityResolver::new()), Meetings::Working)
    }

    pub fn with(availability: Arc<dyn AvailabilityResolver>, meetings: Meetings) -> Self {
        let repository = Arc::new(InMemoryConsultationRepository::new());
        let engine = RoutingEngine::new(
            repository.clone(),
            availability,
            Arc::new(StubProvisioner { mode: meetings }),
            RoutingConfig { upstream_timeout: TEST_TIMEOUT },
        );

        Self {
            engine: Arc::new(engine),
            repository,
            cast: Cast::new(),
        }
    }

    pub async fn urgent_request(&self) -> ConsultationRecord {
        self.engine
            .create_consultation(&self.cast.patient, self.cast.patient.id, ConsultationKind::Urgent, None)
            .await
            .unwrap()
    }

    /// Walk the happy path until the record reaches `target`.
    pub async fn advance_to(&self, id: Uuid, target: ConsultationStatus) -> ConsultationRecord {
        let mut record = self.engine.get_consultation(id).await.unwrap();
        while record.status != target {
            let next = next_on_path(record.status).expect("target lies on the happy path");
            record = self
                .engine
                .attempt_transition(id, next, &self.cast.actor_for(next), payload_for(next))
                .await
                .unwrap();
        }
        record
    }

    pub async fn history_len(&self, id: Uuid) -> usize {
        self.engine.get_history(id).await.unwrap().len()
    }
}

pub struct Cast {
    pub patient: Actor,
    pub attendant: Actor,
    pub nurse: Actor,
    pub doctor: Actor,
    pub admin: Actor,
}

impl Cast {
    pub fn new() -> Self {
        Self {
            patient: Actor::new(Uuid::new_v4(), Role::Patient),
            attendant: Actor::new(Uuid::new_v4(), Role::Attendant),
            nurse: Actor::new(Uuid::new_v4(), Role::Nurse),
            doctor: Actor::new(Uuid::new_v4(), Role::Doctor),
            admin: Actor::new(Uuid::new_v4(), Role::Admin),
        }
    }

    pub fn actor_for(&self, target: ConsultationStatus) -> Actor {
        match target {
            ConsultationStatus::Triage | ConsultationStatus::AwaitingNurse => self.attendant,
            ConsultationStatus::InNursingAttendance | ConsultationStatus::AwaitingDoctor => self.nurse,
            ConsultationStatus::InMedicalAttendance | ConsultationStatus::Finalized => self.doctor,
            ConsultationStatus::Cancelled | ConsultationStatus::Requested => self.admin,
        }
    }
}

pub const HAPPY_PATH: [ConsultationStatus; 7] = [
    ConsultationStatus::Requested,
    ConsultationStatus::Triage,
    ConsultationStatus::AwaitingNurse,
    ConsultationStatus::InNursingAttendance,
    ConsultationStatus::AwaitingDoctor,
    ConsultationStatus::InMedicalAttendance,
    ConsultationStatus::Finalized,
];

pub fn next_on_path(status: ConsultationStatus) -> Option<ConsultationStatus> {
    let position = HAPPY_PATH.iter().position(|s| *s == status)?;
    HAPPY_PATH.get(position + 1).copied()
}

pub fn triage_data() -> TriageData {
    TriageData {
        symptoms: "fever and sore throat".to_string(),
        vitals: Vitals {
            temperature_celsius: Some(38.6),
            ..Vitals::default()
        },
        ..TriageData::default()
    }
}

pub fn clinical_data() -> ClinicalData {
    ClinicalData {
        summary: "Viral pharyngitis, symptomatic treatment".to_string(),
        prescription: Some("Paracetamol 750mg".to_string()),
        ..ClinicalData::default()
    }
}

pub fn payload_for(target: ConsultationStatus) -> TransitionPayload {
    match target {
        ConsultationStatus::AwaitingDoctor => TransitionPayload {
            triage_data: Some(triage_data()),
            ..TransitionPayload::default()
        },
        ConsultationStatus::Finalized => TransitionPayload {
            clinical_data: Some(clinical_data()),
            ..TransitionPayload::default()
        },
        _ => TransitionPayload::default(),
    }
}

pub fn online(role: ProfessionalRole, load: u32) -> Professional {
    Professional::new(Uuid::new_v4(), "Staff Member", role).with_load(load, 20.0)
}
