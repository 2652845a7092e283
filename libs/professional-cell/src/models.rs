use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Professional roles that can be routed consultations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProfessionalRole {
    Nurse,
    Doctor,
}

impl ProfessionalRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProfessionalRole::Nurse => "nurse",
            ProfessionalRole::Doctor => "doctor",
        }
    }
}

impl fmt::Display for ProfessionalRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProfessionalRole {
    type Err = ProfessionalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "nurse" => Ok(ProfessionalRole::Nurse),
            "doctor" => Ok(ProfessionalRole::Doctor),
            other => Err(ProfessionalError::InvalidRole(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AvailabilityStatus {
    Online,
    Busy,
    Offline,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Professional {
    pub id: Uuid,
    pub full_name: String,
    pub role: ProfessionalRole,
    pub specialty: Option<String>,
    pub availability: AvailabilityStatus,
    pub is_active: bool,
    pub active_consultations: u32,
    pub patient_limit: u32,
    pub avg_attendance_minutes: f64,
}

impl Professional {
    pub const DEFAULT_PATIENT_LIMIT: u32 = 3;

    pub fn new(id: Uuid, full_name: &str, role: ProfessionalRole) -> Self {
        Self {
            id,
            full_name: full_name.to_string(),
            role,
            specialty: None,
            availability: AvailabilityStatus::Online,
            is_active: true,
            active_consultations: 0,
            patient_limit: Self::DEFAULT_PATIENT_LIMIT,
            avg_attendance_minutes: 0.0,
        }
    }

    pub fn with_specialty(mut self, specialty: &str) -> Self {
        self.specialty = Some(specialty.to_string());
        self
    }

    pub fn with_load(mut self, active_consultations: u32, avg_attendance_minutes: f64) -> Self {
        self.active_consultations = active_consultations;
        self.avg_attendance_minutes = avg_attendance_minutes;
        self
    }

    /// Active, online and below the concurrent patient limit.
    pub fn is_assignable(&self) -> bool {
        self.is_active
            && self.availability == AvailabilityStatus::Online
            && self.active_consultations < self.patient_limit
    }

    /// Whole-name comparison, ignoring case and surrounding whitespace.
    pub fn matches_specialty(&self, specialty: Option<&str>) -> bool {
        match specialty {
            None => true,
            Some(wanted) => self
                .specialty
                .as_deref()
                .map(|s| s.trim().to_lowercase() == wanted.trim().to_lowercase())
                .unwrap_or(false),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CandidateQuery {
    pub role: ProfessionalRole,
    pub specialty: Option<String>,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProfessionalError {
    #[error("Unknown professional role: {0}")]
    InvalidRole(String),

    #[error("Professional directory unavailable: {0}")]
    DirectoryUnavailable(String),
}
