// libs/professional-cell/src/services/availability.rs
use std::cmp::Ordering;
use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use crate::models::{AvailabilityStatus, Professional, ProfessionalError, ProfessionalRole};

/// Picks professionals who can take a consultation right now.
///
/// Implementations return candidates ordered best-first. An empty list is a
/// normal answer meaning nobody is free; errors are reserved for the directory
/// itself being unreachable.
#[async_trait]
pub trait AvailabilityResolver: Send + Sync {
    async fn find_candidates(
        &self,
        role: ProfessionalRole,
        specialty: Option<&str>,
    ) -> Result<Vec<Professional>, ProfessionalError>;
}

/// Filter a pool down to assignable professionals of `role` and order them by
/// current load, then by average attendance duration.
pub fn rank_candidates(
    pool: Vec<Professional>,
    role: ProfessionalRole,
    specialty: Option<&str>,
) -> Vec<Professional> {
    let mut candidates: Vec<Professional> = pool
        .into_iter()
        .filter(|p| p.role == role && p.is_assignable() && p.matches_specialty(specialty))
        .collect();

    candidates.sort_by(|a, b| {
        a.active_consultations
            .cmp(&b.active_consultations)
            .then_with(|| {
                a.avg_attendance_minutes
                    .partial_cmp(&b.avg_attendance_minutes)
                    .unwrap_or(Ordering::Equal)
            })
            .then_with(|| a.id.cmp(&b.id))
    });

    debug!("Ranked {} {} candidates (specialty: {:?})", candidates.len(), role, specialty);
    candidates
}

/// Directory held in process memory. Used in development mode and tests.
#[derive(Default)]
pub struct InMemoryAvailabilityResolver {
    professionals: RwLock<HashMap<Uuid, Professional>>,
}

impl InMemoryAvailabilityResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_professionals(professionals: Vec<Professional>) -> Self {
        Self {
            professionals: RwLock::new(professionals.into_iter().map(|p| (p.id, p)).collect()),
        }
    }

    pub async fn upsert(&self, professional: Professional) {
        self.professionals.write().await.insert(professional.id, professional);
    }

    pub async fn set_availability(&self, id: Uuid, availability: AvailabilityStatus) -> bool {
        match self.professionals.write().await.get_mut(&id) {
            Some(p) => {
                p.availability = availability;
                true
            }
            None => false,
        }
    }
}

#[async_trait]
impl AvailabilityResolver for InMemoryAvailabilityResolver {
    async fn find_candidates(
        &self,
        role: ProfessionalRole,
        specialty: Option<&str>,
    ) -> Result<Vec<Professional>, ProfessionalError> {
        let pool = self.professionals.read().await.values().cloned().collect();
        Ok(rank_candidates(pool, role, specialty))
    }
}
