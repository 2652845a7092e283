// libs/professional-cell/src/services/directory.rs
use async_trait::async_trait;
use tracing::{debug, error};

use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;

use crate::models::{Professional, ProfessionalError, ProfessionalRole};
use crate::services::availability::{rank_candidates, AvailabilityResolver};

/// Reads the `professionals` view, which exposes each staff member together
/// with their current workload.
pub struct SupabaseAvailabilityResolver {
    supabase: SupabaseClient,
}

impl SupabaseAvailabilityResolver {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
        }
    }

    fn build_query(role: ProfessionalRole) -> String {
        format!(
            "role=eq.{}&is_active=eq.true&availability=eq.online&order=active_consultations.asc",
            role.as_str()
        )
    }
}

#[async_trait]
impl AvailabilityResolver for SupabaseAvailabilityResolver {
    async fn find_candidates(
        &self,
        role: ProfessionalRole,
        specialty: Option<&str>,
    ) -> Result<Vec<Professional>, ProfessionalError> {
        let query = Self::build_query(role);
        debug!("Querying professional directory: {}", query);

        let pool: Vec<Professional> = self
            .supabase
            .select("professionals", &query)
            .await
            .map_err(|e| {
                error!("Professional directory query failed: {}", e);
                ProfessionalError::DirectoryUnavailable(e.to_string())
            })?;

        // Capacity and specialty are re-checked locally so the ranking rules
        // live in one place.
        Ok(rank_candidates(pool, role, specialty))
    }
}
