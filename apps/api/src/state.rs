use std::sync::Arc;

use tracing::{info, warn};

use consultation_cell::{
    ConsultationRepository, InMemoryConsultationRepository, RoutingConfig, RoutingEngine,
    SupabaseConsultationRepository,
};
use escalation_cell::{EscalationConfig, EscalationWorker};
use professional_cell::{AvailabilityResolver, InMemoryAvailabilityResolver, SupabaseAvailabilityResolver};
use shared_config::AppConfig;
use video_conferencing_cell::{CloudflareMeetingProvisioner, DisabledMeetingProvisioner, MeetingProvisioner};

/// Long-lived services shared by the HTTP cells.
pub struct AppServices {
    pub config: Arc<AppConfig>,
    pub engine: Arc<RoutingEngine>,
    pub resolver: Arc<dyn AvailabilityResolver>,
    pub escalation: Arc<EscalationWorker>,
}

impl AppServices {
    pub fn build(config: AppConfig) -> Self {
        let (repository, resolver): (Arc<dyn ConsultationRepository>, Arc<dyn AvailabilityResolver>) =
            if config.is_configured() {
                info!("Using Supabase persistence at {}", config.supabase_url);
                (
                    Arc::new(SupabaseConsultationRepository::new(&config)),
                    Arc::new(SupabaseAvailabilityResolver::new(&config)),
                )
            } else {
                warn!("Supabase not configured, consultations are kept in memory");
                (
                    Arc::new(InMemoryConsultationRepository::new()),
                    Arc::new(InMemoryAvailabilityResolver::new()),
                )
            };

        let meetings: Arc<dyn MeetingProvisioner> = match CloudflareMeetingProvisioner::new(&config) {
            Ok(provisioner) => Arc::new(provisioner),
            Err(e) => {
                warn!("Video conferencing disabled: {}", e);
                Arc::new(DisabledMeetingProvisioner)
            }
        };

        let engine = Arc::new(RoutingEngine::new(
            Arc::clone(&repository),
            Arc::clone(&resolver),
            meetings,
            RoutingConfig::from_app_config(&config),
        ));

        let escalation = Arc::new(EscalationWorker::new(
            EscalationConfig::from_app_config(&config),
            repository,
        ));

        Self {
            config: Arc::new(config),
            engine,
            resolver,
            escalation,
        }
    }
}
