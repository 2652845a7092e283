// libs/video-conferencing-cell/src/services/provisioner.rs
use async_trait::async_trait;
use tracing::{info, instrument};
use uuid::Uuid;

use shared_config::AppConfig;

use crate::models::{MeetingLinks, VideoConferencingError};
use crate::services::cloudflare::CloudflareRealtimeClient;

/// Obtains a live session for a consultation.
///
/// Callers bound each call with their own timeout; implementations do not
/// retry.
#[async_trait]
pub trait MeetingProvisioner: Send + Sync {
    async fn provision(&self, consultation_id: Uuid) -> Result<MeetingLinks, VideoConferencingError>;
}

pub struct CloudflareMeetingProvisioner {
    client: CloudflareRealtimeClient,
    join_base_url: String,
}

impl CloudflareMeetingProvisioner {
    pub fn new(config: &AppConfig) -> Result<Self, VideoConferencingError> {
        Ok(Self {
            client: CloudflareRealtimeClient::new(config)?,
            join_base_url: config.video_join_base_url.clone(),
        })
    }
}

#[async_trait]
impl MeetingProvisioner for CloudflareMeetingProvisioner {
    #[instrument(skip(self))]
    async fn provision(&self, consultation_id: Uuid) -> Result<MeetingLinks, VideoConferencingError> {
        let session_id = self.client.open_session().await?;
        let links = MeetingLinks::for_session(&self.join_base_url, consultation_id, &session_id);

        info!("Provisioned meeting {} for consultation {}", links.meeting_id, consultation_id);
        Ok(links)
    }
}

/// Stand-in used when no video provider is configured.
pub struct DisabledMeetingProvisioner;

#[async_trait]
impl MeetingProvisioner for DisabledMeetingProvisioner {
    async fn provision(&self, _consultation_id: Uuid) -> Result<MeetingLinks, VideoConferencingError> {
        Err(VideoConferencingError::NotConfigured)
    }
}
