// libs/video-conferencing-cell/src/services/cloudflare.rs
use std::time::Duration;

use reqwest::Client;
use tracing::{debug, error, info, warn};

use shared_config::AppConfig;

use crate::models::{NewSessionResponse, VideoConferencingError};

/// Client for the Cloudflare Realtime sessions API.
/// Based on: https://developers.cloudflare.com/realtime/
pub struct CloudflareRealtimeClient {
    client: Client,
    app_id: String,
    api_token: String,
    base_url: String,
}

impl CloudflareRealtimeClient {
    pub fn new(config: &AppConfig) -> Result<Self, VideoConferencingError> {
        if !config.is_video_conferencing_configured() {
            return Err(VideoConferencingError::NotConfigured);
        }

        let client = Client::builder()
            .timeout(Duration::from_millis(config.upstream_timeout_ms))
            .build()
            .map_err(|e| VideoConferencingError::Internal { message: e.to_string() })?;

        Ok(Self {
            client,
            app_id: config.cloudflare_realtime_app_id.clone(),
            api_token: config.cloudflare_realtime_api_token.clone(),
            base_url: config.cloudflare_realtime_base_url.trim_end_matches('/').to_string(),
        })
    }

    fn app_url(&self) -> String {
        format!("{}/apps/{}", self.base_url, self.app_id)
    }

    /// Open an empty session; tracks are negotiated by the participants when
    /// they join.
    pub async fn open_session(&self) -> Result<String, VideoConferencingError> {
        let url = format!("{}/sessions/new", self.app_url());
        debug!("Opening Cloudflare session: {}", url);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_token)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            error!("Cloudflare session creation failed: {} - {}", status, body);
            return Err(VideoConferencingError::CloudflareApiError {
                message: format!("HTTP {}: {}", status, body),
            });
        }

        let session: NewSessionResponse = serde_json::from_str(&body).map_err(|e| {
            VideoConferencingError::CloudflareApiError {
                message: format!("Unreadable session response: {}", e),
            }
        })?;

        if let Some(code) = session.error_code {
            let description = session.error_description.unwrap_or_default();
            error!("Cloudflare rejected session: {} - {}", code, description);
            return Err(VideoConferencingError::CloudflareApiError {
                message: format!("{}: {}", code, description),
            });
        }
        if session.session_id.is_empty() {
            return Err(VideoConferencingError::CloudflareApiError {
                message: "Session response without sessionId".to_string(),
            });
        }

        info!("Opened Cloudflare session {}", session.session_id);
        Ok(session.session_id)
    }

    /// Whether the API accepts our credentials. The app endpoint answers 404
    /// for a valid token, so only auth and server errors count as down.
    pub async fn probe(&self) -> Result<bool, VideoConferencingError> {
        let response = self
            .client
            .get(self.app_url())
            .bearer_auth(&self.api_token)
            .send()
            .await?;

        let status = response.status();
        let reachable = status.is_success() || status == reqwest::StatusCode::NOT_FOUND;
        if !reachable {
            warn!("Cloudflare Realtime probe failed: {}", status);
        }
        Ok(reachable)
    }
}
