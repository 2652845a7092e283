// libs/video-conferencing-cell/src/handlers.rs
use std::sync::Arc;

use axum::{extract::State, Json};

use shared_config::AppConfig;

use crate::models::{VideoHealth, VideoStatus};
use crate::services::CloudflareRealtimeClient;

#[axum::debug_handler]
pub async fn video_health_check(State(config): State<Arc<AppConfig>>) -> Json<VideoHealth> {
    let client = match CloudflareRealtimeClient::new(&config) {
        Ok(client) => client,
        Err(e) => {
            return Json(VideoHealth {
                status: VideoStatus::NotConfigured,
                video_configured: false,
                detail: Some(format!("{}; claims are flagged for manual follow-up", e)),
            })
        }
    };

    let (status, detail) = match client.probe().await {
        Ok(true) => (VideoStatus::Healthy, None),
        Ok(false) => (VideoStatus::Unhealthy, Some("Cloudflare rejected the probe".to_string())),
        Err(e) => (VideoStatus::Unhealthy, Some(e.to_string())),
    };

    Json(VideoHealth {
        status,
        video_configured: true,
        detail,
    })
}
