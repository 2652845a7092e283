// libs/video-conferencing-cell/src/models.rs
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Links to a provisioned live session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeetingLinks {
    pub meeting_id: String,
    pub join_url: String,
    pub host_url: String,
}

impl MeetingLinks {
    /// Both links open the same session; `role` tells the front-end which
    /// side of the call to render.
    pub fn for_session(join_base_url: &str, consultation_id: Uuid, session_id: &str) -> Self {
        let room = format!("{}/{}?session={}", join_base_url.trim_end_matches('/'), consultation_id, session_id);
        Self {
            meeting_id: session_id.to_string(),
            join_url: format!("{}&role=participant", room),
            host_url: format!("{}&role=host", room),
        }
    }
}

/// Body of `POST /apps/{appId}/sessions/new`. Cloudflare reports some
/// failures inside a 2xx response through `errorCode`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSessionResponse {
    #[serde(default)]
    pub session_id: String,
    pub error_code: Option<String>,
    pub error_description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VideoStatus {
    Healthy,
    Unhealthy,
    NotConfigured,
}

#[derive(Debug, Clone, Serialize)]
pub struct VideoHealth {
    pub status: VideoStatus,
    pub video_configured: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

#[derive(Error, Debug)]
pub enum VideoConferencingError {
    #[error("Cloudflare API error: {message}")]
    CloudflareApiError { message: String },

    #[error("Video conferencing not configured")]
    NotConfigured,

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl From<reqwest::Error> for VideoConferencingError {
    fn from(err: reqwest::Error) -> Self {
        VideoConferencingError::CloudflareApiError {
            message: err.to_string(),
        }
    }
}
