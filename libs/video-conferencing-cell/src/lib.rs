// libs/video-conferencing-cell/src/lib.rs
//! # Video Conferencing Cell
//!
//! Provisions live video rooms for consultations using Cloudflare's Realtime
//! API. The consultation workflow calls a [`MeetingProvisioner`] whenever a
//! nurse or doctor claims a consultation; the provisioner returns the pair of
//! URLs used by the patient and by the attending professional.
//!
//! ## Architecture
//!
//! ```text
//! +-----------------------------------------------------+
//! |                   Video Cell                        |
//! +-----------------------------------------------------+
//! |  handlers.rs    |  Health endpoint                  |
//! |  router.rs      |  Route definitions                |
//! |  models.rs      |  Meeting links, API DTOs, errors  |
//! |  services/      |                                   |
//! |    cloudflare.rs|  Cloudflare Realtime API client   |
//! |    provisioner.rs| MeetingProvisioner trait + impls |
//! +-----------------------------------------------------+
//! ```
//!
//! ## Configuration
//!
//! - `CLOUDFLARE_REALTIME_APP_ID` - Cloudflare app identifier
//! - `CLOUDFLARE_REALTIME_API_TOKEN` - API authentication token
//! - `CLOUDFLARE_REALTIME_BASE_URL` - API base URL (optional, defaults to production)
//! - `VIDEO_JOIN_BASE_URL` - front-end page that hosts the call
//!
//! When Cloudflare is not configured, [`DisabledMeetingProvisioner`] is used and
//! every provisioning attempt fails with [`VideoConferencingError::NotConfigured`].

pub mod handlers;
pub mod models;
pub mod router;
pub mod services;

pub use models::{MeetingLinks, VideoConferencingError, VideoHealth, VideoStatus};

pub use services::{
    CloudflareMeetingProvisioner,
    CloudflareRealtimeClient,
    DisabledMeetingProvisioner,
    MeetingProvisioner,
};

pub use router::video_conferencing_routes;
