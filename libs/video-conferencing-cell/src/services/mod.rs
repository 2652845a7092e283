// libs/video-conferencing-cell/src/services/mod.rs

pub mod cloudflare;
pub mod provisioner;

pub use cloudflare::CloudflareRealtimeClient;
pub use provisioner::{CloudflareMeetingProvisioner, DisabledMeetingProvisioner, MeetingProvisioner};
