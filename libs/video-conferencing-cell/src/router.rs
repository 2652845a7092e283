// libs/video-conferencing-cell/src/router.rs
use std::sync::Arc;

use axum::{routing::get, Router};

use shared_config::AppConfig;

use crate::handlers;

pub fn video_conferencing_routes(state: Arc<AppConfig>) -> Router {
    Router::new()
        .route("/health", get(handlers::video_health_check))
        .with_state(state)
}
