use std::sync::Arc;

use axum::{middleware, routing::get, Router};

use shared_config::AppConfig;
use shared_utils::extractor::auth_middleware;

use crate::handlers::get_queue;
use crate::services::EscalationWorker;

pub fn escalation_routes(config: Arc<AppConfig>, worker: Arc<EscalationWorker>) -> Router {
    Router::new()
        .route("/queue", get(get_queue))
        .layer(middleware::from_fn_with_state(config, auth_middleware))
        .with_state(worker)
}
