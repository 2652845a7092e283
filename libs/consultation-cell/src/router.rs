// libs/consultation-cell/src/router.rs
use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};

use shared_config::AppConfig;
use shared_utils::extractor::auth_middleware;

use crate::handlers::{self, ConsultationState};
use crate::services::routing::RoutingEngine;

pub fn consultation_routes(config: Arc<AppConfig>, engine: Arc<RoutingEngine>) -> Router {
    let state = Arc::new(ConsultationState { engine });

    Router::new()
        .route(
            "/",
            post(handlers::create_consultation).get(handlers::list_consultations),
        )
        .route("/{id}", get(handlers::get_consultation))
        .route("/{id}/transitions", post(handlers::transition_consultation))
        .route("/{id}/history", get(handlers::get_history))
        .route("/{id}/triage", put(handlers::record_triage))
        .route("/{id}/clinical-notes", put(handlers::record_clinical_notes))
        .layer(middleware::from_fn_with_state(config, auth_middleware))
        .with_state(state)
}
