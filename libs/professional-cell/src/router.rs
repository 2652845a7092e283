use std::sync::Arc;

use axum::{
    Router,
    routing::get,
    middleware,
};

use shared_config::AppConfig;
use shared_utils::extractor::auth_middleware;

use crate::handlers::{self, ProfessionalState};
use crate::services::AvailabilityResolver;

pub fn professional_routes(config: Arc<AppConfig>, resolver: Arc<dyn AvailabilityResolver>) -> Router {
    let state = Arc::new(ProfessionalState { resolver });

    Router::new()
        .route("/candidates", get(handlers::list_candidates))
        .layer(middleware::from_fn_with_state(config, auth_middleware))
        .with_state(state)
}
