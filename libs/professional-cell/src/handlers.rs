use std::sync::Arc;

use axum::{
    extract::{Query, State, Extension},
    Json,
};
use serde_json::{json, Value};
use tracing::{info, warn};

use shared_models::auth::User;
use shared_models::error::AppError;
use shared_utils::extractor::require_staff;

use crate::models::CandidateQuery;
use crate::services::AvailabilityResolver;

pub struct ProfessionalState {
    pub resolver: Arc<dyn AvailabilityResolver>,
}

/// List professionals that could take a consultation right now, best first.
#[axum::debug_handler]
pub async fn list_candidates(
    State(state): State<Arc<ProfessionalState>>,
    Extension(user): Extension<User>,
    Query(query): Query<CandidateQuery>,
) -> Result<Json<Value>, AppError> {
    let actor = require_staff(&user)?;
    info!("Candidate lookup for {} by {}", query.role, actor.id);

    let candidates = state
        .resolver
        .find_candidates(query.role, query.specialty.as_deref())
        .await
        .map_err(|e| {
            warn!("Candidate lookup failed: {}", e);
            AppError::ExternalService(e.to_string())
        })?;

    Ok(Json(json!({
        "role": query.role,
        "specialty": query.specialty,
        "total": candidates.len(),
        "candidates": candidates
    })))
}
