// libs/consultation-cell/src/handlers.rs
use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use serde_json::{json, Value};
use tracing::info;
use uuid::Uuid;

use shared_models::auth::{Actor, Role, User};
use shared_models::error::AppError;
use shared_utils::extractor::current_actor;

use crate::models::{
    ClinicalData, ConsultationFilter, ConsultationRecord, CreateConsultationRequest,
    TransitionRequest, TriageData,
};
use crate::services::ledger::time_in_states;
use crate::services::routing::RoutingEngine;
use crate::services::transitions::valid_targets;

pub struct ConsultationState {
    pub engine: Arc<RoutingEngine>,
}

fn ensure_visible(actor: &Actor, record: &ConsultationRecord) -> Result<(), AppError> {
    if actor.role == Role::Patient && record.patient_id != actor.id {
        return Err(AppError::Forbidden(
            "Not authorized to view this consultation".to_string(),
        ));
    }
    Ok(())
}

#[axum::debug_handler]
pub async fn create_consultation(
    State(state): State<Arc<ConsultationState>>,
    Extension(user): Extension<User>,
    Json(request): Json<CreateConsultationRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let actor = current_actor(&user)?;

    let patient_id = match (request.patient_id, actor.role) {
        (Some(id), _) => id,
        (None, Role::Patient) => actor.id,
        (None, _) => return Err(AppError::BadRequest("patient_id is required".to_string())),
    };

    let record = state
        .engine
        .create_consultation(&actor, patient_id, request.kind, request.initial_triage)
        .await?;

    Ok((StatusCode::CREATED, Json(json!(record))))
}

#[axum::debug_handler]
pub async fn list_consultations(
    State(state): State<Arc<ConsultationState>>,
    Extension(user): Extension<User>,
    Query(mut filter): Query<ConsultationFilter>,
) -> Result<Json<Value>, AppError> {
    let actor = current_actor(&user)?;
    if actor.role == Role::Patient {
        filter.patient_id = Some(actor.id);
    }

    let records = state.engine.list_consultations(&filter).await?;

    Ok(Json(json!({
        "consultations": records,
        "total": records.len()
    })))
}

#[axum::debug_handler]
pub async fn get_consultation(
    State(state): State<Arc<ConsultationState>>,
    Path(consultation_id): Path<Uuid>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    let actor = current_actor(&user)?;
    let record = state.engine.get_consultation(consultation_id).await?;
    ensure_visible(&actor, &record)?;

    let next_statuses = valid_targets(record.status);
    Ok(Json(json!({
        "consultation": record,
        "valid_transitions": next_statuses
    })))
}

#[axum::debug_handler]
pub async fn transition_consultation(
    State(state): State<Arc<ConsultationState>>,
    Path(consultation_id): Path<Uuid>,
    Extension(user): Extension<User>,
    Json(request): Json<TransitionRequest>,
) -> Result<Json<Value>, AppError> {
    let actor = current_actor(&user)?;
    info!(
        "Transition of {} to {} requested by {} ({})",
        consultation_id, request.target_status, actor.id, actor.role
    );

    let current = state.engine.get_consultation(consultation_id).await?;
    ensure_visible(&actor, &current)?;

    let record = state
        .engine
        .attempt_transition(consultation_id, request.target_status, &actor, request.payload)
        .await?;

    Ok(Json(json!(record)))
}

#[axum::debug_handler]
pub async fn get_history(
    State(state): State<Arc<ConsultationState>>,
    Path(consultation_id): Path<Uuid>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    let actor = current_actor(&user)?;
    let record = state.engine.get_consultation(consultation_id).await?;
    ensure_visible(&actor, &record)?;

    let history = state.engine.get_history(consultation_id).await?;
    let durations = time_in_states(&history, Utc::now());

    Ok(Json(json!({
        "consultation_id": consultation_id,
        "history": history,
        "time_in_states": durations
    })))
}

#[axum::debug_handler]
pub async fn record_triage(
    State(state): State<Arc<ConsultationState>>,
    Path(consultation_id): Path<Uuid>,
    Extension(user): Extension<User>,
    Json(triage): Json<TriageData>,
) -> Result<Json<Value>, AppError> {
    let actor = current_actor(&user)?;
    let record = state.engine.record_triage(consultation_id, &actor, triage).await?;
    Ok(Json(json!(record)))
}

#[axum::debug_handler]
pub async fn record_clinical_notes(
    State(state): State<Arc<ConsultationState>>,
    Path(consultation_id): Path<Uuid>,
    Extension(user): Extension<User>,
    Json(clinical): Json<ClinicalData>,
) -> Result<Json<Value>, AppError> {
    let actor = current_actor(&user)?;
    let record = state
        .engine
        .record_clinical_notes(consultation_id, &actor, clinical)
        .await?;
    Ok(Json(json!(record)))
}
