use std::sync::Arc;

use axum::{
    extract::{Extension, Query, State},
    Json,
};

use shared_models::auth::User;
use shared_models::error::AppError;
use shared_utils::extractor::require_staff;

use crate::models::{BoardQuery, EscalationBoard};
use crate::services::EscalationWorker;

/// Latest escalation board, as computed by the last worker tick.
#[axum::debug_handler]
pub async fn get_queue(
    State(worker): State<Arc<EscalationWorker>>,
    Extension(user): Extension<User>,
    Query(query): Query<BoardQuery>,
) -> Result<Json<EscalationBoard>, AppError> {
    require_staff(&user)?;

    let mut board = worker.board().await;
    if query.overdue_only {
        board.entries.retain(|e| e.overdue);
        board.total = board.entries.len();
    }

    Ok(Json(board))
}
