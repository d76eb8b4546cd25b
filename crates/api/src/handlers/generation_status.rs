//! Handler for the non-streaming generation status query.

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use planforge_core::error::CoreError;
use planforge_core::types::DbId;
use planforge_db::repositories::GenerationQueueRepo;
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

/// Response for `GET /generation-status/{request_id}`.
#[derive(Debug, Serialize)]
pub struct GenerationStatusResponse {
    pub status: &'static str,
    pub progress_percent: i16,
    pub current_phase: String,
    pub result_reference: Option<DbId>,
    pub error_message: Option<String>,
}

/// GET /api/v1/generation-status/{request_id}
///
/// Snapshot of a generation job's durable state. Only the owner may
/// query it: unknown keys are 404, someone else's are 403.
pub async fn get_generation_status(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(request_id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let entry = GenerationQueueRepo::find_by_request_id(&state.pool, &request_id)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::not_found("Generation request", &request_id))
        })?;

    if entry.user_id != auth.user_id {
        return Err(AppError::Core(CoreError::Forbidden(
            "Cannot view another user's generation".into(),
        )));
    }

    Ok(Json(GenerationStatusResponse {
        status: entry.status().name(),
        progress_percent: entry.progress_percent,
        current_phase: entry.current_phase,
        result_reference: entry.result_plan_id,
        error_message: entry.error_message,
    }))
}
