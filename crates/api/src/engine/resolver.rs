//! Resolves a completed queue entry's reference into the plan artifact.

use planforge_db::models::generation_queue::GenerationQueueEntry;
use planforge_db::repositories::PlanRepo;
use sqlx::PgPool;

/// Error type for artifact resolution.
///
/// Any variant on a completed entry is an anomaly: the executor promised
/// an artifact it did not deliver. Callers must emit an error frame, not
/// a malformed completion frame.
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    /// The entry is completed but carries no result reference.
    #[error("Completed entry {entry_id} has no result reference")]
    MissingReference { entry_id: i64 },

    /// The referenced plan row does not exist.
    #[error("Plan {plan_id} referenced by entry {entry_id} not found")]
    PlanNotFound { entry_id: i64, plan_id: i64 },

    /// The lookup itself failed.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Fetch the artifact behind a completed entry's `result_plan_id`.
///
/// Returns the result payload embedded in the stream's completion frame.
pub async fn resolve_result(
    pool: &PgPool,
    entry: &GenerationQueueEntry,
) -> Result<serde_json::Value, ResolveError> {
    let plan_id = entry.result_plan_id.ok_or(ResolveError::MissingReference {
        entry_id: entry.id,
    })?;

    let plan = PlanRepo::find_by_id(pool, plan_id)
        .await?
        .ok_or(ResolveError::PlanNotFound {
            entry_id: entry.id,
            plan_id,
        })?;

    Ok(serde_json::json!({
        "plan_id": plan.id,
        "name": plan.name,
        "split_type": plan.split_type,
        "content": plan.content,
    }))
}
