//! Single-flight admission for generation requests.
//!
//! Decides, for an incoming request, whether to create a fresh queue
//! entry, resume an existing one, or reject. The database enforces the
//! actual invariant (partial unique index on active user entries); this
//! module maps constraint outcomes to deterministic admission decisions,
//! so a true concurrent create resolves the same way a sequential one
//! would.

use planforge_core::error::CoreError;
use planforge_core::types::DbId;
use planforge_db::models::generation_queue::{CreateQueueEntry, GenerationQueueEntry};
use planforge_db::repositories::generation_queue_repo::{UQ_ACTIVE_USER, UQ_REQUEST_ID};
use planforge_db::repositories::GenerationQueueRepo;
use sqlx::PgPool;

use crate::error::{AppError, AppResult};

/// Outcome of a successful admission.
#[derive(Debug)]
pub enum Admission {
    /// A new pending entry was created; the caller must dispatch it.
    Created(GenerationQueueEntry),
    /// An existing entry (active, or a reconnect to a finished one) was
    /// returned; the caller must NOT dispatch again.
    Resumed(GenerationQueueEntry),
}

/// Admit a generation request for `user_id`.
///
/// Decision order:
/// 1. A known `request_id` is a reconnect: return that entry (the stream
///    loop emits the terminal frame immediately if it already finished).
/// 2. An active entry with the same `job_key` is resumed.
/// 3. An active entry with a different `job_key` is a conflict.
/// 4. Otherwise create a pending entry -- but only when
///    `dispatch_available`; creating a row nothing will process is worse
///    than failing fast.
///
/// Inserts racing another request land on a unique violation and are
/// re-classified against the winning row, so both racers converge on the
/// same resume/reject answer.
pub async fn admit(
    pool: &PgPool,
    user_id: DbId,
    input: &CreateQueueEntry,
    dispatch_available: bool,
) -> AppResult<Admission> {
    if let Some(existing) = GenerationQueueRepo::find_by_request_id(pool, &input.request_id).await?
    {
        return reconnect(existing, user_id, input).map(Admission::Resumed);
    }

    if let Some(active) = GenerationQueueRepo::find_active(pool, user_id).await? {
        return resume_or_reject(active, &input.job_key).map(Admission::Resumed);
    }

    if !dispatch_available {
        return Err(AppError::Core(CoreError::Configuration(
            "No generation executor is configured; try again later".into(),
        )));
    }

    match GenerationQueueRepo::insert_pending(pool, user_id, input).await {
        Ok(entry) => {
            tracing::info!(
                entry_id = entry.id,
                user_id,
                request_id = %entry.request_id,
                job_key = %entry.job_key,
                "Generation queue entry created",
            );
            Ok(Admission::Created(entry))
        }
        Err(err) if is_unique_violation(&err, UQ_ACTIVE_USER) => {
            // Lost a create race; classify against the winner's row.
            let active = GenerationQueueRepo::find_active(pool, user_id)
                .await?
                .ok_or_else(|| {
                    AppError::InternalError("Active entry vanished during admission".into())
                })?;
            resume_or_reject(active, &input.job_key).map(Admission::Resumed)
        }
        Err(err) if is_unique_violation(&err, UQ_REQUEST_ID) => {
            // Double-submit race on the same correlation key.
            let existing = GenerationQueueRepo::find_by_request_id(pool, &input.request_id)
                .await?
                .ok_or_else(|| {
                    AppError::InternalError("Queue entry vanished during admission".into())
                })?;
            reconnect(existing, user_id, input).map(Admission::Resumed)
        }
        Err(err) => Err(err.into()),
    }
}

/// Validate a reconnect against the entry that owns the `request_id`.
fn reconnect(
    existing: GenerationQueueEntry,
    user_id: DbId,
    input: &CreateQueueEntry,
) -> AppResult<GenerationQueueEntry> {
    if existing.user_id != user_id {
        return Err(AppError::Core(CoreError::Forbidden(
            "request_id belongs to another user".into(),
        )));
    }
    if existing.job_key != input.job_key {
        return Err(AppError::Core(CoreError::Conflict(format!(
            "request_id {} was already used for a different job",
            input.request_id
        ))));
    }
    Ok(existing)
}

/// Resume the active entry when the job class matches, reject otherwise.
fn resume_or_reject(
    active: GenerationQueueEntry,
    job_key: &str,
) -> AppResult<GenerationQueueEntry> {
    if active.job_key == job_key {
        tracing::info!(
            entry_id = active.id,
            request_id = %active.request_id,
            job_key,
            "Resuming in-flight generation",
        );
        Ok(active)
    } else {
        Err(AppError::Core(CoreError::Conflict(
            "A different generation is already in progress for this account".into(),
        )))
    }
}

/// Whether a sqlx error is a PostgreSQL unique violation (23505) on the
/// named constraint or index.
fn is_unique_violation(err: &sqlx::Error, constraint: &str) -> bool {
    match err {
        sqlx::Error::Database(db_err) => {
            db_err.code().as_deref() == Some("23505")
                && db_err.constraint() == Some(constraint)
        }
        _ => false,
    }
}
