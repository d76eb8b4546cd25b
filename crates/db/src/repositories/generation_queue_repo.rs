//! Repository for the `generation_queue` table.
//!
//! Every mutating statement is guarded so the table can only move through
//! the legal state machine regardless of caller bugs:
//!
//! - transitions apply only to non-terminal rows (`status_id IN (1, 2)`),
//!   so completed/failed rows are immutable;
//! - progress updates carry a monotonicity guard and silently ignore
//!   regressions;
//! - single-flight per user is the partial unique index
//!   `uq_generation_queue_active_user`, not application logic.
//!
//! The executor is the sole authorized writer of `mark_in_progress`,
//! `update_progress`, `complete`, and `fail`. The API only inserts rows
//! and best-effort mirrors progress via [`GenerationQueueRepo::mirror_progress`].

use planforge_core::types::DbId;
use sqlx::PgPool;

use crate::models::generation_queue::{CreateQueueEntry, GenerationQueueEntry};
use crate::models::status::QueueStatus;

/// Column list for `generation_queue` queries.
const COLUMNS: &str = "\
    id, user_id, request_id, status_id, progress_percent, current_phase, \
    job_key, context, result_plan_id, error_message, created_at, updated_at";

/// Name of the partial unique index enforcing one active entry per user.
/// The concurrency guard matches on this to classify insert races.
pub const UQ_ACTIVE_USER: &str = "uq_generation_queue_active_user";

/// Name of the unique constraint on `request_id`.
pub const UQ_REQUEST_ID: &str = "uq_generation_queue_request_id";

pub struct GenerationQueueRepo;

impl GenerationQueueRepo {
    /// Insert a new pending entry for a user.
    ///
    /// Fails with a unique violation on [`UQ_ACTIVE_USER`] if the user
    /// already has a non-terminal entry, or on [`UQ_REQUEST_ID`] if the
    /// correlation key was reused.
    pub async fn insert_pending(
        pool: &PgPool,
        user_id: DbId,
        input: &CreateQueueEntry,
    ) -> Result<GenerationQueueEntry, sqlx::Error> {
        let query = format!(
            "INSERT INTO generation_queue (user_id, request_id, status_id, job_key, context) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, GenerationQueueEntry>(&query)
            .bind(user_id)
            .bind(&input.request_id)
            .bind(QueueStatus::Pending.id())
            .bind(&input.job_key)
            .bind(&input.context)
            .fetch_one(pool)
            .await
    }

    /// The user's entry with status in {pending, in_progress}, if any.
    ///
    /// The partial unique index guarantees at most one such row exists.
    pub async fn find_active(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Option<GenerationQueueEntry>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM generation_queue \
             WHERE user_id = $1 AND status_id IN ($2, $3)"
        );
        sqlx::query_as::<_, GenerationQueueEntry>(&query)
            .bind(user_id)
            .bind(QueueStatus::Pending.id())
            .bind(QueueStatus::InProgress.id())
            .fetch_optional(pool)
            .await
    }

    /// Find an entry by its correlation key.
    pub async fn find_by_request_id(
        pool: &PgPool,
        request_id: &str,
    ) -> Result<Option<GenerationQueueEntry>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM generation_queue WHERE request_id = $1");
        sqlx::query_as::<_, GenerationQueueEntry>(&query)
            .bind(request_id)
            .fetch_optional(pool)
            .await
    }

    /// Executor transition: pending -> in_progress.
    ///
    /// Returns `false` if the entry was not pending (already picked up
    /// or already terminal).
    pub async fn mark_in_progress(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE generation_queue \
             SET status_id = $2, updated_at = NOW() \
             WHERE id = $1 AND status_id = $3",
        )
        .bind(id)
        .bind(QueueStatus::InProgress.id())
        .bind(QueueStatus::Pending.id())
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Executor write: progress percent and phase label.
    ///
    /// Returns `false` (no row touched) when the entry is terminal or the
    /// new percent would move progress backwards -- regressions are
    /// dropped, keeping the stored sequence non-decreasing.
    pub async fn update_progress(
        pool: &PgPool,
        id: DbId,
        percent: i16,
        phase: &str,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE generation_queue \
             SET progress_percent = $2, current_phase = $3, updated_at = NOW() \
             WHERE id = $1 \
               AND status_id IN ($4, $5) \
               AND progress_percent <= $2",
        )
        .bind(id)
        .bind(percent)
        .bind(phase)
        .bind(QueueStatus::Pending.id())
        .bind(QueueStatus::InProgress.id())
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Executor terminal transition: completed, with the result artifact.
    ///
    /// Sets progress to 100. Returns `false` if the entry was already
    /// terminal (terminal states are immutable).
    pub async fn complete(
        pool: &PgPool,
        id: DbId,
        result_plan_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE generation_queue \
             SET status_id = $2, result_plan_id = $3, progress_percent = 100, \
                 updated_at = NOW() \
             WHERE id = $1 AND status_id IN ($4, $5)",
        )
        .bind(id)
        .bind(QueueStatus::Completed.id())
        .bind(result_plan_id)
        .bind(QueueStatus::Pending.id())
        .bind(QueueStatus::InProgress.id())
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Terminal transition: failed, with an error message.
    ///
    /// Used by the executor on generation failure and by the API when a
    /// dispatch attempt dies after the row was persisted (no orphaned
    /// pending rows). Returns `false` if the entry was already terminal.
    pub async fn fail(pool: &PgPool, id: DbId, error: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE generation_queue \
             SET status_id = $2, error_message = $3, updated_at = NOW() \
             WHERE id = $1 AND status_id IN ($4, $5)",
        )
        .bind(id)
        .bind(QueueStatus::Failed.id())
        .bind(error)
        .bind(QueueStatus::Pending.id())
        .bind(QueueStatus::InProgress.id())
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Best-effort mirror of progress observed by the stream.
    ///
    /// Same guards as [`update_progress`](Self::update_progress); the
    /// caller logs and ignores failures -- persistence of mirrored
    /// progress is secondary to live delivery.
    pub async fn mirror_progress(
        pool: &PgPool,
        id: DbId,
        percent: i16,
        phase: &str,
    ) -> Result<bool, sqlx::Error> {
        Self::update_progress(pool, id, percent, phase).await
    }
}
