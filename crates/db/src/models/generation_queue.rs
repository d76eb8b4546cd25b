//! Generation queue entry models and DTOs.

use planforge_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::status::{QueueStatus, StatusId};

/// A row from the `generation_queue` table -- the durable record of one
/// generation job's lifecycle.
///
/// Created by the API when a request is accepted; mutated only by the
/// external executor (status, progress, result, error); read by the
/// progress stream and the status endpoint. Never deleted.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct GenerationQueueEntry {
    pub id: DbId,
    pub user_id: DbId,
    /// Client-supplied correlation key, globally unique.
    pub request_id: String,
    pub status_id: StatusId,
    pub progress_percent: i16,
    pub current_phase: String,
    /// Job-class discriminator used for resume-vs-conflict decisions.
    pub job_key: String,
    /// Opaque job parameters forwarded to the executor.
    pub context: serde_json::Value,
    pub result_plan_id: Option<DbId>,
    pub error_message: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl GenerationQueueEntry {
    /// Decoded status. Falls back to `Failed` for an id the application
    /// does not know, which can only happen if the lookup table was
    /// edited out from under us.
    pub fn status(&self) -> QueueStatus {
        QueueStatus::from_id(self.status_id).unwrap_or(QueueStatus::Failed)
    }

    /// Whether the entry has reached a terminal state.
    pub fn is_terminal(&self) -> bool {
        self.status().is_terminal()
    }
}

/// DTO for creating a new queue entry.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateQueueEntry {
    pub request_id: String,
    pub job_key: String,
    pub context: serde_json::Value,
}
