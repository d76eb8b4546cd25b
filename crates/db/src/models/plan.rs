//! Training plan entity models and DTOs.

use planforge_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `plans` table -- one generated training plan.
///
/// `content` holds the full plan document produced by the executor
/// (days, exercises, set/rep schemes) as opaque JSON.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Plan {
    pub id: DbId,
    pub user_id: DbId,
    pub name: String,
    pub split_type: String,
    pub content: serde_json::Value,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for inserting a plan (used by the executor's write path and tests).
#[derive(Debug, Deserialize)]
pub struct CreatePlan {
    pub name: String,
    pub split_type: String,
    pub content: serde_json::Value,
}
