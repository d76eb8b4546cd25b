//! Repository for the `plans` table.

use planforge_core::types::DbId;
use sqlx::PgPool;

use crate::models::plan::{CreatePlan, Plan};

/// Column list for `plans` queries.
const COLUMNS: &str = "id, user_id, name, split_type, content, created_at, updated_at";

pub struct PlanRepo;

impl PlanRepo {
    /// Insert a plan for a user.
    pub async fn create(
        pool: &PgPool,
        user_id: DbId,
        input: &CreatePlan,
    ) -> Result<Plan, sqlx::Error> {
        let query = format!(
            "INSERT INTO plans (user_id, name, split_type, content) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Plan>(&query)
            .bind(user_id)
            .bind(&input.name)
            .bind(&input.split_type)
            .bind(&input.content)
            .fetch_one(pool)
            .await
    }

    /// Find a plan by ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Plan>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM plans WHERE id = $1");
        sqlx::query_as::<_, Plan>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }
}
