//! Integration tests for the generation status query endpoint.

mod common;

use axum::http::StatusCode;
use common::{body_json, build_test_app, bearer, get, seed_user};
use planforge_db::models::generation_queue::CreateQueueEntry;
use planforge_db::repositories::GenerationQueueRepo;
use sqlx::PgPool;

async fn seed_entry(pool: &PgPool, user_id: i64, request_id: &str) -> i64 {
    GenerationQueueRepo::insert_pending(
        pool,
        user_id,
        &CreateQueueEntry {
            request_id: request_id.to_string(),
            job_key: "split_generation:ppl".to_string(),
            context: serde_json::json!({ "split_type": "ppl" }),
        },
    )
    .await
    .expect("seed entry failed")
    .id
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn unauthenticated_query_returns_401(pool: PgPool) {
    let app = build_test_app(pool);
    let response = get(app, "/api/v1/generation-status/r1", None).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn unknown_request_id_returns_404(pool: PgPool) {
    let user_id = seed_user(&pool, "status@example.com").await;
    let app = build_test_app(pool);

    let response = get(
        app,
        "/api/v1/generation-status/no-such-request",
        Some(&bearer(user_id)),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn non_owner_query_returns_403(pool: PgPool) {
    let owner = seed_user(&pool, "owner@example.com").await;
    let other = seed_user(&pool, "other@example.com").await;
    seed_entry(&pool, owner, "r-owned").await;

    let app = build_test_app(pool);
    let response = get(
        app,
        "/api/v1/generation-status/r-owned",
        Some(&bearer(other)),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn owner_sees_durable_state(pool: PgPool) {
    let user_id = seed_user(&pool, "me@example.com").await;
    let entry_id = seed_entry(&pool, user_id, "r-mine").await;
    GenerationQueueRepo::mark_in_progress(&pool, entry_id)
        .await
        .unwrap();
    GenerationQueueRepo::update_progress(&pool, entry_id, 55, "balancing")
        .await
        .unwrap();

    let app = build_test_app(pool);
    let response = get(
        app,
        "/api/v1/generation-status/r-mine",
        Some(&bearer(user_id)),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["status"], "in_progress");
    assert_eq!(json["progress_percent"], 55);
    assert_eq!(json["current_phase"], "balancing");
    assert_eq!(json["result_reference"], serde_json::Value::Null);
    assert_eq!(json["error_message"], serde_json::Value::Null);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn failed_entry_reports_stored_error(pool: PgPool) {
    let user_id = seed_user(&pool, "fail@example.com").await;
    let entry_id = seed_entry(&pool, user_id, "r-fail").await;
    GenerationQueueRepo::fail(&pool, entry_id, "model returned malformed exercise list")
        .await
        .unwrap();

    let app = build_test_app(pool);
    let response = get(
        app,
        "/api/v1/generation-status/r-fail",
        Some(&bearer(user_id)),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["status"], "failed");
    assert_eq!(
        json["error_message"],
        "model returned malformed exercise list"
    );
}
