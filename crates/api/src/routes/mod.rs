pub mod generation;
pub mod health;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// ```text
/// /generate/stream                  start or reconnect a split generation (SSE)
/// /adapt/stream                     start or reconnect a plan adaptation (SSE)
/// /generation-status/{request_id}   durable job state snapshot
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new().merge(generation::router())
}
