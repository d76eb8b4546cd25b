//! Route definitions for generation coordination and progress streaming.
//!
//! All endpoints require authentication.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{generation, generation_status};
use crate::state::AppState;

/// Routes mounted at the API root.
///
/// ```text
/// POST /generate/stream                  -> generate_stream (SSE)
/// POST /adapt/stream                     -> adapt_stream (SSE)
/// GET  /generation-status/{request_id}   -> get_generation_status
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/generate/stream", post(generation::generate_stream))
        .route("/adapt/stream", post(generation::adapt_stream))
        .route(
            "/generation-status/{request_id}",
            get(generation_status::get_generation_status),
        )
}
