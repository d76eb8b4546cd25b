//! Handlers for the generation streaming endpoints.
//!
//! Routes:
//! - `POST /generate/stream` -- generate a new training split
//! - `POST /adapt/stream`    -- adapt an existing plan
//!
//! Both respond with `text/event-stream`. Identity comes from the JWT,
//! never from the body; the unauthenticated case is the only one that
//! produces an HTTP error. Every failure after that point is delivered
//! as exactly one SSE error frame, so clients have a single code path
//! for terminal outcomes.

use axum::extract::State;
use axum::http::header::{HeaderName, CACHE_CONTROL, CONNECTION};
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::{IntoResponse, Response};
use axum::Json;
use planforge_core::error::CoreError;
use planforge_core::generation::{
    plan_adaptation_job_key, split_generation_job_key, validate_days_per_week,
    validate_split_type, EVENT_ADAPT_PLAN, EVENT_GENERATE_SPLIT, JOB_PLAN_ADAPTATION,
    JOB_SPLIT_GENERATION,
};
use planforge_core::types::DbId;
use planforge_db::models::generation_queue::CreateQueueEntry;
use planforge_db::repositories::GenerationQueueRepo;
use serde::Deserialize;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tokio_stream::StreamExt;

use crate::engine::bridge::{ProgressBridge, StreamFrame};
use crate::engine::guard::{self, Admission};
use crate::error::AppError;
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

/// Buffered frames per stream before the producer awaits the client.
const CHANNEL_CAPACITY: usize = 16;

/// Client-facing message when the executor hand-off dies after the entry
/// was persisted.
const MSG_DISPATCH_FAILED: &str =
    "Could not hand the job to the generation service. Please try again.";

// ---------------------------------------------------------------------------
// DTOs
// ---------------------------------------------------------------------------

/// Request body for `POST /generate/stream`.
#[derive(Debug, Deserialize)]
pub struct GenerateStreamRequest {
    /// Client-chosen correlation key; reusing it reconnects to the same job.
    pub request_id: String,
    pub split_type: String,
    pub days_per_week: u8,
}

/// Request body for `POST /adapt/stream`.
#[derive(Debug, Deserialize)]
pub struct AdaptStreamRequest {
    pub request_id: String,
    /// The plan being adapted.
    pub plan_id: DbId,
    /// Free-form user feedback driving the adaptation.
    pub feedback: String,
}

/// A validated job ready for admission: queue entry input plus the
/// executor event that starts it.
struct PreparedJob {
    input: CreateQueueEntry,
    event_name: &'static str,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/generate/stream
pub async fn generate_stream(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<GenerateStreamRequest>,
) -> Response {
    open_stream(state, auth.user_id, prepare_generate(input))
}

/// POST /api/v1/adapt/stream
pub async fn adapt_stream(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<AdaptStreamRequest>,
) -> Response {
    open_stream(state, auth.user_id, prepare_adapt(input))
}

// ---------------------------------------------------------------------------
// Job preparation
// ---------------------------------------------------------------------------

fn prepare_generate(input: GenerateStreamRequest) -> Result<PreparedJob, CoreError> {
    validate_split_type(&input.split_type)?;
    validate_days_per_week(input.days_per_week)?;

    Ok(PreparedJob {
        input: CreateQueueEntry {
            request_id: input.request_id,
            job_key: split_generation_job_key(&input.split_type),
            context: serde_json::json!({
                "job_type": JOB_SPLIT_GENERATION,
                "split_type": input.split_type,
                "days_per_week": input.days_per_week,
            }),
        },
        event_name: EVENT_GENERATE_SPLIT,
    })
}

fn prepare_adapt(input: AdaptStreamRequest) -> Result<PreparedJob, CoreError> {
    if input.feedback.trim().is_empty() {
        return Err(CoreError::Validation(
            "feedback must not be empty".to_string(),
        ));
    }

    Ok(PreparedJob {
        input: CreateQueueEntry {
            request_id: input.request_id,
            job_key: plan_adaptation_job_key(input.plan_id),
            context: serde_json::json!({
                "job_type": JOB_PLAN_ADAPTATION,
                "plan_id": input.plan_id,
                "feedback": input.feedback,
            }),
        },
        event_name: EVENT_ADAPT_PLAN,
    })
}

// ---------------------------------------------------------------------------
// Stream plumbing
// ---------------------------------------------------------------------------

/// Spawn the stream driver and return the SSE response wired to it.
///
/// The driver owns the sender; the response body owns the receiver. A
/// client disconnect drops the receiver, the driver's next send fails,
/// and its loop exits -- no cancellation signal reaches the executor.
fn open_stream(
    state: AppState,
    user_id: DbId,
    prepared: Result<PreparedJob, CoreError>,
) -> Response {
    let (tx, rx) = mpsc::channel::<StreamFrame>(CHANNEL_CAPACITY);

    tokio::spawn(drive_stream(state, user_id, prepared, tx));

    let stream = ReceiverStream::new(rx).map(|frame| Event::default().json_data(&frame));
    let sse = Sse::new(stream).keep_alive(KeepAlive::default());

    (
        [
            (CACHE_CONTROL, "no-cache, no-transform"),
            (CONNECTION, "keep-alive"),
            (HeaderName::from_static("x-accel-buffering"), "no"),
        ],
        sse,
    )
        .into_response()
}

/// Admit, dispatch if new, then hand the entry to the progress bridge.
///
/// Setup failures emit exactly one error frame; a send that fails means
/// the client is already gone and is simply ignored.
async fn drive_stream(
    state: AppState,
    user_id: DbId,
    prepared: Result<PreparedJob, CoreError>,
    tx: mpsc::Sender<StreamFrame>,
) {
    let job = match prepared {
        Ok(job) => job,
        Err(e) => {
            let _ = tx.send(StreamFrame::error(e.to_string())).await;
            return;
        }
    };

    let admission = match guard::admit(
        &state.pool,
        user_id,
        &job.input,
        state.executor.is_available(),
    )
    .await
    {
        Ok(admission) => admission,
        Err(e) => {
            let _ = tx.send(StreamFrame::error(setup_error_message(&e))).await;
            return;
        }
    };

    let entry = match admission {
        Admission::Created(entry) => {
            let payload = serde_json::json!({
                "request_id": entry.request_id,
                "user_id": user_id,
                "context": entry.context,
            });
            if let Err(e) = state.executor.send(job.event_name, payload).await {
                tracing::error!(
                    entry_id = entry.id,
                    request_id = %entry.request_id,
                    error = %e,
                    "Executor dispatch failed, failing queue entry",
                );
                // The entry was persisted before dispatch; mark it failed
                // so no orphaned pending row survives.
                if let Err(db_err) = GenerationQueueRepo::fail(
                    &state.pool,
                    entry.id,
                    &format!("Dispatch to executor failed: {e}"),
                )
                .await
                {
                    tracing::error!(
                        entry_id = entry.id,
                        error = %db_err,
                        "Failed to mark undispatched entry as failed",
                    );
                }
                let _ = tx.send(StreamFrame::error(MSG_DISPATCH_FAILED)).await;
                return;
            }
            entry
        }
        Admission::Resumed(entry) => entry,
    };

    ProgressBridge::new(state.pool.clone(), state.config.stream)
        .run(entry, tx)
        .await;
}

/// User-presentable message for a setup failure (admission, lookup).
fn setup_error_message(err: &AppError) -> String {
    match err {
        AppError::Core(core) => core.to_string(),
        AppError::BadRequest(msg) => msg.clone(),
        AppError::Database(e) => {
            tracing::error!(error = %e, "Database error during stream setup");
            "An internal error occurred".to_string()
        }
        AppError::InternalError(msg) => {
            tracing::error!(error = %msg, "Internal error during stream setup");
            "An internal error occurred".to_string()
        }
    }
}
