//! The progress bridge: translates the durable queue record into a live
//! push stream.
//!
//! One bridge runs per client connection as a cooperative poll loop:
//! sleep a fixed interval, read the entry, forward what changed. The
//! sleep is the only suspension point and doubles as backpressure on
//! poll frequency. A hard wall-clock budget bounds the whole loop
//! independent of executor progress.
//!
//! The client channel may die at any moment (disconnect); every send is
//! checked and a failed send terminates the loop without surfacing an
//! error anywhere. Dropping the sender is the close operation and is
//! idempotent.

use planforge_core::messages;
use planforge_db::models::generation_queue::GenerationQueueEntry;
use planforge_db::models::status::QueueStatus;
use planforge_db::repositories::GenerationQueueRepo;
use serde::Serialize;
use sqlx::PgPool;
use tokio::sync::mpsc;
use tokio::time::Instant;

use crate::config::StreamConfig;
use crate::engine::resolver;

/// Phase label on terminal success frames.
const PHASE_COMPLETE: &str = "complete";
/// Phase label on terminal failure frames.
const PHASE_ERROR: &str = "error";

/// Client-facing message when the stream budget expires.
const MSG_STREAM_TIMEOUT: &str =
    "Timed out waiting for the generation to finish. It may still complete in the background.";

/// Client-facing message when the entry vanishes mid-stream.
const MSG_ENTRY_MISSING: &str = "The generation record could not be found.";

/// Client-facing message when a completed entry has no loadable artifact.
const MSG_RESULT_UNRESOLVABLE: &str =
    "The generation finished but its result could not be loaded.";

// ---------------------------------------------------------------------------
// Stream frames
// ---------------------------------------------------------------------------

/// One SSE `data:` payload.
///
/// Exactly one terminal frame ([`Complete`](StreamFrame::Complete) or
/// [`Error`](StreamFrame::Error)) ends every stream that the client is
/// still listening to.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(untagged)]
pub enum StreamFrame {
    /// Non-terminal progress update.
    Progress {
        phase: String,
        progress: i16,
        message: Option<String>,
    },
    /// Terminal success, carrying the resolved artifact.
    Complete {
        phase: &'static str,
        result: serde_json::Value,
    },
    /// Terminal failure, carrying a user-presentable message.
    Error {
        phase: &'static str,
        error: String,
    },
}

impl StreamFrame {
    pub fn progress(phase: impl Into<String>, progress: i16, message: Option<String>) -> Self {
        StreamFrame::Progress {
            phase: phase.into(),
            progress,
            message,
        }
    }

    pub fn complete(result: serde_json::Value) -> Self {
        StreamFrame::Complete {
            phase: PHASE_COMPLETE,
            result,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        StreamFrame::Error {
            phase: PHASE_ERROR,
            error: message.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// ProgressBridge
// ---------------------------------------------------------------------------

/// The poll-and-push loop for one stream connection.
pub struct ProgressBridge {
    pool: PgPool,
    config: StreamConfig,
}

impl ProgressBridge {
    pub fn new(pool: PgPool, config: StreamConfig) -> Self {
        Self { pool, config }
    }

    /// Run the stream loop for an admitted entry until a terminal frame
    /// is sent, the budget expires, or the client disconnects.
    pub async fn run(&self, entry: GenerationQueueEntry, tx: mpsc::Sender<StreamFrame>) {
        let request_id = entry.request_id.clone();

        // Reconnect to a finished job: terminal frame immediately, no
        // polling, no re-dispatch.
        match entry.status() {
            QueueStatus::Completed => {
                self.emit_completion(&entry, &tx).await;
                return;
            }
            QueueStatus::Failed => {
                send(&tx, failure_frame(&entry)).await;
                return;
            }
            QueueStatus::Pending | QueueStatus::InProgress => {}
        }

        let mut last_sent = entry.progress_percent;
        if !send(
            &tx,
            StreamFrame::progress(
                planforge_core::generation::PHASE_STARTING,
                entry.progress_percent,
                None,
            ),
        )
        .await
        {
            return;
        }

        let deadline = Instant::now() + self.config.timeout;

        loop {
            if Instant::now() >= deadline {
                tracing::warn!(request_id = %request_id, "Progress stream budget expired");
                send(&tx, StreamFrame::error(MSG_STREAM_TIMEOUT)).await;
                return;
            }
            tokio::time::sleep(self.config.poll_interval).await;

            let current =
                match GenerationQueueRepo::find_by_request_id(&self.pool, &request_id).await {
                    Ok(Some(current)) => current,
                    Ok(None) => {
                        tracing::error!(request_id = %request_id, "Queue entry disappeared mid-stream");
                        send(&tx, StreamFrame::error(MSG_ENTRY_MISSING)).await;
                        return;
                    }
                    Err(e) => {
                        tracing::error!(request_id = %request_id, error = %e, "Failed to poll queue entry");
                        send(&tx, StreamFrame::error(MSG_ENTRY_MISSING)).await;
                        return;
                    }
                };

            match current.status() {
                QueueStatus::Completed => {
                    self.emit_completion(&current, &tx).await;
                    return;
                }
                QueueStatus::Failed => {
                    send(&tx, failure_frame(&current)).await;
                    return;
                }
                QueueStatus::Pending | QueueStatus::InProgress => {
                    if planforge_core::generation::should_forward_progress(
                        last_sent,
                        current.progress_percent,
                    ) {
                        last_sent = current.progress_percent;
                        if !send(
                            &tx,
                            StreamFrame::progress(
                                current.current_phase.clone(),
                                current.progress_percent,
                                None,
                            ),
                        )
                        .await
                        {
                            return;
                        }
                        self.mirror_progress(&current).await;
                    }
                }
            }
        }
    }

    /// Resolve the artifact and emit the completion frame, or an error
    /// frame if the promised artifact cannot be loaded.
    async fn emit_completion(&self, entry: &GenerationQueueEntry, tx: &mpsc::Sender<StreamFrame>) {
        match resolver::resolve_result(&self.pool, entry).await {
            Ok(result) => {
                send(tx, StreamFrame::complete(result)).await;
            }
            Err(e) => {
                tracing::error!(
                    entry_id = entry.id,
                    request_id = %entry.request_id,
                    error = %e,
                    "Completed entry has no resolvable result",
                );
                send(tx, StreamFrame::error(MSG_RESULT_UNRESOLVABLE)).await;
            }
        }
    }

    /// Best-effort mirror of forwarded progress back into the store.
    /// Never aborts the stream -- live delivery outranks persistence here.
    async fn mirror_progress(&self, entry: &GenerationQueueEntry) {
        if let Err(e) = GenerationQueueRepo::mirror_progress(
            &self.pool,
            entry.id,
            entry.progress_percent,
            &entry.current_phase,
        )
        .await
        {
            tracing::warn!(
                entry_id = entry.id,
                error = %e,
                "Failed to mirror progress into queue entry",
            );
        }
    }
}

/// Build the terminal failure frame for a failed entry, passing the
/// stored executor message through best-effort classification.
fn failure_frame(entry: &GenerationQueueEntry) -> StreamFrame {
    let raw = entry
        .error_message
        .as_deref()
        .unwrap_or("Generation failed");
    StreamFrame::error(messages::classify_failure(raw))
}

/// Push one frame to the client channel.
///
/// Returns `false` when the client is gone; the caller stops its loop.
/// The failure is logged at debug level and never propagated -- client
/// disconnect is not an error.
async fn send(tx: &mpsc::Sender<StreamFrame>, frame: StreamFrame) -> bool {
    match tx.send(frame).await {
        Ok(()) => true,
        Err(e) => {
            tracing::debug!(error = %e, "Client channel closed, ending stream");
            false
        }
    }
}
