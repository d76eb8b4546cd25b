//! Fire-and-forget job dispatch to the external generation executor.
//!
//! The executor consumes `{ name, data }` event envelopes over HTTP POST
//! and does all actual generation work out of process. Delivery here is
//! at-most-once: no retries, no acknowledgment beyond the HTTP status.
//! Retry policy, if any, belongs to the executor's own intake.

use std::time::Duration;

use crate::config::ExecutorConfig;

/// Error type for dispatch failures.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    /// No executor is configured; nothing would process the job.
    #[error("No generation executor is configured")]
    Unavailable,

    /// The underlying HTTP request failed (network, DNS, timeout, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The executor returned a non-2xx status code.
    #[error("Executor returned HTTP {0}")]
    HttpStatus(u16),
}

/// Client for the executor's event intake endpoint.
///
/// Constructed once at startup from an [`ExecutorConfig`] and shared via
/// the application state; availability is a property of the injected
/// config, never of ambient environment reads.
pub struct ExecutorClient {
    client: reqwest::Client,
    config: ExecutorConfig,
}

impl ExecutorClient {
    /// Build a client with a pre-configured HTTP timeout.
    pub fn new(config: ExecutorConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .expect("Failed to build reqwest HTTP client");
        Self { client, config }
    }

    /// Whether a dispatch target exists. Callers must check this before
    /// persisting a queue entry, so a disabled executor fails fast
    /// instead of leaving orphaned pending rows.
    pub fn is_available(&self) -> bool {
        self.config.is_available()
    }

    /// Send one event envelope to the executor. At-most-once: a failure
    /// is reported to the caller and never retried here.
    pub async fn send(
        &self,
        event_name: &str,
        payload: serde_json::Value,
    ) -> Result<(), DispatchError> {
        if !self.is_available() {
            return Err(DispatchError::Unavailable);
        }

        let url = format!("{}/events", self.config.base_url.trim_end_matches('/'));
        let envelope = serde_json::json!({
            "name": event_name,
            "data": payload,
        });

        let response = self.client.post(&url).json(&envelope).send().await?;
        if !response.status().is_success() {
            return Err(DispatchError::HttpStatus(response.status().as_u16()));
        }

        tracing::info!(event = event_name, url, "Job dispatched to executor");
        Ok(())
    }
}
