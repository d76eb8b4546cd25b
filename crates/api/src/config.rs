//! Server configuration loaded from environment variables.
//!
//! All fields have defaults suitable for local development except the
//! JWT secret. Configuration is read once at startup and injected into
//! the components that need it -- nothing reads environment variables at
//! call sites.

use std::time::Duration;

use crate::auth::jwt::JwtConfig;

/// Default interval between progress polls in the stream loop.
const DEFAULT_POLL_INTERVAL_MS: u64 = 2_000;

/// Default wall-clock budget for one progress stream.
const DEFAULT_STREAM_TIMEOUT_SECS: u64 = 300;

/// Top-level server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS`.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds for non-streaming routes
    /// (default: `30`).
    pub request_timeout_secs: u64,
    /// JWT token configuration (secret, expiry).
    pub jwt: JwtConfig,
    /// External executor endpoint configuration.
    pub executor: ExecutorConfig,
    /// Progress stream pacing configuration.
    pub stream: StreamConfig,
}

/// Configuration for the external generation executor.
///
/// Injected into the dispatcher at construction; when disabled, job
/// creation fails fast with a dispatch-unavailable error instead of
/// persisting an entry nothing will process.
#[derive(Debug, Clone)]
pub struct ExecutorConfig {
    /// Whether dispatching is active (`EXECUTOR_ENABLED`, default `true`).
    pub enabled: bool,
    /// Base URL of the executor's event intake (`EXECUTOR_URL`).
    /// An empty URL behaves as disabled.
    pub base_url: String,
    /// Per-dispatch HTTP timeout in seconds (`EXECUTOR_TIMEOUT_SECS`,
    /// default `10`).
    pub request_timeout_secs: u64,
}

impl ExecutorConfig {
    /// Whether a dispatch target actually exists.
    pub fn is_available(&self) -> bool {
        self.enabled && !self.base_url.is_empty()
    }
}

/// Pacing for the progress stream loop.
#[derive(Debug, Clone, Copy)]
pub struct StreamConfig {
    /// Sleep between store polls (`STREAM_POLL_INTERVAL_MS`, default 2000).
    pub poll_interval: Duration,
    /// Hard wall-clock budget for a whole stream
    /// (`STREAM_TIMEOUT_SECS`, default 300).
    pub timeout: Duration,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                   | Default                 |
    /// |---------------------------|-------------------------|
    /// | `HOST`                    | `0.0.0.0`               |
    /// | `PORT`                    | `3000`                  |
    /// | `CORS_ORIGINS`            | `http://localhost:5173` |
    /// | `REQUEST_TIMEOUT_SECS`    | `30`                    |
    /// | `EXECUTOR_ENABLED`        | `true`                  |
    /// | `EXECUTOR_URL`            | (empty -- unavailable)   |
    /// | `EXECUTOR_TIMEOUT_SECS`   | `10`                    |
    /// | `STREAM_POLL_INTERVAL_MS` | `2000`                  |
    /// | `STREAM_TIMEOUT_SECS`     | `300`                   |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let executor = ExecutorConfig {
            enabled: std::env::var("EXECUTOR_ENABLED")
                .map(|v| v != "false" && v != "0")
                .unwrap_or(true),
            base_url: std::env::var("EXECUTOR_URL").unwrap_or_default(),
            request_timeout_secs: std::env::var("EXECUTOR_TIMEOUT_SECS")
                .unwrap_or_else(|_| "10".into())
                .parse()
                .expect("EXECUTOR_TIMEOUT_SECS must be a valid u64"),
        };

        let stream = StreamConfig {
            poll_interval: Duration::from_millis(
                std::env::var("STREAM_POLL_INTERVAL_MS")
                    .unwrap_or_else(|_| DEFAULT_POLL_INTERVAL_MS.to_string())
                    .parse()
                    .expect("STREAM_POLL_INTERVAL_MS must be a valid u64"),
            ),
            timeout: Duration::from_secs(
                std::env::var("STREAM_TIMEOUT_SECS")
                    .unwrap_or_else(|_| DEFAULT_STREAM_TIMEOUT_SECS.to_string())
                    .parse()
                    .expect("STREAM_TIMEOUT_SECS must be a valid u64"),
            ),
        };

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            jwt: JwtConfig::from_env(),
            executor,
            stream,
        }
    }
}
