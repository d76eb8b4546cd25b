//! Shared helpers for API integration tests.
//!
//! Mirrors the production router construction so tests exercise the same
//! middleware stack (CORS, request ID, timeout, tracing, panic recovery)
//! that production uses, with test-friendly stream pacing.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, Response, StatusCode};
use axum::routing::post;
use axum::Router;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;

use planforge_api::auth::jwt::{generate_access_token, JwtConfig};
use planforge_api::config::{ExecutorConfig, ServerConfig, StreamConfig};
use planforge_api::engine::dispatcher::ExecutorClient;
use planforge_api::router::build_app_router;
use planforge_api::state::AppState;
use planforge_db::repositories::UserRepo;

/// Build a test `ServerConfig` with safe defaults and fast stream pacing.
///
/// The executor is disabled by default; tests that need dispatch build a
/// config pointing at a capture executor (see [`spawn_capture_executor`]).
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        jwt: test_jwt_config(),
        executor: ExecutorConfig {
            enabled: false,
            base_url: String::new(),
            request_timeout_secs: 2,
        },
        stream: StreamConfig {
            poll_interval: Duration::from_millis(50),
            timeout: Duration::from_secs(10),
        },
    }
}

pub fn test_jwt_config() -> JwtConfig {
    JwtConfig {
        secret: "integration-test-secret".to_string(),
        access_token_expiry_mins: 15,
    }
}

/// Build the application router with the default test config.
pub fn build_test_app(pool: PgPool) -> Router {
    build_test_app_with(pool, test_config())
}

/// Build the application router with a custom config (stream pacing,
/// executor endpoint).
pub fn build_test_app_with(pool: PgPool, config: ServerConfig) -> Router {
    let executor = Arc::new(ExecutorClient::new(config.executor.clone()));
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        executor,
    };
    build_app_router(state, &config)
}

/// Seed a user and return their id.
pub async fn seed_user(pool: &PgPool, email: &str) -> i64 {
    UserRepo::create(pool, email, "Test Lifter")
        .await
        .expect("user insert failed")
        .id
}

/// A valid `Bearer` token for the given user under the test JWT config.
pub fn bearer(user_id: i64) -> String {
    let token = generate_access_token(user_id, &test_jwt_config()).expect("token generation");
    format!("Bearer {token}")
}

/// Issue a GET request, optionally authenticated.
pub async fn get(app: Router, path: &str, auth: Option<&str>) -> Response<Body> {
    let mut builder = Request::builder().method("GET").uri(path);
    if let Some(auth) = auth {
        builder = builder.header("authorization", auth);
    }
    app.oneshot(builder.body(Body::empty()).unwrap())
        .await
        .unwrap()
}

/// Issue an authenticated POST with a JSON body.
pub async fn post_json(
    app: Router,
    path: &str,
    auth: &str,
    body: serde_json::Value,
) -> Response<Body> {
    let request = Request::builder()
        .method("POST")
        .uri(path)
        .header("authorization", auth)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).expect("response body was not valid JSON")
}

/// Collect an SSE response body to its end and parse every `data:` frame.
///
/// Comment/keep-alive lines are skipped. The body ends when the stream
/// driver drops its sender, so this resolves once the stream reaches a
/// terminal frame.
pub async fn sse_frames(response: Response<Body>) -> Vec<serde_json::Value> {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let text = String::from_utf8(bytes.to_vec()).expect("SSE body was not UTF-8");

    text.split("\n\n")
        .flat_map(|event| event.lines())
        .filter_map(|line| line.strip_prefix("data: "))
        .map(|data| serde_json::from_str(data).expect("SSE data frame was not valid JSON"))
        .collect()
}

/// Spawn a local HTTP server standing in for the external executor's
/// event intake. Returns its base URL and a hit counter.
pub async fn spawn_capture_executor() -> (String, Arc<AtomicUsize>) {
    let hits = Arc::new(AtomicUsize::new(0));

    let app = Router::new().route(
        "/events",
        post({
            let hits = Arc::clone(&hits);
            move || {
                let hits = Arc::clone(&hits);
                async move {
                    hits.fetch_add(1, Ordering::SeqCst);
                    StatusCode::OK
                }
            }
        }),
    );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("failed to bind capture executor");
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("capture executor died");
    });

    (format!("http://{addr}"), hits)
}
