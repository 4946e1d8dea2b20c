#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, Request, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get as route_get, post};
use axum::{Json, Router};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use studio_api::config::{ProviderConfig, ServerConfig};
use studio_api::router::build_app_router;
use studio_api::state::AppState;

pub const LEONARDO_KEY: &str = "leo-test-key";
pub const OPENAI_KEY: &str = "openai-test-key";

/// Build a test `ServerConfig` pointing both providers at `upstream_url`.
///
/// Uses `http://localhost:5173` as CORS origin (matching the dev default)
/// and a 30-second request timeout.
pub fn test_config(upstream_url: &str, with_keys: bool) -> ServerConfig {
    let key = |k: &str| with_keys.then(|| k.to_string());
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        leonardo: ProviderConfig::new(format!("{upstream_url}/leonardo"), key(LEONARDO_KEY)),
        openai: ProviderConfig::new(format!("{upstream_url}/openai"), key(OPENAI_KEY)),
    }
}

/// Build the full application router with the production middleware stack.
pub fn build_test_app(config: ServerConfig) -> Router {
    let state = AppState::new(config.clone());
    build_app_router(state, &config)
}

/// App whose providers have no keys and an unroutable upstream.
pub fn unconfigured_app() -> Router {
    build_test_app(test_config("http://127.0.0.1:1", false))
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub async fn get(app: Router, uri: &str) -> Response {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn post_json(app: Router, uri: &str, body: Value) -> Response {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn body_json(response: Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

pub async fn body_text(response: Response) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

// ---------------------------------------------------------------------------
// Mock upstream providers
// ---------------------------------------------------------------------------

/// A request received by the mock upstream.
#[derive(Debug, Clone)]
pub struct Recorded {
    pub path: String,
    pub authorization: Option<String>,
    pub body: Value,
}

/// What the mock upstream answers with.
#[derive(Clone)]
pub enum UpstreamMode {
    Ok,
    Error(StatusCode, Value),
    /// Succeed, but only after the given delay.
    Slow(Duration),
}

#[derive(Clone)]
struct Upstream {
    mode: UpstreamMode,
    recorded: Arc<Mutex<Vec<Recorded>>>,
}

impl Upstream {
    fn record(&self, path: String, headers: &HeaderMap, body: Value) {
        let authorization = headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        self.recorded.lock().unwrap().push(Recorded {
            path,
            authorization,
            body,
        });
    }

    async fn reply(&self, ok: Value) -> Response {
        match &self.mode {
            UpstreamMode::Ok => Json(ok).into_response(),
            UpstreamMode::Slow(delay) => {
                tokio::time::sleep(*delay).await;
                Json(ok).into_response()
            }
            UpstreamMode::Error(status, body) => (*status, Json(body.clone())).into_response(),
        }
    }
}

async fn leonardo_create(
    State(upstream): State<Upstream>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    upstream.record("/leonardo/generations".into(), &headers, body);
    upstream
        .reply(json!({"sdGenerationJob": {"generationId": "gen-123", "apiCreditCost": 8}}))
        .await
}

async fn leonardo_get(
    State(upstream): State<Upstream>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Response {
    upstream.record(format!("/leonardo/generations/{id}"), &headers, Value::Null);
    upstream.reply(json!({"generations_by_pk": {
        "id": id,
        "status": "COMPLETE",
        "generated_images": [{"id": "img-1", "url": "https://cdn.test/1.png"}]
    }}))
    .await
}

async fn openai_chat(
    State(upstream): State<Upstream>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    upstream.record("/openai/chat/completions".into(), &headers, body);
    upstream.reply(json!({
        "id": "chatcmpl-1",
        "choices": [{"index": 0, "message": {"role": "assistant", "content": "Once upon a time."}}]
    }))
    .await
}

/// Serve a fake Leonardo/OpenAI pair on an ephemeral port.
///
/// Returns the base URL and the log of received requests.
pub async fn spawn_upstream(mode: UpstreamMode) -> (String, Arc<Mutex<Vec<Recorded>>>) {
    let recorded = Arc::new(Mutex::new(Vec::new()));
    let upstream = Upstream {
        mode,
        recorded: Arc::clone(&recorded),
    };
    let router = Router::new()
        .route("/leonardo/generations", post(leonardo_create))
        .route("/leonardo/generations/{id}", route_get(leonardo_get))
        .route("/openai/chat/completions", post(openai_chat))
        .with_state(upstream);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    (format!("http://{addr}"), recorded)
}

/// App wired to a freshly spawned upstream.
pub async fn app_with_upstream(mode: UpstreamMode) -> (Router, Arc<Mutex<Vec<Recorded>>>) {
    let (url, recorded) = spawn_upstream(mode).await;
    (build_test_app(test_config(&url, true)), recorded)
}
