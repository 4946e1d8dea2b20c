//! Application router shared by `main.rs` and the integration tests.
//!
//! Two route groups:
//!
//! - `/health`, answered locally;
//! - `/api/*`, forwarded to the image and story providers and bounded by
//!   the configured request timeout.
//!
//! Every response goes through the same request-id, tracing and panic
//! handling, with CORS outermost.

use std::time::Duration;

use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderName, HeaderValue, Method, StatusCode};
use axum::Router;
use tower::ServiceBuilder;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use crate::config::ServerConfig;
use crate::routes;
use crate::state::AppState;

/// Header carrying the per-request id, generated when the client sends none.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Build the proxy [`Router`].
pub fn build_app_router(state: AppState, config: &ServerConfig) -> Router {
    let proxied = routes::api_routes().layer(upstream_timeout(config.request_timeout_secs));

    let app = Router::new()
        .merge(routes::health::router())
        .nest("/api", proxied)
        .with_state(state);

    with_request_handling(app).layer(build_cors_layer(config))
}

/// Provider calls that outlive `secs` are answered with 504.
fn upstream_timeout(secs: u64) -> TimeoutLayer {
    TimeoutLayer::with_status_code(StatusCode::GATEWAY_TIMEOUT, Duration::from_secs(secs))
}

/// Request ids, access logs and panic recovery, outermost first.
fn with_request_handling(app: Router) -> Router {
    let request_id = HeaderName::from_static(REQUEST_ID_HEADER);
    let access_log = TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_response(DefaultOnResponse::new().level(Level::INFO));

    app.layer(
        ServiceBuilder::new()
            .layer(SetRequestIdLayer::new(request_id.clone(), MakeRequestUuid))
            .layer(access_log)
            .layer(PropagateRequestIdLayer::new(request_id))
            .layer(CatchPanicLayer::new()),
    )
}

/// CORS for the configured front-end origins.
///
/// Origins that are not valid header values are skipped with a warning.
pub fn build_cors_layer(config: &ServerConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(origin = %origin, error = %e, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
        .allow_credentials(true)
        .max_age(Duration::from_secs(3600))
}
