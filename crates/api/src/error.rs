use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::{json, Value};
use studio_core::error::CoreError;

use crate::providers::ProviderError;

/// Error code for missing provider credentials.
pub const CONFIGURATION_ERROR: &str = "CONFIGURATION_ERROR";
/// Error code for malformed client requests.
pub const VALIDATION_ERROR: &str = "VALIDATION_ERROR";
/// Error code for provider failures.
pub const UPSTREAM_ERROR: &str = "UPSTREAM_ERROR";

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] for domain errors and [`ProviderError`] for upstream
/// failures. Implements [`IntoResponse`] to produce consistent JSON error
/// responses of the form `{ "error", "code", "details"? }`.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `studio_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// An upstream provider call failed while doing `context`.
    #[error("{context}: {source}")]
    Provider {
        /// User-facing summary, e.g. "Failed to start image generation".
        context: &'static str,
        #[source]
        source: ProviderError,
    },
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    /// Adapter for `map_err` that tags a provider failure with `context`.
    pub fn provider(context: &'static str) -> impl FnOnce(ProviderError) -> AppError {
        move |source| AppError::Provider { context, source }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message, details) = match &self {
            // --- CoreError variants ---
            AppError::Core(core) => match core {
                CoreError::Validation(msg) => {
                    (StatusCode::BAD_REQUEST, VALIDATION_ERROR, msg.clone(), None)
                }
                CoreError::Configuration(msg) => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    CONFIGURATION_ERROR,
                    msg.clone(),
                    None,
                ),
            },

            // --- Provider errors ---
            AppError::Provider { context, source } => classify_provider_error(context, source),
        };

        let mut body = json!({
            "error": message,
            "code": code,
        });
        if let Some(details) = details {
            body["details"] = details;
        }

        (status, axum::Json(body)).into_response()
    }
}

/// Classify a provider error into an HTTP status, error code, message and
/// details.
///
/// - Missing credentials map to 500 `CONFIGURATION_ERROR`.
/// - Provider error statuses are passed through with the provider body as
///   details.
/// - Requests that never reached the provider map to 500.
fn classify_provider_error(
    context: &str,
    err: &ProviderError,
) -> (StatusCode, &'static str, String, Option<Value>) {
    match err {
        ProviderError::MissingApiKey(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            CONFIGURATION_ERROR,
            err.to_string(),
            None,
        ),
        ProviderError::ApiError { status, body } => {
            tracing::warn!(status, context, "Provider returned an error");
            let status =
                StatusCode::from_u16(*status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            (status, UPSTREAM_ERROR, context.to_string(), Some(body.clone()))
        }
        ProviderError::Request(e) => {
            tracing::error!(error = %e, context, "Provider request failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                UPSTREAM_ERROR,
                context.to_string(),
                Some(Value::String(e.to_string())),
            )
        }
        ProviderError::InvalidResponse(msg) => {
            tracing::error!(error = %msg, context, "Provider response unusable");
            (
                StatusCode::BAD_GATEWAY,
                UPSTREAM_ERROR,
                context.to_string(),
                Some(Value::String(msg.clone())),
            )
        }
    }
}
