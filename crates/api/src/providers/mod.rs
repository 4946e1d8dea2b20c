//! HTTP clients for the upstream AI providers.
//!
//! Both clients hold the provider credential on the server side only;
//! browsers and the CLI never see it.

pub mod leonardo;
pub mod openai;

use serde_json::Value;

/// Errors from an upstream provider call.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// The provider's API key is not set.
    #[error("API key for {0} is not configured.")]
    MissingApiKey(&'static str),

    /// The HTTP request itself failed (network, DNS, TLS, timeout).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The provider answered with a non-2xx status.
    #[error("Provider API error ({status}): {body}")]
    ApiError {
        status: u16,
        /// Provider body, parsed as JSON when possible.
        body: Value,
    },

    /// A 2xx response that did not have the expected shape.
    #[error("Invalid provider response: {0}")]
    InvalidResponse(String),
}

// ---- private helpers ----

/// Ensure the response has a success status code, otherwise capture the
/// status and body in [`ProviderError::ApiError`].
async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, ProviderError> {
    let status = response.status();
    if !status.is_success() {
        let text = response
            .text()
            .await
            .unwrap_or_else(|_| "<unreadable body>".to_string());
        let body = serde_json::from_str(&text).unwrap_or(Value::String(text));
        return Err(ProviderError::ApiError {
            status: status.as_u16(),
            body,
        });
    }
    Ok(response)
}

/// Parse a successful JSON response body into the expected type.
async fn parse_response<T: serde::de::DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, ProviderError> {
    let response = ensure_success(response).await?;
    Ok(response.json::<T>().await?)
}
