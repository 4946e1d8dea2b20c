//! Leonardo.ai image generation client.
//!
//! Request and response bodies are passed through as raw JSON: the proxy
//! only adds credentials and defaults.

use serde_json::{Map, Value};

use super::{parse_response, ProviderError};
use crate::config::ProviderConfig;

pub const PROVIDER_NAME: &str = "Leonardo.ai";

/// HTTP client for the Leonardo.ai REST API.
pub struct LeonardoClient {
    client: reqwest::Client,
    api_url: String,
    api_key: Option<String>,
}

impl LeonardoClient {
    pub fn new(config: &ProviderConfig) -> Self {
        Self::with_client(reqwest::Client::new(), config)
    }

    /// Create a client reusing an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client, config: &ProviderConfig) -> Self {
        Self {
            client,
            api_url: config.api_url.clone(),
            api_key: config.api_key.clone(),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    /// The API key, or [`ProviderError::MissingApiKey`].
    pub fn ensure_configured(&self) -> Result<&str, ProviderError> {
        self.api_key
            .as_deref()
            .ok_or(ProviderError::MissingApiKey(PROVIDER_NAME))
    }

    /// Start a generation. Sends `POST /generations` and returns the
    /// provider's response (containing `sdGenerationJob.generationId`).
    pub async fn create_generation(
        &self,
        payload: &Map<String, Value>,
    ) -> Result<Value, ProviderError> {
        let api_key = self.ensure_configured()?;
        let response = self
            .client
            .post(format!("{}/generations", self.api_url))
            .bearer_auth(api_key)
            .json(payload)
            .send()
            .await?;

        parse_response(response).await
    }

    /// Fetch a generation by id. Sends `GET /generations/{id}` and returns
    /// the provider's response (containing `generations_by_pk`).
    pub async fn get_generation(&self, generation_id: &str) -> Result<Value, ProviderError> {
        let api_key = self.ensure_configured()?;
        let response = self
            .client
            .get(format!("{}/generations/{}", self.api_url, generation_id))
            .bearer_auth(api_key)
            .send()
            .await?;

        parse_response(response).await
    }
}
