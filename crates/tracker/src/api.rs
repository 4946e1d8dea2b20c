//! Remote job API: the submit / poll / story boundary the tracker depends on.
//!
//! [`JobApi`] is the seam; [`HttpJobApi`] implements it against the Prompt
//! Studio proxy using [`reqwest`].

use std::time::Duration;

use async_trait::async_trait;
use studio_core::generation::GenerationRequest;
use studio_core::story::StoryRequest;
use studio_core::types::JobId;

use crate::messages::{self, JobSnapshot, CONFIGURATION_ERROR_CODE};

/// Submit a generation, poll it by id, and request stories.
#[async_trait]
pub trait JobApi: Send + Sync {
    /// Start a generation job. Returns the provider-assigned job id.
    async fn submit(&self, request: &GenerationRequest) -> Result<JobId, JobApiError>;

    /// Fetch the current status (and assets, once complete) of a job.
    async fn poll(&self, job_id: &JobId) -> Result<JobSnapshot, JobApiError>;

    /// Generate a story in a single request/response exchange.
    async fn generate_story(&self, request: &StoryRequest) -> Result<String, JobApiError>;
}

/// Errors from the remote job API layer.
#[derive(Debug, thiserror::Error)]
pub enum JobApiError {
    /// The HTTP request itself failed (network, DNS, TLS, timeout).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The proxy or provider answered with a non-2xx status.
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Upstream credentials are not configured.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A 2xx response whose body could not be understood.
    #[error("Invalid response: {0}")]
    Decode(String),
}

impl JobApiError {
    /// The message shown to users: the proxy's own error text where one was
    /// returned, otherwise the transport description.
    pub fn user_message(&self) -> String {
        match self {
            JobApiError::Request(e) => e.to_string(),
            JobApiError::Api { message, .. } => message.clone(),
            JobApiError::Configuration(message) => message.clone(),
            JobApiError::Decode(message) => message.clone(),
        }
    }
}

/// HTTP client for the Prompt Studio proxy.
pub struct HttpJobApi {
    client: reqwest::Client,
    base_url: String,
}

impl HttpJobApi {
    /// Create a client for the proxy at `base_url`, e.g.
    /// `http://localhost:3001/api`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    /// Create a client whose requests give up after `timeout`.
    pub fn with_timeout(
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, JobApiError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(client, base_url))
    }

    /// Reuse an existing [`reqwest::Client`] (connection pooling).
    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // ---- private helpers ----

    /// Return the response body on a success status, or map the error
    /// envelope to a [`JobApiError`].
    async fn read_body(response: reqwest::Response) -> Result<String, JobApiError> {
        let status = response.status();
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "<unreadable body>".to_string());

        if status.is_success() {
            return Ok(body);
        }
        Err(error_from_body(status.as_u16(), &body))
    }
}

/// Classify a non-2xx response body.
fn error_from_body(status: u16, body: &str) -> JobApiError {
    match messages::parse_error_body(body) {
        Some(envelope) if envelope.code.as_deref() == Some(CONFIGURATION_ERROR_CODE) => {
            JobApiError::Configuration(envelope.error)
        }
        Some(envelope) => JobApiError::Api {
            status,
            message: envelope.error,
        },
        None if body.trim().is_empty() => JobApiError::Api {
            status,
            message: format!("Request failed with status code {status}"),
        },
        None => JobApiError::Api {
            status,
            message: body.to_string(),
        },
    }
}

#[async_trait]
impl JobApi for HttpJobApi {
    async fn submit(&self, request: &GenerationRequest) -> Result<JobId, JobApiError> {
        let response = self
            .client
            .post(format!("{}/generations", self.base_url))
            .json(request)
            .send()
            .await?;

        let body = Self::read_body(response).await?;
        let job_id = messages::parse_submit_response(&body).map_err(JobApiError::Decode)?;

        tracing::debug!(job_id = %job_id, "Generation submitted");
        Ok(job_id)
    }

    async fn poll(&self, job_id: &JobId) -> Result<JobSnapshot, JobApiError> {
        let response = self
            .client
            .get(format!("{}/generations/{}", self.base_url, job_id))
            .send()
            .await?;

        let body = Self::read_body(response).await?;
        messages::parse_poll_response(&body).map_err(JobApiError::Decode)
    }

    async fn generate_story(&self, request: &StoryRequest) -> Result<String, JobApiError> {
        let response = self
            .client
            .post(format!("{}/story", self.base_url))
            .json(request)
            .send()
            .await?;

        let body = Self::read_body(response).await?;
        messages::parse_story_response(&body).map_err(JobApiError::Decode)
    }
}
