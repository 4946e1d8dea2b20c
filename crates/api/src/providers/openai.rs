//! OpenAI chat completion client used for story generation.

use serde::Deserialize;
use serde_json::{json, Value};
use studio_core::story::StoryRequest;

use super::{parse_response, ProviderError};
use crate::config::ProviderConfig;

pub const PROVIDER_NAME: &str = "OpenAI";

/// HTTP client for the OpenAI chat completions endpoint.
pub struct OpenAiClient {
    client: reqwest::Client,
    api_url: String,
    api_key: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatCompletion {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: Option<String>,
}

impl OpenAiClient {
    pub fn new(config: &ProviderConfig) -> Self {
        Self::with_client(reqwest::Client::new(), config)
    }

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

    pub fn ensure_configured(&self) -> Result<&str, ProviderError> {
        self.api_key
            .as_deref()
            .ok_or(ProviderError::MissingApiKey(PROVIDER_NAME))
    }

    /// Generate a story with one `POST /chat/completions` call and return
    /// the first choice's text.
    pub async fn generate_story(&self, request: &StoryRequest) -> Result<String, ProviderError> {
        let api_key = self.ensure_configured()?;
        let response = self
            .client
            .post(format!("{}/chat/completions", self.api_url))
            .bearer_auth(api_key)
            .json(&chat_body(request))
            .send()
            .await?;

        let completion: ChatCompletion = parse_response(response).await?;
        story_text(completion)
    }
}

/// Chat completion request body. The product image, when present, is sent
/// as an image part of the user message.
fn chat_body(request: &StoryRequest) -> Value {
    let user_content = match &request.product_image {
        Some(image) => json!([
            { "type": "text", "text": request.prompt },
            { "type": "image_url", "image_url": { "url": image } },
        ]),
        None => Value::String(request.prompt.clone()),
    };

    json!({
        "model": request.model,
        "messages": [
            { "role": "system", "content": request.system_prompt() },
            { "role": "user", "content": user_content },
        ],
    })
}

fn story_text(completion: ChatCompletion) -> Result<String, ProviderError> {
    completion
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
        .ok_or_else(|| ProviderError::InvalidResponse("no story text in completion".to_string()))
}
