//! Story generation request and the chat prompt built from it.

use serde::{Deserialize, Serialize};

use crate::catalog::{self, CHANNELS, DEFAULT_CHAT_MODEL_ID, HEROES};
use crate::error::CoreError;

/// A single request/response story generation. No polling is involved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoryRequest {
    /// Missing is treated like empty so validation can report it.
    #[serde(default)]
    pub prompt: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hero: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel: Option<String>,
    /// Product image as a data URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_image: Option<String>,
}

fn default_model() -> String {
    DEFAULT_CHAT_MODEL_ID.to_string()
}

/// Successful story response body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoryResponse {
    pub story: String,
}

impl StoryRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            model: default_model(),
            hero: None,
            channel: None,
            product_image: None,
        }
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        if self.prompt.trim().is_empty() {
            return Err(CoreError::Validation("Prompt is required.".to_string()));
        }
        if self.model.trim().is_empty() {
            return Err(CoreError::Validation("Model is required.".to_string()));
        }
        Ok(())
    }

    /// System instruction for the chat model, naming the selected hero and
    /// publishing channel.
    pub fn system_prompt(&self) -> String {
        let mut instruction = String::from(
            "You are a creative writer producing short stories for animated social media content.",
        );
        if let Some(hero) = &self.hero {
            instruction.push_str(&format!(
                " The main character is {}.",
                catalog::display_name(HEROES, hero)
            ));
        }
        if let Some(channel) = &self.channel {
            instruction.push_str(&format!(
                " Tailor the length and tone for {}.",
                catalog::display_name(CHANNELS, channel)
            ));
        }
        if self.product_image.is_some() {
            instruction.push_str(" Feature the product shown in the attached image.");
        }
        instruction
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_with_defaults() {
        let request: StoryRequest = serde_json::from_str(r#"{"prompt":"a knight"}"#).unwrap();
        assert_eq!(request.model, DEFAULT_CHAT_MODEL_ID);
        assert!(request.hero.is_none());
    }

    #[test]
    fn product_image_uses_camel_case() {
        let mut request = StoryRequest::new("a knight");
        request.product_image = Some("data:image/png;base64,AAAA".into());
        let value = serde_json::to_value(&request).unwrap();
        assert!(value.get("productImage").is_some());
    }

    #[test]
    fn blank_prompt_rejected() {
        assert!(StoryRequest::new(" ").validate().is_err());
        assert!(StoryRequest::new("a knight").validate().is_ok());
    }

    #[test]
    fn system_prompt_names_selections() {
        let mut request = StoryRequest::new("a knight");
        request.hero = Some("hero2".into());
        request.channel = Some("youtube".into());
        let prompt = request.system_prompt();
        assert!(prompt.contains("Hero 2"));
        assert!(prompt.contains("YouTube"));
        assert!(!prompt.contains("attached image"));
    }
}
