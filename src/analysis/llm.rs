//! Chat-completion client for the language model

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::debug;

use super::prompt::PairPrompt;
use crate::config::LlmConfig;
use crate::errors::{LlmError, LlmResult};

/// Anything that can answer a comparison prompt with raw text
#[async_trait]
pub trait LanguageModel: Send + Sync {
    async fn complete(&self, prompt: &PairPrompt) -> LlmResult<String>;
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

/// OpenAI-compatible `/chat/completions` client
pub struct OpenAiClient {
    client: Client,
    config: LlmConfig,
}

impl OpenAiClient {
    pub fn new(config: LlmConfig) -> LlmResult<Self> {
        url::Url::parse(&config.base_url).map_err(|e| {
            LlmError::ConfigError(format!("invalid base_url '{}': {e}", config.base_url))
        })?;

        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| LlmError::ConfigError(e.to_string()))?;

        Ok(Self { client, config })
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), endpoint)
    }

    /// Model and request body for a prompt; images switch to the vision model
    fn request_body(&self, prompt: &PairPrompt) -> Value {
        let (model, user_content) = if prompt.has_images() {
            let mut parts = vec![json!({"type": "text", "text": prompt.user})];
            parts.extend(
                prompt
                    .images
                    .iter()
                    .map(|url| json!({"type": "image_url", "image_url": {"url": url}})),
            );
            (&self.config.vision_model, Value::Array(parts))
        } else {
            (&self.config.model, Value::String(prompt.user.clone()))
        };

        json!({
            "model": model,
            "messages": [
                {"role": "system", "content": prompt.system},
                {"role": "user", "content": user_content},
            ],
            "temperature": self.config.temperature,
            "max_tokens": self.config.max_tokens,
        })
    }

    async fn check_response(&self, response: Response) -> LlmResult<Response> {
        if response.status().is_success() {
            return Ok(response);
        }

        let status = response.status().as_u16();
        let message = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());

        // Prefer the structured error message when there is one
        let message = serde_json::from_str::<Value>(&message)
            .ok()
            .and_then(|v| v["error"]["message"].as_str().map(String::from))
            .unwrap_or(message);

        Err(LlmError::ApiError { status, message })
    }
}

#[async_trait]
impl LanguageModel for OpenAiClient {
    async fn complete(&self, prompt: &PairPrompt) -> LlmResult<String> {
        if self.config.api_key.trim().is_empty() {
            return Err(LlmError::MissingCredential);
        }

        let body = self.request_body(prompt);
        debug!(
            "Requesting completion from {} ({} image(s))",
            body["model"],
            prompt.images.len()
        );

        let response = self
            .client
            .post(self.url("/chat/completions"))
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await?;
        let response = self.check_response(response).await?;

        let completion: ChatCompletionResponse = response.json().await?;
        completion
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .map(|content| content.trim().to_string())
            .filter(|content| !content.is_empty())
            .ok_or(LlmError::EmptyResponse)
    }
}
