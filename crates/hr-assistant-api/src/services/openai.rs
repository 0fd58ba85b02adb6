use crate::config::OpenAiConfig;
use crate::utils::error::ApiError;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Serialize, Clone)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    format_type: String,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Message,
}

#[derive(Debug, Deserialize)]
struct Message {
    content: Option<String>,
}

/// The two call shapes the assistant core needs from the completion endpoint:
/// free-form chat and a JSON-object completion. Trait seam so the services on
/// top can be tested without a network.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Whether a credential is configured at all.
    fn is_configured(&self) -> bool;

    /// One synchronous chat completion. `Ok(None)` means the model returned
    /// a choice with no content.
    async fn chat_completion(
        &self,
        system: &str,
        user: &str,
        max_tokens: u32,
    ) -> Result<Option<String>, ApiError>;

    /// Chat completion with `response_format = json_object`, parsed as JSON.
    async fn json_completion(
        &self,
        system: &str,
        user: &str,
        max_tokens: u32,
    ) -> Result<serde_json::Value, ApiError>;
}

#[derive(Clone)]
pub struct OpenAiService {
    client: Client,
    config: OpenAiConfig,
}

impl OpenAiService {
    pub fn new(config: OpenAiConfig) -> Self {
        Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(config.timeout_seconds))
                .build()
                .unwrap_or_else(|_| Client::new()),
            config,
        }
    }

    async fn complete(
        &self,
        system: &str,
        user: &str,
        max_tokens: u32,
        json_response: bool,
    ) -> Result<Option<String>, ApiError> {
        if !self.is_configured() {
            return Err(ApiError::LlmNotConfigured(
                "OpenAI API key is not configured. Please add your OPENAI_API_KEY to use the AI Assistant.".to_string(),
            ));
        }

        let request = ChatCompletionRequest {
            model: self.config.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: system.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: user.to_string(),
                },
            ],
            max_tokens,
            response_format: json_response.then(|| ResponseFormat {
                format_type: "json_object".to_string(),
            }),
        };

        debug!("Calling chat completion (model={})", self.config.model);

        let response = self
            .client
            .post(format!("{}/v1/chat/completions", self.config.base_url))
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .json(&request)
            .send()
            .await
            .map_err(|e| ApiError::LlmError(format!("Failed to call LLM API: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::LlmError(format!(
                "LLM API error: {} - {}",
                status, body
            )));
        }

        let chat_response: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| ApiError::LlmError(format!("Failed to parse LLM response: {}", e)))?;

        chat_response
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| ApiError::LlmError("No choices returned from LLM".to_string()))
    }
}

#[async_trait]
impl CompletionClient for OpenAiService {
    fn is_configured(&self) -> bool {
        !self.config.api_key.trim().is_empty()
    }

    async fn chat_completion(
        &self,
        system: &str,
        user: &str,
        max_tokens: u32,
    ) -> Result<Option<String>, ApiError> {
        self.complete(system, user, max_tokens, false).await
    }

    async fn json_completion(
        &self,
        system: &str,
        user: &str,
        max_tokens: u32,
    ) -> Result<serde_json::Value, ApiError> {
        let content = self
            .complete(system, user, max_tokens, true)
            .await?
            .unwrap_or_else(|| r#"{"chunks": []}"#.to_string());

        serde_json::from_str(&content)
            .map_err(|e| ApiError::LlmError(format!("Failed to parse JSON completion: {}", e)))
    }
}
