use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::LlmConfig;
use crate::models::{SiteDraft, SiteRequest};
use crate::{ForgeError, ForgeResult};

use super::prompts::PromptBuilder;

/// Abstraction over the chat-completion backend so the orchestrator can be
/// exercised against fakes in tests.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    /// Produce a site draft for one request. A single outbound call; no state
    /// is retained between invocations.
    async fn generate_site(&self, request: &SiteRequest) -> ForgeResult<SiteDraft>;
}

/// Production backend talking to an OpenAI-compatible chat-completion endpoint
pub struct OpenAiClient {
    http: reqwest::Client,
    endpoint: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
    api_key: String,
}

impl OpenAiClient {
    /// Build the client from configuration. A missing API credential is fatal
    /// here, at startup, rather than surfacing on the first request.
    pub fn new(config: &LlmConfig) -> ForgeResult<Self> {
        let api_key = std::env::var(&config.api_key_env).map_err(|_| {
            ForgeError::configuration(format!(
                "{} is not set in the environment",
                config.api_key_env
            ))
        })?;

        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout))
            .build()
            .map_err(|e| ForgeError::configuration(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            endpoint: config.endpoint.clone(),
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            api_key,
        })
    }
}

#[async_trait]
impl CompletionBackend for OpenAiClient {
    async fn generate_site(&self, request: &SiteRequest) -> ForgeResult<SiteDraft> {
        let body = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: PromptBuilder::system_prompt(),
                },
                ChatMessage {
                    role: "user",
                    content: PromptBuilder::generation_prompt(request),
                },
            ],
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            response_format: ResponseFormat {
                format_type: "json_object",
            },
        };

        debug!("Requesting site draft for '{}'", request.site_name);

        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                ForgeError::upstream(
                    format!("Chat completion request failed: {}", e),
                    Some(self.endpoint.clone()),
                )
            })?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(ForgeError::upstream(
                format!("Chat completion returned {}: {}", status, detail),
                Some(self.endpoint.clone()),
            ));
        }

        let reply: ChatResponse = response.json().await.map_err(|e| {
            ForgeError::upstream(
                format!("Chat completion reply was not valid JSON: {}", e),
                Some(self.endpoint.clone()),
            )
        })?;

        let content = reply
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| {
                ForgeError::upstream("Chat completion reply had no choices".to_string(), None)
            })?;

        let draft = parse_draft(&content)?;
        info!("Received site draft for '{}'", request.site_name);

        Ok(draft)
    }
}

/// Parse the model's free-form message content into the expected draft shape
pub fn parse_draft(content: &str) -> ForgeResult<SiteDraft> {
    serde_json::from_str(content.trim()).map_err(|e| {
        ForgeError::upstream(
            format!("Failed to parse generation reply as JSON: {}", e),
            None,
        )
    })
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
    response_format: ResponseFormat<'a>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: String,
}

#[derive(Debug, Serialize)]
struct ResponseFormat<'a> {
    #[serde(rename = "type")]
    format_type: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatReplyMessage,
}

#[derive(Debug, Deserialize)]
struct ChatReplyMessage {
    content: String,
}
