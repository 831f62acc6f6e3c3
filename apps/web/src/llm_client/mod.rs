/// LLM Client — the single point of entry for all completion calls in Deckforge.
///
/// ARCHITECTURAL RULE: No other module may call the completion API directly.
/// All LLM interactions MUST go through this module.
///
/// Speaks the OpenAI-style chat completions protocol (OpenRouter by default).
/// One attempt per request, bounded by `REQUEST_TIMEOUT`; there is no retry.
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::Config;
use crate::generation::generator::OutlineSource;

pub mod prompts;

const MAX_TOKENS: u32 = 1500;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(18);
/// Upstream error bodies are cut to this many characters before reaching the user.
const ERROR_BODY_LIMIT: usize = 800;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("No API key set. Set OPENROUTER_KEY environment variable.")]
    MissingApiKey,

    #[error("API request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error: {status}")]
    Api { status: u16, body: String },

    #[error("Response parse error: {0}")]
    Parse(String),

    #[error("Response parse error: completion has no message content")]
    EmptyContent,
}

impl LlmError {
    /// The bullet lines shown on the synthetic error slide for this failure.
    pub fn error_details(&self) -> Vec<String> {
        match self {
            LlmError::Api { body, .. } => {
                vec![self.to_string(), truncate_chars(body, ERROR_BODY_LIMIT)]
            }
            _ => vec![self.to_string()],
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct ChatResponse {
    pub choices: Vec<Choice>,
    pub usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
pub struct Choice {
    pub message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
pub struct ResponseMessage {
    pub content: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
}

impl ChatResponse {
    /// Text at `choices[0].message.content`.
    pub fn text(&self) -> Result<&str, LlmError> {
        let choice = self
            .choices
            .first()
            .ok_or_else(|| LlmError::Parse("response has no choices".to_string()))?;
        choice
            .message
            .content
            .as_deref()
            .ok_or(LlmError::EmptyContent)
    }
}

/// The single LLM client used by the generation pipeline.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    api_url: String,
    api_key: Option<String>,
    model: String,
}

impl LlmClient {
    pub fn new(api_url: String, api_key: Option<String>, model: String) -> Result<Self, LlmError> {
        Ok(Self {
            client: Client::builder().timeout(REQUEST_TIMEOUT).build()?,
            api_url,
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            model,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, LlmError> {
        Self::new(
            config.openrouter_url.clone(),
            config.openrouter_key.clone(),
            config.model.clone(),
        )
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// Makes one call to the completion API and returns the full response object.
    pub async fn call(&self, prompt: &str) -> Result<ChatResponse, LlmError> {
        let api_key = self.api_key.as_deref().ok_or(LlmError::MissingApiKey)?;

        let request_body = ChatRequest {
            model: &self.model,
            max_tokens: MAX_TOKENS,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
        };

        let response = self
            .client
            .post(&self.api_url)
            .bearer_auth(api_key)
            .header("content-type", "application/json")
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if status.as_u16() != 200 {
            warn!("Completion API returned {}: {}", status, truncate_chars(&body, 200));
            return Err(LlmError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let chat: ChatResponse =
            serde_json::from_str(&body).map_err(|e| LlmError::Parse(e.to_string()))?;

        if let Some(usage) = &chat.usage {
            debug!(
                "Completion succeeded: prompt_tokens={}, completion_tokens={}",
                usage.prompt_tokens, usage.completion_tokens
            );
        }

        Ok(chat)
    }

    /// Calls the API and returns only the generated text.
    pub async fn complete(&self, prompt: &str) -> Result<String, LlmError> {
        let response = self.call(prompt).await?;
        response.text().map(str::to_string)
    }
}

#[async_trait]
impl OutlineSource for LlmClient {
    async fn outline(&self, topic: &str) -> Result<String, LlmError> {
        self.complete(&prompts::outline_prompt(topic)).await
    }
}

fn truncate_chars(text: &str, limit: usize) -> String {
    text.chars().take(limit).collect()
}
