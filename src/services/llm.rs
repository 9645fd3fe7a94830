//! Text-generation clients.
//!
//! Every call site talks to a [`TextGenerator`]; which backend answers is a
//! deployment decision (`LLM_PROVIDER`). Callers treat generation as slow
//! and unreliable and decide their own fallback.

use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;

use crate::config::Config;

#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("provider returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("malformed provider response: {0}")]
    Malformed(String),

    #[error("provider returned no text")]
    EmptyResponse,
}

/// A single-turn request to the model.
#[derive(Debug, Clone, Default)]
pub struct Prompt {
    pub system: String,
    pub user: String,
    pub max_tokens: u32,
    /// Ask the backend to constrain output to a JSON object.
    pub json_output: bool,
}

impl Prompt {
    pub fn new(system: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            system: system.into(),
            user: user.into(),
            max_tokens: 1024,
            json_output: false,
        }
    }

    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn json(mut self) -> Self {
        self.json_output = true;
        self
    }
}

#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &Prompt) -> Result<String, LlmError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LlmProvider {
    Anthropic,
    Ollama,
}

impl FromStr for LlmProvider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "anthropic" | "claude" => Ok(LlmProvider::Anthropic),
            "ollama" => Ok(LlmProvider::Ollama),
            other => Err(format!("unknown LLM provider '{}'", other)),
        }
    }
}

fn http_client(timeout_secs: u64) -> Result<reqwest::Client, LlmError> {
    Ok(reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()?)
}

async fn error_for_status(response: reqwest::Response) -> Result<reqwest::Response, LlmError> {
    if response.status().is_success() {
        return Ok(response);
    }
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    Err(LlmError::Status { status, body })
}

/// Anthropic Messages API.
pub struct AnthropicClient {
    http: reqwest::Client,
    api_key: String,
    model: String,
}

impl AnthropicClient {
    const ENDPOINT: &'static str = "https://api.anthropic.com/v1/messages";

    pub fn new(api_key: String, model: String, timeout_secs: u64) -> Result<Self, LlmError> {
        Ok(Self {
            http: http_client(timeout_secs)?,
            api_key,
            model,
        })
    }
}

#[async_trait]
impl TextGenerator for AnthropicClient {
    async fn generate(&self, prompt: &Prompt) -> Result<String, LlmError> {
        let response = self
            .http
            .post(Self::ENDPOINT)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", "2023-06-01")
            .header("content-type", "application/json")
            .json(&json!({
                "model": self.model,
                "max_tokens": prompt.max_tokens,
                "system": prompt.system,
                "messages": [{
                    "role": "user",
                    "content": prompt.user
                }]
            }))
            .send()
            .await?;

        let body: serde_json::Value = error_for_status(response).await?.json().await?;
        let text = body["content"][0]["text"]
            .as_str()
            .ok_or_else(|| LlmError::Malformed("missing content[0].text".into()))?;

        non_empty(text)
    }
}

/// Local Ollama server, `/api/chat` endpoint.
pub struct OllamaClient {
    http: reqwest::Client,
    base_url: String,
    model: String,
}

impl OllamaClient {
    pub fn new(base_url: String, model: String, timeout_secs: u64) -> Result<Self, LlmError> {
        Ok(Self {
            http: http_client(timeout_secs)?,
            base_url: base_url.trim_end_matches('/').to_string(),
            model,
        })
    }
}

#[async_trait]
impl TextGenerator for OllamaClient {
    async fn generate(&self, prompt: &Prompt) -> Result<String, LlmError> {
        let mut request = json!({
            "model": self.model,
            "stream": false,
            "messages": [
                { "role": "system", "content": prompt.system },
                { "role": "user", "content": prompt.user }
            ],
            "options": { "num_predict": prompt.max_tokens }
        });
        if prompt.json_output {
            request["format"] = json!("json");
        }

        let response = self
            .http
            .post(format!("{}/api/chat", self.base_url))
            .json(&request)
            .send()
            .await?;

        let body: serde_json::Value = error_for_status(response).await?.json().await?;
        let text = body["message"]["content"]
            .as_str()
            .ok_or_else(|| LlmError::Malformed("missing message.content".into()))?;

        non_empty(text)
    }
}

fn non_empty(text: &str) -> Result<String, LlmError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(LlmError::EmptyResponse);
    }
    Ok(text.to_string())
}

/// Generators per feature. With Ollama the chatbot and the diary run
/// different local models; Anthropic serves every feature from one client.
#[derive(Clone)]
pub struct Generators {
    pub chat: Arc<dyn TextGenerator>,
    pub diary: Arc<dyn TextGenerator>,
    pub documents: Arc<dyn TextGenerator>,
}

impl Generators {
    pub fn from_config(config: &Config) -> Result<Self, LlmError> {
        let timeout = config.llm_timeout_secs;
        match config.llm_provider {
            LlmProvider::Anthropic => {
                let client: Arc<dyn TextGenerator> = Arc::new(AnthropicClient::new(
                    config.anthropic_api_key.clone(),
                    config.anthropic_model.clone(),
                    timeout,
                )?);
                Ok(Self {
                    chat: client.clone(),
                    diary: client.clone(),
                    documents: client,
                })
            }
            LlmProvider::Ollama => {
                let chat: Arc<dyn TextGenerator> = Arc::new(OllamaClient::new(
                    config.ollama_url.clone(),
                    config.ollama_chat_model.clone(),
                    timeout,
                )?);
                let diary: Arc<dyn TextGenerator> = Arc::new(OllamaClient::new(
                    config.ollama_url.clone(),
                    config.ollama_diary_model.clone(),
                    timeout,
                )?);
                Ok(Self {
                    chat: chat.clone(),
                    diary,
                    documents: chat,
                })
            }
        }
    }
}
