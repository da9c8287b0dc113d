//! OpenAI-compatible chat completion client

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

use crate::config::AiConfig;
use crate::error::{PipelineError, PipelineResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

/// Body of a chat completion request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<Message>,
    pub seed: u64,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    refusal: Option<String>,
}

/// Transport that turns a chat request into the first choice's text
#[async_trait]
pub trait ChatBackend: Send + Sync {
    async fn chat(&self, request: &ChatRequest) -> PipelineResult<String>;
}

/// HTTP client for `POST {api_base}/chat/completions`
#[derive(Clone)]
pub struct OpenAiClient {
    client: Client,
    api_base: String,
    api_key: Option<String>,
}

impl OpenAiClient {
    pub fn new(
        api_base: impl Into<String>,
        api_key: Option<String>,
        timeout: Duration,
    ) -> PipelineResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| PipelineError::config(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self {
            client,
            api_base: api_base.into().trim_end_matches('/').to_string(),
            api_key,
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.api_base)
    }
}

#[async_trait]
impl ChatBackend for OpenAiClient {
    async fn chat(&self, request: &ChatRequest) -> PipelineResult<String> {
        let mut builder = self
            .client
            .post(self.endpoint())
            .header("Content-Type", "application/json")
            .json(request);
        if let Some(key) = &self.api_key {
            builder = builder.header("Authorization", format!("Bearer {}", key));
        }

        let response = builder.send().await.map_err(|e| {
            PipelineError::BackendUnavailable(format!("request to {} failed: {}", self.api_base, e))
        })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            let what = if matches!(status, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN) {
                "authentication failed"
            } else {
                "API error"
            };
            return Err(PipelineError::BackendUnavailable(format!(
                "{} ({}): {}",
                what, status, error_text
            )));
        }

        let chat_response: ChatResponse = response.json().await.map_err(|e| {
            PipelineError::BackendUnavailable(format!("failed to decode response: {}", e))
        })?;

        first_choice_text(chat_response)
    }
}

fn first_choice_text(response: ChatResponse) -> PipelineResult<String> {
    let choice = response
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| PipelineError::BackendRefusal("response contained no choices".into()))?;

    if let Some(refusal) = choice.message.refusal.filter(|r| !r.trim().is_empty()) {
        return Err(PipelineError::BackendRefusal(refusal));
    }

    match choice.message.content {
        Some(content) if !content.trim().is_empty() => Ok(content),
        _ => Err(PipelineError::BackendRefusal("empty message content".into())),
    }
}

/// Which model a completion should go to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Backend {
    /// Operator-selected generation model
    Generation(String),
    /// The configured judge model, whatever the generation model is
    Judge,
}

/// Two-turn completion calls with a fixed seed and judge model
#[derive(Clone)]
pub struct CompletionClient {
    backend: Arc<dyn ChatBackend>,
    judge_model: String,
    seed: u64,
}

impl CompletionClient {
    pub fn new(backend: Arc<dyn ChatBackend>, judge_model: impl Into<String>, seed: u64) -> Self {
        Self {
            backend,
            judge_model: judge_model.into(),
            seed,
        }
    }

    /// HTTP-backed client for the configured API
    pub fn from_config(ai: &AiConfig) -> PipelineResult<Self> {
        let http = OpenAiClient::new(ai.api_base.clone(), ai.api_key.clone(), ai.request_timeout())?;
        if ai.api_key.is_none() {
            tracing::warn!("No API key configured; requests to {} are unauthenticated", ai.api_base);
        }
        Ok(Self::new(Arc::new(http), ai.judge_model.clone(), ai.seed))
    }

    pub fn judge_model(&self) -> &str {
        &self.judge_model
    }

    /// Model identifier a request for `backend` is sent to
    pub fn model_for<'a>(&'a self, backend: &'a Backend) -> &'a str {
        match backend {
            Backend::Generation(model) => model,
            Backend::Judge => &self.judge_model,
        }
    }

    /// Send a system and a user turn, return the first completion's text.
    ///
    /// A failed call is returned as-is; nothing is retried.
    pub async fn complete(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        backend: &Backend,
    ) -> PipelineResult<String> {
        let model = self.model_for(backend);
        let request = ChatRequest {
            model: model.to_string(),
            messages: vec![
                Message {
                    role: Role::System,
                    content: system_prompt.to_string(),
                },
                Message {
                    role: Role::User,
                    content: user_prompt.to_string(),
                },
            ],
            seed: self.seed,
        };

        tracing::debug!(
            "Completion request: model={} judge={} system_len={} user_len={}",
            model,
            matches!(backend, Backend::Judge),
            system_prompt.len(),
            user_prompt.len()
        );
        tracing::trace!("System prompt: {}", system_prompt);
        tracing::trace!("User prompt: {}", user_prompt);

        match self.backend.chat(&request).await {
            Ok(text) => {
                tracing::debug!("Completion from {}: {} bytes", model, text.len());
                Ok(text)
            }
            Err(e) => {
                tracing::warn!("Completion from {} failed: {}", model, e);
                Err(e)
            }
        }
    }
}
