// courier-core/src/completion.rs

//! Completion dispatcher: one system prompt, one user message, one tool schema.

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, error, info, trace};

use crate::api;
use crate::config::CompletionConfig;
use crate::errors::{CourierError, CourierResult};
use crate::models::chat::ChatMessage;
use crate::models::tools::{ToolCall, ToolDefinition};

/// A single request to the completion endpoint. Built fresh per call.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub system_prompt: String,
    pub user_content: String,
    pub tools: Vec<ToolDefinition>,
}

impl CompletionRequest {
    /// Uses `system_prompt` when given, `default_prompt` otherwise. Empty user
    /// content is rejected here, before any network call.
    pub fn new(
        system_prompt: Option<&str>,
        default_prompt: &str,
        user_content: &str,
        tools: Vec<ToolDefinition>,
    ) -> CourierResult<Self> {
        if user_content.trim().is_empty() {
            return Err(CourierError::validation("user content must not be empty"));
        }
        Ok(Self {
            system_prompt: system_prompt.unwrap_or(default_prompt).to_string(),
            user_content: user_content.to_string(),
            tools,
        })
    }

    pub fn messages(&self) -> Vec<ChatMessage> {
        vec![
            ChatMessage::system(self.system_prompt.clone()),
            ChatMessage::user(self.user_content.clone()),
        ]
    }
}

/// What the model chose to do.
#[derive(Debug, Clone, PartialEq)]
pub enum Completion {
    ToolCall(ToolCall),
    /// Plain content; empty when the model returned none.
    Text(String),
}

#[async_trait]
pub trait CompletionEndpoint: Send + Sync {
    async fn complete(&self, request: &CompletionRequest) -> CourierResult<Completion>;
}

/// [`CompletionEndpoint`] over an OpenAI-compatible HTTP API.
pub struct HttpCompletionEndpoint {
    config: CompletionConfig,
    http_client: Client,
}

impl HttpCompletionEndpoint {
    pub fn new(config: CompletionConfig) -> CourierResult<Self> {
        let http_client = api::build_http_client(config.timeout).map_err(CourierError::transport)?;
        Ok(Self {
            config,
            http_client,
        })
    }
}

#[async_trait]
impl CompletionEndpoint for HttpCompletionEndpoint {
    async fn complete(&self, request: &CompletionRequest) -> CourierResult<Completion> {
        debug!(
            model = %self.config.model_name,
            endpoint = %self.config.endpoint,
            tools = request.tools.len(),
            "Sending request to completion endpoint."
        );

        let response = api::get_chat_completion(
            &self.http_client,
            &self.config,
            request.messages(),
            &request.tools,
        )
        .await
        .map_err(|e| {
            error!(error = ?e, "Completion call failed.");
            CourierError::transport(e)
        })?;
        trace!(response = ?response, "Completion response");

        let choice = response.choices.into_iter().next().ok_or_else(|| {
            error!("API response contained no choices.");
            CourierError::transport(anyhow::anyhow!("API response contained no choices"))
        })?;

        let message = choice.message;
        match message.tool_calls.and_then(|calls| calls.into_iter().next()) {
            Some(tool_call) => {
                info!(function = %tool_call.function.name, "Model requested a tool call.");
                Ok(Completion::ToolCall(tool_call))
            }
            None => {
                info!("Model answered without a tool call.");
                Ok(Completion::Text(message.content.unwrap_or_default()))
            }
        }
    }
}
