// courier-core/src/api.rs

use anyhow::{anyhow, Context, Result};
use reqwest::Client;
use serde_json::{json, to_value, Value};
use std::time::Duration;
use tracing::debug;
use uuid::Uuid;

use crate::config::CompletionConfig;
use crate::models::chat::{ApiResponse, ChatMessage};
use crate::models::tools::ToolDefinition;

pub fn build_http_client(timeout: Duration) -> Result<Client> {
    Client::builder()
        .timeout(timeout)
        .build()
        .context("Failed to build HTTP client")
}

/// Sends one chat-completion request. There is no retry: any network error or
/// non-success status is returned to the caller.
pub async fn get_chat_completion(
    client: &Client,
    config: &CompletionConfig,
    messages: Vec<ChatMessage>,
    tool_definitions: &[ToolDefinition],
) -> Result<ApiResponse> {
    let url_str = &config.endpoint;
    let request_body = build_openai_request(config, messages, tool_definitions)?;

    debug!(
        "Request URL: {}\nRequest JSON: {}",
        url_str,
        serde_json::to_string_pretty(&request_body)?
    );

    let response = client
        .post(url_str)
        .header("Content-Type", "application/json")
        .header("Authorization", format!("Bearer {}", config.api_key))
        .json(&request_body)
        .send()
        .await
        .context("Network error sending completion request")?;

    let status = response.status();
    if !status.is_success() {
        let headers = response.headers().clone();
        let error_text = response
            .text()
            .await
            .context("Failed to read API error response body")?;
        debug!(
            "API request failed. Status: {}, Headers: {:#?}, Body: {}",
            status, headers, error_text
        );
        return Err(anyhow!("API error: {} - {}", status, error_text));
    }

    let response_value: Value = response
        .json()
        .await
        .context("Failed to read API response body as JSON")?;

    let mut response_json_obj = match response_value {
        Value::Object(map) => map,
        other => {
            return Err(anyhow!("API response was not a JSON object: {:?}", other));
        }
    };

    if !response_json_obj.contains_key("id") {
        let new_id = format!("chatcmpl-{}", Uuid::new_v4());
        debug!(
            "Added missing 'id' field to API response with value: {}",
            new_id
        );
        response_json_obj.insert("id".to_string(), json!(new_id));
    }

    let api_response: ApiResponse = serde_json::from_value(Value::Object(response_json_obj))
        .context("Failed to deserialize API response")?;

    match api_response.choices.first() {
        Some(choice) => match &choice.message.tool_calls {
            Some(tool_calls) => debug!("Tool calls: {:#?}", tool_calls),
            None => debug!("No tool calls"),
        },
        None => debug!("Response has empty 'choices' array"),
    }

    Ok(api_response)
}

fn build_openai_request(
    config: &CompletionConfig,
    messages: Vec<ChatMessage>,
    tool_definitions: &[ToolDefinition],
) -> Result<Value> {
    let mut request_map = serde_json::Map::new();
    request_map.insert("model".to_string(), json!(config.model_name));
    request_map.insert("messages".to_string(), to_value(messages)?);

    let tools_json: Vec<Value> = tool_definitions
        .iter()
        .map(|tool_def| {
            json!({
                "type": "function",
                "function": tool_def
            })
        })
        .collect();

    if !tools_json.is_empty() {
        request_map.insert("tools".to_string(), Value::Array(tools_json));
    }

    if let Some(parameters) = config.parameters.as_table() {
        for (key, value) in parameters {
            let json_value = to_value(value.clone())
                .with_context(|| format!("Failed to convert TOML parameter '{}' to JSON", key))?;
            request_map.insert(key.clone(), json_value);
        }
    }
    Ok(Value::Object(request_map))
}
