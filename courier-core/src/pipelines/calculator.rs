// courier-core/src/pipelines/calculator.rs

use std::sync::Arc;
use tracing::{debug, warn};

use crate::completion::{Completion, CompletionEndpoint, CompletionRequest};
use crate::errors::{CourierError, CourierResult};
use crate::tools::calculator;
use crate::tools::ToolArguments;

pub const DEFAULT_SYSTEM_PROMPT: &str =
    "You are a helpful calculator assistant. Translate user requests into mathematical operations.";

/// Answers arithmetic questions by letting the model pick a calculator operation.
pub struct CalculatorAssistant {
    completion: Arc<dyn CompletionEndpoint>,
}

impl CalculatorAssistant {
    pub fn new(completion: Arc<dyn CompletionEndpoint>) -> Self {
        Self { completion }
    }

    /// Always returns a printable answer: `Result: …`, the model's own text, or
    /// `Calculation error: …`.
    pub async fn answer(&self, user_message: &str) -> String {
        match self.try_answer(user_message).await {
            Ok(answer) => answer,
            Err(e) => {
                warn!(error = %e, "Calculator request failed.");
                format!("Calculation error: {}", e)
            }
        }
    }

    pub async fn try_answer(&self, user_message: &str) -> CourierResult<String> {
        let definitions = vec![calculator::tool_definition()];
        let request =
            CompletionRequest::new(None, DEFAULT_SYSTEM_PROMPT, user_message, definitions.clone())?;

        match self.completion.complete(&request).await? {
            Completion::ToolCall(call) => match ToolArguments::parse(&call, &definitions)? {
                ToolArguments::Calculate(args) => {
                    debug!(operation = %args.operation, x = args.x, y = ?args.y, "Evaluating.");
                    Ok(format!("Result: {}", args.evaluate()?))
                }
                other => Err(CourierError::UnsupportedOperation(format!(
                    "function '{}' is not available",
                    other.function_name()
                ))),
            },
            Completion::Text(text) => Ok(text),
        }
    }
}
