// courier-core/src/lib.rs

//! Tool-call dispatch for two small LLM-driven pipelines.
//!
//! A [`CompletionEndpoint`] sends one system prompt, one user message and one
//! function schema to a chat-completion API. A returned [`ToolCall`] is
//! validated into [`ToolArguments`] and dispatched locally: the
//! [`SummaryMailer`] emails a conversation summary through a
//! [`DeliveryEndpoint`], the [`CalculatorAssistant`] evaluates one of nine
//! [`Operation`]s.

pub mod api;
pub mod completion;
pub mod config;
pub mod delivery;
pub mod errors;
pub mod models {
    pub mod chat;
    pub mod tools;
}
pub mod pipelines;
pub mod tools;

#[cfg(test)]
mod pipeline_tests;

pub use async_trait::async_trait;

pub use completion::{Completion, CompletionEndpoint, CompletionRequest, HttpCompletionEndpoint};
pub use config::{CompletionConfig, CourierFileConfig, EmailConfig};
pub use delivery::{DeliveryEndpoint, SendGridDelivery, SendReport, SendStatus};
pub use errors::{CourierError, CourierResult};
pub use models::chat::{ApiResponse, ChatMessage, Choice};
pub use models::tools::{
    ToolCall, ToolDefinition, ToolFunction, ToolParameter, ToolParameterType,
    ToolParametersDefinition,
};
pub use pipelines::{CalculatorAssistant, SummaryMailer};
pub use tools::{CalculateArgs, Calculation, EmailArgs, EmailMessage, Operation, ToolArguments};
