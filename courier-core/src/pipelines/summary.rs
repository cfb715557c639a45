// courier-core/src/pipelines/summary.rs

use std::sync::Arc;
use tracing::{info, warn};

use crate::completion::{Completion, CompletionEndpoint, CompletionRequest};
use crate::config::EmailConfig;
use crate::delivery::{DeliveryEndpoint, SendReport};
use crate::errors::{CourierError, CourierResult};
use crate::tools::email::{self, EmailArgs, EmailMessage};
use crate::tools::ToolArguments;

pub const DEFAULT_SYSTEM_PROMPT: &str = "\
You are an advanced summarization bot and email sender.
Summarize the given conversation concisely, focusing on:
- Key discussion points
- Action items
- Decisions made
- Next steps

Create a professional, clear, and concise report and then send it by email.";

/// Summarizes a conversation with the model and emails the result.
pub struct SummaryMailer {
    completion: Arc<dyn CompletionEndpoint>,
    delivery: Arc<dyn DeliveryEndpoint>,
    config: EmailConfig,
}

impl SummaryMailer {
    pub fn new(
        completion: Arc<dyn CompletionEndpoint>,
        delivery: Arc<dyn DeliveryEndpoint>,
        config: EmailConfig,
    ) -> Self {
        Self {
            completion,
            delivery,
            config,
        }
    }

    /// Asks the model for recipient, subject and HTML body. Without a tool
    /// call, the model's text becomes the body of a message to the configured
    /// default recipient.
    pub async fn generate_email_content(
        &self,
        conversation: &str,
        system_prompt: Option<&str>,
    ) -> CourierResult<EmailArgs> {
        let definitions = vec![email::tool_definition()];
        let request = CompletionRequest::new(
            system_prompt,
            DEFAULT_SYSTEM_PROMPT,
            conversation,
            definitions.clone(),
        )?;

        match self.completion.complete(&request).await? {
            Completion::ToolCall(call) => match ToolArguments::parse(&call, &definitions)? {
                ToolArguments::SendEmail(args) => Ok(args),
                other => Err(CourierError::UnsupportedOperation(format!(
                    "function '{}' is not available",
                    other.function_name()
                ))),
            },
            Completion::Text(text) => {
                warn!("No tool call in completion; using default recipient and subject.");
                self.fallback_args(text)
            }
        }
    }

    fn fallback_args(&self, body_content: String) -> CourierResult<EmailArgs> {
        let to_email = self.config.default_recipient.clone().ok_or_else(|| {
            CourierError::config(format!(
                "the model named no recipient and {} is not set.",
                crate::config::DEFAULT_RECIPIENT_VAR
            ))
        })?;
        Ok(EmailArgs {
            to_email,
            body_content,
            subject: email::DEFAULT_SUBJECT.to_string(),
        })
    }

    /// Composes and delivers one message. Delivery failures are reported in
    /// the returned [`SendReport`], never as an error.
    pub async fn send_email(&self, args: EmailArgs) -> SendReport {
        let message = EmailMessage::compose(&self.config, args);
        match self.delivery.deliver(&message).await {
            Ok(()) => {
                info!(to = %message.to_address, "Email sent.");
                SendReport::success(&message.to_address)
            }
            Err(e) => {
                warn!(error = %e, to = %message.to_address, "Email delivery failed.");
                SendReport::error(&e)
            }
        }
    }

    /// Generates the summary and sends it. Completion and argument errors are
    /// returned; delivery errors are folded into the report.
    pub async fn process_and_send(
        &self,
        conversation: &str,
        system_prompt: Option<&str>,
    ) -> CourierResult<SendReport> {
        let args = self.generate_email_content(conversation, system_prompt).await?;
        info!(to = %args.to_email, subject = %args.subject, "Email content generated.");
        Ok(self.send_email(args).await)
    }
}
