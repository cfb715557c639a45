// courier-core/src/tools/email.rs

//! The `send_email` function and the message built from its arguments.

use crate::config::EmailConfig;
use crate::models::tools::{ToolDefinition, ToolParameter, ToolParameterType};
use serde::{Deserialize, Serialize};

pub const FUNCTION_NAME: &str = "send_email";
pub const DEFAULT_SUBJECT: &str = "Conversation Summary";

/// Typed arguments of a `send_email` tool call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EmailArgs {
    pub to_email: String,
    /// HTML fragment placed inside the message shell.
    pub body_content: String,
    pub subject: String,
}

/// A fully formed outbound message. Lives only for the duration of one send.
#[derive(Debug, Clone, PartialEq)]
pub struct EmailMessage {
    pub from_address: String,
    pub from_name: String,
    pub to_address: String,
    pub subject: String,
    pub html_body: String,
}

impl EmailMessage {
    pub fn compose(config: &EmailConfig, args: EmailArgs) -> Self {
        Self {
            from_address: config.sender_email.clone(),
            from_name: config.sender_name.clone(),
            to_address: args.to_email,
            subject: args.subject,
            html_body: wrap_html(&args.body_content),
        }
    }
}

/// Places `body` inside a centered, max-width container. `body` is not escaped
/// or otherwise altered.
pub fn wrap_html(body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n\
         <html>\n\
         <body>\n    \
         <div style=\"font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto;\">\n    \
         {}\n    \
         </div>\n\
         </body>\n\
         </html>",
        body
    )
}

pub fn tool_definition() -> ToolDefinition {
    ToolDefinition::object(
        FUNCTION_NAME,
        "Send an email with summarized content",
        vec![
            (
                "to_email",
                ToolParameter::new(ToolParameterType::String, "Recipient's email address"),
            ),
            (
                "body_content",
                ToolParameter::new(ToolParameterType::String, "HTML content of the email"),
            ),
            (
                "subject",
                ToolParameter::new(ToolParameterType::String, "Subject line of the email"),
            ),
        ],
        &["to_email", "body_content", "subject"],
    )
}
