// courier-core/src/delivery.rs

//! Email delivery endpoint.

use anyhow::{anyhow, Context};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::fmt;
use tracing::{debug, error, info};

use crate::api::build_http_client;
use crate::config::EmailConfig;
use crate::errors::{CourierError, CourierResult};
use crate::tools::email::EmailMessage;

#[async_trait]
pub trait DeliveryEndpoint: Send + Sync {
    /// Submits one message. No retry, no queuing.
    async fn deliver(&self, message: &EmailMessage) -> CourierResult<()>;
}

/// [`DeliveryEndpoint`] for the SendGrid v3 `mail/send` API.
pub struct SendGridDelivery {
    api_key: String,
    endpoint: String,
    http_client: Client,
}

impl SendGridDelivery {
    pub fn new(config: &EmailConfig) -> CourierResult<Self> {
        Ok(Self {
            api_key: config.api_key.clone(),
            endpoint: config.endpoint.clone(),
            http_client: build_http_client(config.timeout).map_err(CourierError::transport)?,
        })
    }
}

pub fn build_sendgrid_payload(message: &EmailMessage) -> Value {
    json!({
        "personalizations": [{
            "to": [{ "email": message.to_address }]
        }],
        "from": {
            "email": message.from_address,
            "name": message.from_name
        },
        "subject": message.subject,
        "content": [{
            "type": "text/html",
            "value": message.html_body
        }]
    })
}

#[async_trait]
impl DeliveryEndpoint for SendGridDelivery {
    async fn deliver(&self, message: &EmailMessage) -> CourierResult<()> {
        let payload = build_sendgrid_payload(message);
        debug!(endpoint = %self.endpoint, to = %message.to_address, "Submitting message for delivery.");

        let response = self
            .http_client
            .post(&self.endpoint)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&payload)
            .send()
            .await
            .context("Network error sending email")
            .map_err(CourierError::transport)?;

        let status = response.status();
        if status.is_success() {
            info!(%status, to = %message.to_address, "Delivery endpoint accepted message.");
            return Ok(());
        }

        let body = response
            .text()
            .await
            .context("Failed to read delivery error response body")
            .map_err(CourierError::transport)?;
        error!(%status, body = %body, "Delivery endpoint rejected message.");
        Err(CourierError::transport(anyhow!(
            "Delivery error: {} - {}",
            status,
            body
        )))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SendStatus {
    Success,
    Error,
}

/// Outcome of one send. Callers branch on `status`; a failed send is not an `Err`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendReport {
    pub status: SendStatus,
    pub message: String,
}

impl SendReport {
    pub fn success(to_address: &str) -> Self {
        Self {
            status: SendStatus::Success,
            message: format!("Email sent successfully to {}", to_address),
        }
    }

    pub fn error(err: &CourierError) -> Self {
        Self {
            status: SendStatus::Error,
            message: err.to_string(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == SendStatus::Success
    }
}

impl fmt::Display for SendReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let status = match self.status {
            SendStatus::Success => "success",
            SendStatus::Error => "error",
        };
        write!(f, "{}: {}", status, self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::email::wrap_html;
    use httpmock::prelude::*;
    use std::time::Duration;

    const PATH: &str = "/v3/mail/send";

    fn config_for(server: &MockServer) -> EmailConfig {
        EmailConfig {
            api_key: "sg-test".to_string(),
            endpoint: server.url(PATH),
            sender_email: "clinic@example.com".to_string(),
            sender_name: "Appointment System".to_string(),
            default_recipient: None,
            timeout: Duration::from_secs(5),
        }
    }

    fn message(body: &str) -> EmailMessage {
        EmailMessage {
            from_address: "clinic@example.com".to_string(),
            from_name: "Appointment System".to_string(),
            to_address: "patient@example.com".to_string(),
            subject: "Visit summary".to_string(),
            html_body: wrap_html(body),
        }
    }

    #[test]
    fn test_payload_shape() {
        let payload = build_sendgrid_payload(&message("<p>Hi</p>"));
        assert_eq!(payload["personalizations"][0]["to"][0]["email"], "patient@example.com");
        assert_eq!(payload["from"]["email"], "clinic@example.com");
        assert_eq!(payload["from"]["name"], "Appointment System");
        assert_eq!(payload["subject"], "Visit summary");
        assert_eq!(payload["content"][0]["type"], "text/html");
        assert_eq!(payload["content"][0]["value"], json!(wrap_html("<p>Hi</p>")));
    }

    #[tokio::test]
    async fn test_deliver_posts_inner_html_unmodified() {
        let server = MockServer::start_async().await;
        let inner = "<h2>Headaches</h2><p>Tests scheduled &amp; results pending.</p>";
        let msg = message(inner);
        let expected = build_sendgrid_payload(&msg);
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path(PATH)
                    .header("Authorization", "Bearer sg-test")
                    .body_contains(inner)
                    .json_body(expected);
                then.status(202);
            })
            .await;

        let delivery = SendGridDelivery::new(&config_for(&server)).unwrap();
        let result = delivery.deliver(&msg).await;
        mock.assert_async().await;
        assert!(result.is_ok(), "{:?}", result.err());
    }

    #[tokio::test]
    async fn test_deliver_error_carries_endpoint_message() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path(PATH);
                then.status(403)
                    .body(r#"{"errors":[{"message":"The from address does not match a verified Sender Identity."}]}"#);
            })
            .await;

        let delivery = SendGridDelivery::new(&config_for(&server)).unwrap();
        match delivery.deliver(&message("<p>x</p>")).await {
            Err(CourierError::Transport(e)) => {
                assert!(e.to_string().contains("verified Sender Identity"), "{}", e)
            }
            other => panic!("Expected Transport error, got {:?}", other),
        }
    }

    #[test]
    fn test_report_display() {
        assert_eq!(
            SendReport::success("a@example.com").to_string(),
            "success: Email sent successfully to a@example.com"
        );
        let report = SendReport::error(&CourierError::transport(anyhow!("boom")));
        assert!(!report.is_success());
        assert_eq!(report.message, "Transport Error: boom");
    }
}
