// courier-core/src/pipeline_tests.rs
#![cfg(test)]

use super::*;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::anyhow;
use httpmock::prelude::*;
use serde_json::json;

// --- Test doubles ---

#[derive(Clone)]
enum Scripted {
    Tool { name: &'static str, arguments: String },
    Text(&'static str),
    Fail(&'static str),
}

struct ScriptedCompletion {
    script: Scripted,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedCompletion {
    fn new(script: Scripted) -> Arc<Self> {
        Arc::new(Self {
            script,
            requests: Mutex::new(Vec::new()),
        })
    }

    fn tool(name: &'static str, arguments: serde_json::Value) -> Arc<Self> {
        Self::new(Scripted::Tool {
            name,
            arguments: arguments.to_string(),
        })
    }
}

#[async_trait]
impl CompletionEndpoint for ScriptedCompletion {
    async fn complete(&self, request: &CompletionRequest) -> CourierResult<Completion> {
        self.requests.lock().unwrap().push(request.clone());
        match &self.script {
            Scripted::Tool { name, arguments } => Ok(Completion::ToolCall(ToolCall {
                id: "call_1".to_string(),
                call_type: "function".to_string(),
                function: ToolFunction {
                    name: name.to_string(),
                    arguments: arguments.clone(),
                },
            })),
            Scripted::Text(text) => Ok(Completion::Text(text.to_string())),
            Scripted::Fail(msg) => Err(CourierError::transport(anyhow!("{}", msg))),
        }
    }
}

#[derive(Default)]
struct RecordingDelivery {
    sent: Mutex<Vec<EmailMessage>>,
    fail_with: Option<&'static str>,
}

#[async_trait]
impl DeliveryEndpoint for RecordingDelivery {
    async fn deliver(&self, message: &EmailMessage) -> CourierResult<()> {
        self.sent.lock().unwrap().push(message.clone());
        match self.fail_with {
            Some(msg) => Err(CourierError::transport(anyhow!("{}", msg))),
            None => Ok(()),
        }
    }
}

// --- Test helpers ---

fn email_config(default_recipient: Option<&str>) -> EmailConfig {
    EmailConfig {
        api_key: "sg-test".to_string(),
        endpoint: "http://unused/v3/mail/send".to_string(),
        sender_email: "clinic@example.com".to_string(),
        sender_name: "Appointment System".to_string(),
        default_recipient: default_recipient.map(str::to_string),
        timeout: Duration::from_secs(5),
    }
}

const CONVERSATION: &str = "\
Patient: I've been experiencing headaches for the past week.
Doctor: We should run some tests to understand the cause.
Doctor: I am sending you an email of this conversation summary to patient@example.com";

fn email_tool_args() -> serde_json::Value {
    json!({
        "to_email": "patient@example.com",
        "body_content": "<h2>Summary</h2><p>Headaches for a week; tests ordered.</p>",
        "subject": "Your consultation summary"
    })
}

// --- Calculator pipeline ---

#[tokio::test]
async fn test_calculator_square_root_scenario() {
    let completion = ScriptedCompletion::tool("calculate", json!({"operation": "sqrt", "x": 16}));
    let assistant = CalculatorAssistant::new(completion.clone());

    let answer = assistant.answer("Calculate the square root of 16").await;
    assert_eq!(answer, "Result: 4.0");

    let requests = completion.requests.lock().unwrap();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].user_content, "Calculate the square root of 16");
    assert_eq!(
        requests[0].system_prompt,
        pipelines::calculator::DEFAULT_SYSTEM_PROMPT
    );
    assert_eq!(requests[0].tools, vec![tools::calculator::tool_definition()]);
}

#[tokio::test]
async fn test_calculator_binary_operation() {
    let completion =
        ScriptedCompletion::tool("calculate", json!({"operation": "multiply", "x": 7, "y": 6}));
    let answer = CalculatorAssistant::new(completion).answer("Multiply 7 by 6").await;
    assert_eq!(answer, "Result: 42.0");
}

#[tokio::test]
async fn test_calculator_divide_by_zero_is_reported_not_raised() {
    let completion =
        ScriptedCompletion::tool("calculate", json!({"operation": "divide", "x": 20, "y": 0}));
    let answer = CalculatorAssistant::new(completion).answer("Divide 20 by 0").await;
    assert_eq!(answer, "Result: Division by zero");
}

#[tokio::test]
async fn test_calculator_text_fallback_is_verbatim() {
    let text = "  I can only help with arithmetic.\n";
    let completion = ScriptedCompletion::new(Scripted::Text(text));
    let answer = CalculatorAssistant::new(completion).answer("Write a poem").await;
    assert_eq!(answer, text);
}

#[tokio::test]
async fn test_calculator_missing_operand_is_validation_error() {
    let completion = ScriptedCompletion::tool("calculate", json!({"operation": "sqrt"}));
    let assistant = CalculatorAssistant::new(completion);
    assert!(matches!(
        assistant.try_answer("Square root?").await,
        Err(CourierError::Validation(_))
    ));
    let answer = assistant.answer("Square root?").await;
    assert!(answer.starts_with("Calculation error: Validation Error"), "{}", answer);
}

#[tokio::test]
async fn test_calculator_binary_without_y_is_validation_error() {
    let completion = ScriptedCompletion::tool("calculate", json!({"operation": "add", "x": 5}));
    let result = CalculatorAssistant::new(completion).try_answer("Add 5").await;
    assert!(matches!(result, Err(CourierError::Validation(_))));
}

#[tokio::test]
async fn test_calculator_unknown_operation() {
    let completion =
        ScriptedCompletion::tool("calculate", json!({"operation": "modulo", "x": 7, "y": 2}));
    let answer = CalculatorAssistant::new(completion).answer("7 mod 2").await;
    assert_eq!(answer, "Calculation error: Unsupported operation: modulo");
}

#[tokio::test]
async fn test_calculator_malformed_arguments_are_stringified() {
    let completion = ScriptedCompletion::new(Scripted::Tool {
        name: "calculate",
        arguments: "{operation: sqrt".to_string(),
    });
    let answer = CalculatorAssistant::new(completion).answer("sqrt 16").await;
    assert!(answer.starts_with("Calculation error: Malformed Arguments"), "{}", answer);
}

#[tokio::test]
async fn test_calculator_transport_error_is_stringified() {
    let completion = ScriptedCompletion::new(Scripted::Fail("API error: 503 - overloaded"));
    let answer = CalculatorAssistant::new(completion).answer("What is 5 plus 3?").await;
    assert_eq!(
        answer,
        "Calculation error: Transport Error: API error: 503 - overloaded"
    );
}

#[tokio::test]
async fn test_calculator_rejects_foreign_function() {
    let completion = ScriptedCompletion::tool("send_email", email_tool_args());
    let result = CalculatorAssistant::new(completion).try_answer("Email me").await;
    assert!(matches!(result, Err(CourierError::UnsupportedOperation(_))));
}

#[tokio::test]
async fn test_calculator_empty_request_never_reaches_model() {
    let completion = ScriptedCompletion::new(Scripted::Text("unused"));
    let result = CalculatorAssistant::new(completion.clone()).try_answer("   ").await;
    assert!(matches!(result, Err(CourierError::Validation(_))));
    assert!(completion.requests.lock().unwrap().is_empty());
}

// --- Summary mailer pipeline ---

#[tokio::test]
async fn test_mailer_sends_tool_call_arguments() {
    let completion = ScriptedCompletion::tool("send_email", email_tool_args());
    let delivery = Arc::new(RecordingDelivery::default());
    let mailer = SummaryMailer::new(completion.clone(), delivery.clone(), email_config(None));

    let report = mailer.process_and_send(CONVERSATION, None).await.unwrap();
    assert_eq!(report.status, SendStatus::Success);
    assert_eq!(report.message, "Email sent successfully to patient@example.com");

    let sent = delivery.sent.lock().unwrap();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to_address, "patient@example.com");
    assert_eq!(sent[0].subject, "Your consultation summary");
    assert_eq!(sent[0].from_address, "clinic@example.com");
    assert!(sent[0]
        .html_body
        .contains("<h2>Summary</h2><p>Headaches for a week; tests ordered.</p>"));

    let requests = completion.requests.lock().unwrap();
    assert_eq!(requests[0].system_prompt, pipelines::summary::DEFAULT_SYSTEM_PROMPT);
    assert_eq!(requests[0].tools[0].name, "send_email");
}

#[tokio::test]
async fn test_mailer_custom_system_prompt() {
    let completion = ScriptedCompletion::tool("send_email", email_tool_args());
    let mailer = SummaryMailer::new(
        completion.clone(),
        Arc::new(RecordingDelivery::default()),
        email_config(None),
    );
    mailer
        .generate_email_content(CONVERSATION, Some("Summarize in one line."))
        .await
        .unwrap();
    assert_eq!(
        completion.requests.lock().unwrap()[0].system_prompt,
        "Summarize in one line."
    );
}

#[tokio::test]
async fn test_mailer_fallback_uses_default_recipient_and_subject() {
    let completion = ScriptedCompletion::new(Scripted::Text("<p>Headaches; tests ordered.</p>"));
    let delivery = Arc::new(RecordingDelivery::default());
    let mailer = SummaryMailer::new(
        completion,
        delivery.clone(),
        email_config(Some("records@example.com")),
    );

    let args = mailer.generate_email_content(CONVERSATION, None).await.unwrap();
    assert_eq!(
        args,
        EmailArgs {
            to_email: "records@example.com".to_string(),
            body_content: "<p>Headaches; tests ordered.</p>".to_string(),
            subject: "Conversation Summary".to_string(),
        }
    );

    let report = mailer.process_and_send(CONVERSATION, None).await.unwrap();
    assert!(report.is_success());
    assert_eq!(delivery.sent.lock().unwrap()[0].subject, "Conversation Summary");
}

#[tokio::test]
async fn test_mailer_fallback_without_default_recipient() {
    let completion = ScriptedCompletion::new(Scripted::Text("Summary"));
    let delivery = Arc::new(RecordingDelivery::default());
    let mailer = SummaryMailer::new(completion, delivery.clone(), email_config(None));

    let result = mailer.process_and_send(CONVERSATION, None).await;
    assert!(matches!(result, Err(CourierError::Configuration(_))));
    assert!(delivery.sent.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_mailer_delivery_failure_becomes_error_report() {
    let completion = ScriptedCompletion::tool("send_email", email_tool_args());
    let delivery = Arc::new(RecordingDelivery {
        sent: Mutex::new(Vec::new()),
        fail_with: Some("Delivery error: 401 Unauthorized - bad key"),
    });
    let mailer = SummaryMailer::new(completion, delivery, email_config(None));

    let report = mailer.process_and_send(CONVERSATION, None).await.unwrap();
    assert_eq!(report.status, SendStatus::Error);
    assert!(report.message.contains("bad key"), "{}", report.message);
}

#[tokio::test]
async fn test_mailer_missing_field_is_rejected_before_sending() {
    let completion = ScriptedCompletion::tool(
        "send_email",
        json!({"to_email": "patient@example.com", "subject": "No body"}),
    );
    let delivery = Arc::new(RecordingDelivery::default());
    let mailer = SummaryMailer::new(completion, delivery.clone(), email_config(None));

    let result = mailer.process_and_send(CONVERSATION, None).await;
    assert!(matches!(result, Err(CourierError::Validation(_))));
    assert!(delivery.sent.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_mailer_malformed_arguments_propagate() {
    let completion = ScriptedCompletion::new(Scripted::Tool {
        name: "send_email",
        arguments: "not json".to_string(),
    });
    let delivery = Arc::new(RecordingDelivery::default());
    let mailer = SummaryMailer::new(completion, delivery.clone(), email_config(None));

    let result = mailer.process_and_send(CONVERSATION, None).await;
    assert!(matches!(result, Err(CourierError::MalformedArguments(_))));
    assert!(delivery.sent.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_mailer_completion_failure_propagates() {
    let completion = ScriptedCompletion::new(Scripted::Fail("Network error"));
    let mailer = SummaryMailer::new(
        completion,
        Arc::new(RecordingDelivery::default()),
        email_config(Some("records@example.com")),
    );
    let result = mailer.process_and_send(CONVERSATION, None).await;
    assert!(matches!(result, Err(CourierError::Transport(_))));
}

// --- End to end over HTTP ---

#[tokio::test]
async fn test_mailer_end_to_end_over_http() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();

    let server = MockServer::start_async().await;
    let inner_html = "<h2>Consultation</h2>\n<ul><li>Afternoon headaches, right side</li><li>Tests to be scheduled</li></ul>";
    let tool_args = json!({
        "to_email": "patient@example.com",
        "body_content": inner_html,
        "subject": "Consultation summary"
    });

    let completion_mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/openai/v1/chat/completions")
                .header("Authorization", "Bearer gsk-test")
                .json_body_partial(
                    json!({
                        "model": "llama-3.3-70b-versatile",
                        "tools": [{"type": "function", "function": tools::email::tool_definition()}]
                    })
                    .to_string(),
                );
            then.status(200).json_body(json!({
                "id": "resp1",
                "choices": [{
                    "index": 0,
                    "message": {
                        "role": "assistant",
                        "content": null,
                        "tool_calls": [{
                            "id": "call_1",
                            "type": "function",
                            "function": {"name": "send_email", "arguments": tool_args.to_string()}
                        }]
                    },
                    "finish_reason": "tool_calls"
                }]
            }));
        })
        .await;

    let delivery_mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/v3/mail/send")
                .header("Authorization", "Bearer sg-test")
                .json_body_partial(
                    json!({
                        "personalizations": [{"to": [{"email": "patient@example.com"}]}],
                        "subject": "Consultation summary",
                        "content": [{"type": "text/html", "value": tools::email::wrap_html(inner_html)}]
                    })
                    .to_string(),
                );
            then.status(202);
        })
        .await;

    let completion = HttpCompletionEndpoint::new(CompletionConfig {
        api_key: "gsk-test".to_string(),
        endpoint: server.url("/openai/v1/chat/completions"),
        model_name: "llama-3.3-70b-versatile".to_string(),
        parameters: toml::Value::Table(Default::default()),
        timeout: Duration::from_secs(5),
    })
    .unwrap();
    let mut config = email_config(None);
    config.endpoint = server.url("/v3/mail/send");
    let delivery = SendGridDelivery::new(&config).unwrap();
    let mailer = SummaryMailer::new(Arc::new(completion), Arc::new(delivery), config);

    let report = mailer.process_and_send(CONVERSATION, None).await.unwrap();
    completion_mock.assert_async().await;
    delivery_mock.assert_async().await;
    assert_eq!(report, SendReport::success("patient@example.com"));
}
