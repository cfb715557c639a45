// courier-cli/src/bin/summary_mailer.rs

//! Summarizes a sample consultation and emails the summary.

use anyhow::Result;
use colored::*;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{error, info};

use courier_cli::logging::init_logging;
use courier_cli::setup::{load_completion_config, print_error, spinner};
use courier_core::{EmailConfig, HttpCompletionEndpoint, SendGridDelivery, SendReport, SummaryMailer};

const SAMPLE_CONVERSATION: &str = "
Patient: I've been experiencing headaches for the past week.
Doctor: Can you describe the pain? When does it occur?
Patient: Usually in the afternoon, sharp pain on the right side.
Doctor: We should run some tests to understand the cause.
Doctor: ok i am sending you an email of this conversation summary to patient@example.com
";

async fn run() -> Result<SendReport> {
    let completion_config = load_completion_config()?;
    let email_config = EmailConfig::from_env()?;
    info!(model = %completion_config.model_name, "Configuration loaded.");

    let completion = HttpCompletionEndpoint::new(completion_config)?;
    let delivery = SendGridDelivery::new(&email_config)?;
    let mailer = SummaryMailer::new(Arc::new(completion), Arc::new(delivery), email_config);

    let progress = spinner("Summarizing conversation...");
    let result = mailer.process_and_send(SAMPLE_CONVERSATION, None).await;
    progress.finish_and_clear();
    Ok(result?)
}

#[tokio::main]
async fn main() -> ExitCode {
    colored::control::set_override(true);
    dotenvy::dotenv().ok();

    let _logging = match init_logging("summary-mailer") {
        Ok(guard) => guard,
        Err(e) => {
            print_error(&e);
            return ExitCode::FAILURE;
        }
    };
    colored::control::unset_override();

    match run().await {
        Ok(report) if report.is_success() => {
            println!("{}", report.to_string().green());
            ExitCode::SUCCESS
        }
        Ok(report) => {
            println!("{}", report.to_string().red());
            ExitCode::FAILURE
        }
        Err(e) => {
            error!(error = ?e, "Summary mailer failed.");
            print_error(&e);
            ExitCode::FAILURE
        }
    }
}
