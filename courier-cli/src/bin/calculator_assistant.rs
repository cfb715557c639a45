// courier-cli/src/bin/calculator_assistant.rs

//! Runs a few natural-language arithmetic queries through the calculator tool.

use anyhow::Result;
use colored::*;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::error;

use courier_cli::logging::init_logging;
use courier_cli::setup::{load_completion_config, print_error, spinner};
use courier_core::{CalculatorAssistant, HttpCompletionEndpoint};

const QUERIES: [&str; 4] = [
    "What is 5 plus 3?",
    "Calculate the square root of 16",
    "Multiply 7 by 6",
    "Divide 20 by 4",
];

async fn run() -> Result<()> {
    let completion = HttpCompletionEndpoint::new(load_completion_config()?)?;
    let assistant = CalculatorAssistant::new(Arc::new(completion));

    for query in QUERIES {
        println!("{} {}", "Query:".cyan().bold(), query);
        let progress = spinner("Asking the model...");
        let answer = assistant.answer(query).await;
        progress.finish_and_clear();
        println!("{}", answer);
        println!();
    }
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    colored::control::set_override(true);
    dotenvy::dotenv().ok();

    let _logging = match init_logging("calculator-assistant") {
        Ok(guard) => guard,
        Err(e) => {
            print_error(&e);
            return ExitCode::FAILURE;
        }
    };
    colored::control::unset_override();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = ?e, "Calculator assistant failed.");
            print_error(&e);
            ExitCode::FAILURE
        }
    }
}
