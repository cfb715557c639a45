// courier-cli/src/setup.rs

use anyhow::{Context, Result};
use colored::*;
use courier_core::{CompletionConfig, CourierFileConfig};
use indicatif::{ProgressBar, ProgressStyle};
use std::env;
use std::time::Duration;

/// Environment credentials plus an optional `Courier.toml` above the working directory.
pub fn load_completion_config() -> Result<CompletionConfig> {
    let current_dir = env::current_dir().context("Failed to get current directory")?;
    let file = CourierFileConfig::discover(&current_dir)?;
    let config = CompletionConfig::from_env(file.as_ref().map(|(cfg, _)| cfg))?;
    Ok(config)
}

pub fn spinner(message: &str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner
}

pub fn print_error(err: &anyhow::Error) {
    eprintln!("{} {:#}", "Error:".red().bold(), err);
}
