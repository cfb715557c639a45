// courier-core/src/config.rs

//! Configuration for the completion and delivery endpoints.
//!
//! Credentials and sender identity come from environment-style keys (a `.env`
//! file is honored). Model settings may additionally be overridden by an
//! optional `Courier.toml` found in the working directory or any parent.

use crate::errors::{CourierError, CourierResult};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

pub const CONFIG_FILENAME: &str = "Courier.toml";

pub const DEFAULT_COMPLETION_ENDPOINT: &str = "https://api.groq.com/openai/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "llama-3.3-70b-versatile";
pub const DEFAULT_EMAIL_ENDPOINT: &str = "https://api.sendgrid.com/v3/mail/send";
pub const DEFAULT_SENDER_NAME: &str = "Appointment System";
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

pub const COMPLETION_API_KEY_VAR: &str = "GROQ_API_KEY";
pub const COMPLETION_ENDPOINT_VAR: &str = "COURIER_COMPLETION_ENDPOINT";
pub const MODEL_VAR: &str = "COURIER_MODEL";
pub const TIMEOUT_VAR: &str = "COURIER_HTTP_TIMEOUT_SECS";
pub const EMAIL_API_KEY_VAR: &str = "SENDGRID_API_KEY";
pub const EMAIL_ENDPOINT_VAR: &str = "COURIER_EMAIL_ENDPOINT";
pub const SENDER_EMAIL_VAR: &str = "MAIL_DEFAULT_SENDER";
pub const SENDER_NAME_VAR: &str = "MAIL_DEFAULT_SENDER_NAME";
pub const DEFAULT_RECIPIENT_VAR: &str = "DEFAULT_RECIPIENT_EMAIL";

// --- Courier.toml ---

#[derive(Deserialize, Debug, Clone, Default)]
pub struct CourierFileConfig {
    #[serde(default)]
    pub completion: CompletionFileConfig,
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct CompletionFileConfig {
    pub model_name: Option<String>,
    pub endpoint: Option<String>,
    #[serde(default)]
    pub parameters: Option<toml::Value>,
}

impl CourierFileConfig {
    pub fn from_toml_str(content: &str) -> CourierResult<Self> {
        let config: CourierFileConfig = toml::from_str(content).map_err(|e| {
            tracing::error!(error = %e, "Failed to parse TOML content");
            CourierError::config(format!("Failed to parse {}: {}", CONFIG_FILENAME, e))
        })?;

        let completion = &config.completion;
        if let Some(model_name) = &completion.model_name {
            if model_name.trim().is_empty() {
                return Err(CourierError::config("'completion.model_name' is empty."));
            }
        }
        if let Some(endpoint) = &completion.endpoint {
            parse_endpoint("completion.endpoint", endpoint)?;
        }
        if let Some(params) = &completion.parameters {
            if !params.is_table() {
                return Err(CourierError::config(
                    "'completion.parameters' must be a TOML table.",
                ));
            }
        }
        Ok(config)
    }

    /// Looks for `Courier.toml` in `start` and each of its parents.
    pub fn discover(start: &Path) -> CourierResult<Option<(Self, PathBuf)>> {
        for dir in start.ancestors() {
            let candidate = dir.join(CONFIG_FILENAME);
            if candidate.is_file() {
                let content = fs::read_to_string(&candidate).map_err(|e| {
                    CourierError::config(format!("Failed to read {:?}: {}", candidate, e))
                })?;
                let config = Self::from_toml_str(&content)?;
                info!("Found configuration file at: {:?}", candidate);
                return Ok(Some((config, candidate)));
            }
        }
        debug!("No {} found above {:?}", CONFIG_FILENAME, start);
        Ok(None)
    }
}

// --- Runtime configuration ---

/// Everything needed to call the completion endpoint.
#[derive(Debug, Clone)]
pub struct CompletionConfig {
    pub api_key: String,
    pub endpoint: String,
    pub model_name: String,
    /// Extra top-level request keys, e.g. `temperature`. Always a table.
    pub parameters: toml::Value,
    pub timeout: Duration,
}

/// Everything needed to deliver a message through the email endpoint.
#[derive(Debug, Clone)]
pub struct EmailConfig {
    pub api_key: String,
    pub endpoint: String,
    pub sender_email: String,
    pub sender_name: String,
    pub default_recipient: Option<String>,
    pub timeout: Duration,
}

impl CompletionConfig {
    /// Resolves settings from `lookup`, then `file`, then built-in defaults.
    pub fn from_lookup<F>(lookup: F, file: Option<&CourierFileConfig>) -> CourierResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let file_completion = file.map(|f| &f.completion);
        let api_key = required(&lookup, COMPLETION_API_KEY_VAR)?;
        let endpoint = optional(&lookup, COMPLETION_ENDPOINT_VAR)
            .or_else(|| file_completion.and_then(|c| c.endpoint.clone()))
            .unwrap_or_else(|| DEFAULT_COMPLETION_ENDPOINT.to_string());
        parse_endpoint(COMPLETION_ENDPOINT_VAR, &endpoint)?;
        let model_name = optional(&lookup, MODEL_VAR)
            .or_else(|| file_completion.and_then(|c| c.model_name.clone()))
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());
        let parameters = file_completion
            .and_then(|c| c.parameters.clone())
            .unwrap_or_else(|| toml::Value::Table(Default::default()));

        Ok(Self {
            api_key,
            endpoint,
            model_name,
            parameters,
            timeout: timeout(&lookup)?,
        })
    }

    pub fn from_env(file: Option<&CourierFileConfig>) -> CourierResult<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok(), file)
    }
}

impl EmailConfig {
    pub fn from_lookup<F>(lookup: F) -> CourierResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = required(&lookup, EMAIL_API_KEY_VAR)?;
        let sender_email = required(&lookup, SENDER_EMAIL_VAR)?;
        let endpoint = optional(&lookup, EMAIL_ENDPOINT_VAR)
            .unwrap_or_else(|| DEFAULT_EMAIL_ENDPOINT.to_string());
        parse_endpoint(EMAIL_ENDPOINT_VAR, &endpoint)?;
        let sender_name =
            optional(&lookup, SENDER_NAME_VAR).unwrap_or_else(|| DEFAULT_SENDER_NAME.to_string());

        Ok(Self {
            api_key,
            endpoint,
            sender_email,
            sender_name,
            default_recipient: optional(&lookup, DEFAULT_RECIPIENT_VAR),
            timeout: timeout(&lookup)?,
        })
    }

    pub fn from_env() -> CourierResult<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }
}

fn optional<F>(lookup: &F, key: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn required<F>(lookup: &F, key: &str) -> CourierResult<String>
where
    F: Fn(&str) -> Option<String>,
{
    optional(lookup, key).ok_or_else(|| CourierError::config(format!("{} is not set.", key)))
}

fn timeout<F>(lookup: &F) -> CourierResult<Duration>
where
    F: Fn(&str) -> Option<String>,
{
    match optional(lookup, TIMEOUT_VAR) {
        None => Ok(Duration::from_secs(DEFAULT_TIMEOUT_SECS)),
        Some(raw) => raw
            .parse::<u64>()
            .ok()
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
            .ok_or_else(|| {
                CourierError::config(format!(
                    "{} must be a positive number of seconds, got '{}'.",
                    TIMEOUT_VAR, raw
                ))
            }),
    }
}

fn parse_endpoint(key: &str, endpoint: &str) -> CourierResult<()> {
    Url::parse(endpoint)
        .map(|_| ())
        .map_err(|e| CourierError::config(format!("Invalid URL for {} ('{}'): {}", key, endpoint, e)))
}
