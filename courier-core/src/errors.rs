// courier-core/src/errors.rs
use thiserror::Error;

/// Errors that can occur while dispatching a pipeline.
#[derive(Error, Debug)]
pub enum CourierError {
    /// A required credential or setting is missing or invalid.
    #[error("Configuration Error: {0}")]
    Configuration(String),

    /// Network failure or non-success response from the completion or delivery endpoint.
    #[error("Transport Error: {0:#}")]
    Transport(#[source] anyhow::Error),

    /// Tool-call arguments that are not a JSON object.
    #[error("Malformed Arguments: {0}")]
    MalformedArguments(String),

    /// A function or calculator operation this pipeline does not support.
    #[error("Unsupported operation: {0}")]
    UnsupportedOperation(String),

    /// Arguments that parse but violate the function's schema.
    #[error("Validation Error: {0}")]
    Validation(String),
}

impl CourierError {
    pub fn config(msg: impl Into<String>) -> Self {
        CourierError::Configuration(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        CourierError::Validation(msg.into())
    }

    pub fn transport(err: impl Into<anyhow::Error>) -> Self {
        CourierError::Transport(err.into())
    }
}

pub type CourierResult<T> = Result<T, CourierError>;

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;

    #[test]
    fn test_error_messages() {
        assert_eq!(
            CourierError::config("GROQ_API_KEY is not set").to_string(),
            "Configuration Error: GROQ_API_KEY is not set"
        );
        assert_eq!(
            CourierError::UnsupportedOperation("modulo".into()).to_string(),
            "Unsupported operation: modulo"
        );
        let transport = CourierError::transport(anyhow!("API error: 500 - boom"));
        assert_eq!(transport.to_string(), "Transport Error: API error: 500 - boom");
    }
}
