// courier-core/src/tools/mod.rs

//! Local functions the model may call, and the boundary that turns a raw
//! [`ToolCall`] into typed arguments.
//!
//! Arguments are checked against the function's [`ToolDefinition`] before any
//! typed conversion: unknown fields and missing required fields are rejected
//! rather than defaulted.

pub mod calculator;
pub mod email;

use crate::errors::{CourierError, CourierResult};
use crate::models::tools::{ToolCall, ToolDefinition, ToolParameterType};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::{debug, warn};

pub use calculator::{CalculateArgs, Calculation, Operation};
pub use email::{EmailArgs, EmailMessage};

/// Validated arguments, one variant per supported function.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolArguments {
    SendEmail(EmailArgs),
    Calculate(CalculateArgs),
}

impl ToolArguments {
    pub fn function_name(&self) -> &'static str {
        match self {
            ToolArguments::SendEmail(_) => email::FUNCTION_NAME,
            ToolArguments::Calculate(_) => calculator::FUNCTION_NAME,
        }
    }

    /// Parses `call` against the one function in `allowed` that it names.
    pub fn parse(call: &ToolCall, allowed: &[ToolDefinition]) -> CourierResult<Self> {
        let name = call.function.name.as_str();
        let definition = allowed.iter().find(|d| d.name == name).ok_or_else(|| {
            warn!(function = %name, "Model called a function that was not offered.");
            CourierError::UnsupportedOperation(format!("function '{}' is not available", name))
        })?;

        let arguments = parse_arguments(&call.function.arguments)?;
        validate_arguments(definition, &arguments)?;
        debug!(function = %name, "Tool call arguments validated.");

        match name {
            email::FUNCTION_NAME => Ok(ToolArguments::SendEmail(typed(name, arguments)?)),
            calculator::FUNCTION_NAME => Ok(ToolArguments::Calculate(typed(name, arguments)?)),
            other => Err(CourierError::UnsupportedOperation(format!(
                "function '{}' has no local implementation",
                other
            ))),
        }
    }
}

/// Decodes the raw argument string. Anything but a JSON object is malformed.
pub fn parse_arguments(raw: &str) -> CourierResult<Map<String, Value>> {
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(CourierError::MalformedArguments(format!(
            "expected a JSON object, got: {}",
            other
        ))),
        Err(e) => Err(CourierError::MalformedArguments(format!(
            "{}. Arguments received: {}",
            e, raw
        ))),
    }
}

/// Checks `arguments` against `definition`.
///
/// Order matters: an out-of-set enum value (e.g. an unknown calculator
/// operation) is reported as unsupported before any other field is examined.
pub fn validate_arguments(
    definition: &ToolDefinition,
    arguments: &Map<String, Value>,
) -> CourierResult<()> {
    let schema = &definition.parameters;

    for (field, param) in &schema.properties {
        if let (Some(allowed), Some(Value::String(given))) =
            (&param.enum_values, arguments.get(field))
        {
            if !allowed.iter().any(|a| a == given) {
                return Err(CourierError::UnsupportedOperation(given.clone()));
            }
        }
    }

    if let Some(unknown) = arguments.keys().find(|k| !schema.properties.contains_key(*k)) {
        return Err(CourierError::validation(format!(
            "unknown field '{}' for '{}'",
            unknown, definition.name
        )));
    }

    for field in &schema.required {
        match arguments.get(field) {
            None | Some(Value::Null) => {
                return Err(CourierError::validation(format!(
                    "missing required field '{}' for '{}'",
                    field, definition.name
                )));
            }
            Some(_) => {}
        }
    }

    for (field, value) in arguments {
        if value.is_null() {
            continue;
        }
        // Unknown keys were rejected above.
        let Some(param) = schema.properties.get(field) else {
            continue;
        };
        if !matches_type(param.param_type, value) {
            return Err(CourierError::validation(format!(
                "field '{}' for '{}' must be of type {:?}, got {}",
                field, definition.name, param.param_type, value
            )));
        }
    }
    Ok(())
}

fn matches_type(expected: ToolParameterType, value: &Value) -> bool {
    match expected {
        ToolParameterType::String => value.is_string(),
        ToolParameterType::Integer => value.is_i64() || value.is_u64(),
        ToolParameterType::Number => value.is_number(),
        ToolParameterType::Boolean => value.is_boolean(),
        ToolParameterType::Array => value.is_array(),
        ToolParameterType::Object => value.is_object(),
    }
}

fn typed<T: DeserializeOwned>(name: &str, arguments: Map<String, Value>) -> CourierResult<T> {
    serde_json::from_value(Value::Object(arguments))
        .map_err(|e| CourierError::validation(format!("invalid arguments for '{}': {}", name, e)))
}
