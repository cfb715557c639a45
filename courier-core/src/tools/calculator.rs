// courier-core/src/tools/calculator.rs

//! The `calculate` function: nine fixed operations over one or two operands.

use crate::errors::{CourierError, CourierResult};
use crate::models::tools::{ToolDefinition, ToolParameter, ToolParameterType};
use serde::Deserialize;
use std::fmt;
use std::str::FromStr;

pub const FUNCTION_NAME: &str = "calculate";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Add,
    Subtract,
    Multiply,
    Divide,
    Power,
    Sqrt,
    Log,
    Sin,
    Cos,
}

impl Operation {
    pub const ALL: [Operation; 9] = [
        Operation::Add,
        Operation::Subtract,
        Operation::Multiply,
        Operation::Divide,
        Operation::Power,
        Operation::Sqrt,
        Operation::Log,
        Operation::Sin,
        Operation::Cos,
    ];

    pub fn symbol(self) -> &'static str {
        match self {
            Operation::Add => "add",
            Operation::Subtract => "subtract",
            Operation::Multiply => "multiply",
            Operation::Divide => "divide",
            Operation::Power => "power",
            Operation::Sqrt => "sqrt",
            Operation::Log => "log",
            Operation::Sin => "sin",
            Operation::Cos => "cos",
        }
    }

    /// Binary operations read `y`; unary ones ignore it.
    pub fn is_binary(self) -> bool {
        matches!(
            self,
            Operation::Add
                | Operation::Subtract
                | Operation::Multiply
                | Operation::Divide
                | Operation::Power
        )
    }
}

impl FromStr for Operation {
    type Err = CourierError;

    fn from_str(symbol: &str) -> Result<Self, Self::Err> {
        Operation::ALL
            .into_iter()
            .find(|op| op.symbol() == symbol)
            .ok_or_else(|| CourierError::UnsupportedOperation(symbol.to_string()))
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Outcome of a calculation: a number, or the reason there is none.
#[derive(Debug, Clone, PartialEq)]
pub enum Calculation {
    Value(f64),
    Undefined(String),
}

impl Calculation {
    pub fn value(&self) -> Option<f64> {
        match self {
            Calculation::Value(v) => Some(*v),
            Calculation::Undefined(_) => None,
        }
    }
}

impl fmt::Display for Calculation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Calculation::Value(v) if v.abs() >= 1e16 || (*v != 0.0 && v.abs() < 1e-4) => {
                f.write_str(&scientific(*v))
            }
            // Integral results keep a trailing ".0" ("4.0", not "4").
            Calculation::Value(v) if v.fract() == 0.0 => write!(f, "{:.1}", v),
            Calculation::Value(v) => write!(f, "{}", v),
            Calculation::Undefined(reason) => f.write_str(reason),
        }
    }
}

/// Exponent notation with an explicit sign and at least two exponent digits
/// (`1e+16`, `2.5e-05`).
fn scientific(v: f64) -> String {
    let formatted = format!("{:e}", v);
    match formatted.split_once('e') {
        Some((mantissa, exponent)) => {
            let (sign, digits) = match exponent.strip_prefix('-') {
                Some(digits) => ('-', digits),
                None => ('+', exponent),
            };
            format!("{}e{}{:0>2}", mantissa, sign, digits)
        }
        None => formatted,
    }
}

/// Typed arguments of a `calculate` tool call.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CalculateArgs {
    pub operation: Operation,
    pub x: f64,
    #[serde(default)]
    pub y: Option<f64>,
}

impl CalculateArgs {
    pub fn evaluate(&self) -> CourierResult<Calculation> {
        evaluate(self.operation, self.x, self.y)
    }
}

/// Evaluates `op`. A binary operation without `y` is a validation error;
/// division by zero, out-of-domain inputs and results that are not finite
/// yield [`Calculation::Undefined`].
pub fn evaluate(op: Operation, x: f64, y: Option<f64>) -> CourierResult<Calculation> {
    if op.is_binary() && y.is_none() {
        return Err(CourierError::validation(format!(
            "operation '{}' requires a second operand 'y'",
            op
        )));
    }
    let rhs = y.unwrap_or_default();
    let value = match op {
        Operation::Add => x + rhs,
        Operation::Subtract => x - rhs,
        Operation::Multiply => x * rhs,
        Operation::Divide if rhs == 0.0 => {
            return Ok(Calculation::Undefined("Division by zero".to_string()));
        }
        Operation::Divide => x / rhs,
        Operation::Power => x.powf(rhs),
        Operation::Sqrt if x < 0.0 => return Ok(domain_error()),
        Operation::Sqrt => x.sqrt(),
        Operation::Log if x <= 0.0 => return Ok(domain_error()),
        Operation::Log => x.ln(),
        Operation::Sin => x.sin(),
        Operation::Cos => x.cos(),
    };
    // NaN from a negative base with a fractional exponent, infinity from
    // overflow or a zero base with a negative exponent.
    if !value.is_finite() {
        return Ok(domain_error());
    }
    Ok(Calculation::Value(value))
}

fn domain_error() -> Calculation {
    Calculation::Undefined("Math domain error".to_string())
}

/// Parses `symbol` before looking at the operands.
pub fn calculate(symbol: &str, x: f64, y: Option<f64>) -> CourierResult<Calculation> {
    let op: Operation = symbol.parse()?;
    evaluate(op, x, y)
}

pub fn tool_definition() -> ToolDefinition {
    ToolDefinition::object(
        FUNCTION_NAME,
        "Perform mathematical calculations",
        vec![
            (
                "operation",
                ToolParameter::new(
                    ToolParameterType::String,
                    "Mathematical operation to perform",
                )
                .with_enum(Operation::ALL.iter().map(|op| op.symbol())),
            ),
            (
                "x",
                ToolParameter::new(ToolParameterType::Number, "First number for calculation"),
            ),
            (
                "y",
                ToolParameter::new(
                    ToolParameterType::Number,
                    "Second number for binary operations",
                ),
            ),
        ],
        &["operation", "x"],
    )
}
