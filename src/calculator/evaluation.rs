//! Expression evaluation over the parsed AST.
//!
//! Input is normalized, parsed in full, then evaluated. A malformed
//! expression is always reported as a syntax error, even when it would also
//! divide by zero.

use thiserror::Error;

use super::normalize::normalize_glyphs;
use super::parser::{BinaryOp, Expr, parse};

/// Why an expression could not be evaluated.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum EvalError {
    #[error("syntax error at {position}: {reason}")]
    Syntax { position: usize, reason: String },

    #[error("division by zero")]
    DivisionByZero,

    #[error("result is not a finite number")]
    NonFiniteResult,
}

impl EvalError {
    /// What the keypad shows for any evaluation failure.
    pub const DISPLAY: &'static str = "Error";
}

/// Evaluate a keypad expression and format the result for display.
pub fn evaluate(input: &str) -> Result<String, EvalError> {
    evaluate_value(input).map(format_result)
}

/// Evaluate a keypad expression to its numeric value.
pub fn evaluate_value(input: &str) -> Result<f64, EvalError> {
    let normalized = normalize_glyphs(input);
    let expr = parse(&normalized)?;
    eval(&expr)
}

fn finite(value: f64) -> Result<f64, EvalError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(EvalError::NonFiniteResult)
    }
}

fn eval(expr: &Expr) -> Result<f64, EvalError> {
    match expr {
        Expr::Number(value) => finite(*value),
        Expr::Negate(inner) => Ok(-eval(inner)?),
        Expr::Binary { op, lhs, rhs } => {
            let lhs = eval(lhs)?;
            let rhs = eval(rhs)?;
            let value = match op {
                BinaryOp::Add => lhs + rhs,
                BinaryOp::Subtract => lhs - rhs,
                BinaryOp::Multiply => lhs * rhs,
                BinaryOp::Divide | BinaryOp::Remainder if rhs == 0.0 => {
                    return Err(EvalError::DivisionByZero);
                }
                BinaryOp::Divide => lhs / rhs,
                BinaryOp::Remainder => lhs % rhs,
            };
            finite(value)
        }
    }
}

/// Format a finite value with the shortest round-trip representation.
pub fn format_result(value: f64) -> String {
    // Negative zero displays as plain zero.
    if value == 0.0 {
        return "0".to_string();
    }
    value.to_string()
}
