//! Calculator module for evaluating keypad arithmetic.
//!
//! This module provides functionality to:
//! - Normalize operator glyphs to their ASCII forms
//! - Parse and evaluate expressions with standard precedence
//! - Track keypad entry state for the calculator panel

mod evaluation;
mod keypad;
mod normalize;
mod parser;

pub use evaluation::{EvalError, evaluate, evaluate_value, format_result};
pub use keypad::{Key, KeyOutcome, Keypad, OperatorKey};
pub use normalize::{is_keypad_input, normalize_glyphs};
pub use parser::{BinaryOp, Expr, parse};
