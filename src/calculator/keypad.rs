//! Keypad entry state for the calculator panel.
//!
//! Tracks what the display shows and the expression being built, including
//! the "continue from the last result" behaviour after `=`.

use std::fmt;

use super::evaluation::{EvalError, evaluate};

/// A binary operator key.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OperatorKey {
    Add,
    Subtract,
    Multiply,
    Divide,
    Remainder,
}

impl OperatorKey {
    pub fn symbol(self) -> char {
        match self {
            Self::Add => '+',
            Self::Subtract => '-',
            Self::Multiply => '*',
            Self::Divide => '/',
            Self::Remainder => '%',
        }
    }
}

/// A key on the calculator keypad.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Key {
    Digit(u8),
    Dot,
    Operator(OperatorKey),
    OpenParen,
    CloseParen,
    Clear,
    Equals,
}

impl Key {
    /// Map a typed character to a key. Returns `None` for anything the
    /// keypad does not have.
    pub fn from_char(c: char) -> Option<Self> {
        let key = match c {
            '0'..='9' => Self::Digit(c as u8 - b'0'),
            '.' => Self::Dot,
            '+' => Self::Operator(OperatorKey::Add),
            '-' | '−' => Self::Operator(OperatorKey::Subtract),
            '*' | '×' => Self::Operator(OperatorKey::Multiply),
            '/' | '÷' => Self::Operator(OperatorKey::Divide),
            '%' => Self::Operator(OperatorKey::Remainder),
            '(' => Self::OpenParen,
            ')' => Self::CloseParen,
            'C' | 'c' => Self::Clear,
            '=' => Self::Equals,
            _ => return None,
        };
        Some(key)
    }

    /// The character this key appends to the expression, if any.
    fn input_char(self) -> Option<char> {
        match self {
            Self::Digit(d) => char::from_digit(u32::from(d), 10),
            Self::Dot => Some('.'),
            Self::Operator(op) => Some(op.symbol()),
            Self::OpenParen => Some('('),
            Self::CloseParen => Some(')'),
            Self::Clear | Self::Equals => None,
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Clear => write!(f, "C"),
            Self::Equals => write!(f, "="),
            other => match other.input_char() {
                Some(c) => write!(f, "{}", c),
                None => Ok(()),
            },
        }
    }
}

/// What happened after a key press.
#[derive(Clone, Debug, PartialEq)]
pub enum KeyOutcome {
    /// Display and expression changed; nothing to record.
    Updated,
    /// `=` produced a result that should be recorded.
    Calculated { expression: String, result: String },
    /// `=` failed; the display shows [`EvalError::DISPLAY`].
    Failed(EvalError),
}

#[derive(Clone, Debug)]
pub struct Keypad {
    display: String,
    expression: String,
    has_calculated: bool,
    errored: bool,
}

impl Default for Keypad {
    fn default() -> Self {
        Self {
            display: "0".to_string(),
            expression: String::new(),
            has_calculated: false,
            errored: false,
        }
    }
}

impl Keypad {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn display(&self) -> &str {
        &self.display
    }

    pub fn expression(&self) -> &str {
        &self.expression
    }

    pub fn press(&mut self, key: Key) -> KeyOutcome {
        match key {
            Key::Clear => {
                self.clear();
                KeyOutcome::Updated
            }
            Key::Equals => self.calculate(),
            other => {
                if let Some(c) = other.input_char() {
                    self.input(c, matches!(other, Key::Operator(_)));
                }
                KeyOutcome::Updated
            }
        }
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    fn input(&mut self, c: char, is_operator: bool) {
        if self.errored {
            self.clear();
        }

        if self.has_calculated {
            if is_operator {
                self.expression = format!("{} {} ", self.display, c);
                self.display = "0".to_string();
            } else {
                self.expression = c.to_string();
                self.display = c.to_string();
            }
            self.has_calculated = false;
            return;
        }

        if self.display == "0" && c != '.' && !is_operator {
            self.display = c.to_string();
        } else {
            self.display.push(c);
        }
        self.expression.push(c);
    }

    fn calculate(&mut self) -> KeyOutcome {
        // Repeating `=` on a shown result does not record it again.
        if self.has_calculated {
            return KeyOutcome::Updated;
        }

        match evaluate(&self.expression) {
            Ok(result) => {
                self.display = result.clone();
                self.has_calculated = true;
                KeyOutcome::Calculated {
                    expression: self.expression.clone(),
                    result,
                }
            }
            Err(err) => {
                self.display = EvalError::DISPLAY.to_string();
                self.errored = true;
                KeyOutcome::Failed(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn type_keys(keypad: &mut Keypad, keys: &str) -> KeyOutcome {
        let mut last = KeyOutcome::Updated;
        for c in keys.chars() {
            last = keypad.press(Key::from_char(c).unwrap());
        }
        last
    }

    #[test]
    fn test_digits_replace_initial_zero() {
        let mut keypad = Keypad::new();
        type_keys(&mut keypad, "12");
        assert_eq!(keypad.display(), "12");
        assert_eq!(keypad.expression(), "12");
    }

    #[test]
    fn test_calculate_records_pair() {
        let mut keypad = Keypad::new();
        let outcome = type_keys(&mut keypad, "2+3*4=");
        assert_eq!(
            outcome,
            KeyOutcome::Calculated {
                expression: "2+3*4".to_string(),
                result: "14".to_string(),
            }
        );
        assert_eq!(keypad.display(), "14");
    }

    #[test]
    fn test_operator_continues_from_result() {
        let mut keypad = Keypad::new();
        type_keys(&mut keypad, "6*7=");
        type_keys(&mut keypad, "-2");
        assert_eq!(keypad.expression(), "42 - 2");
        assert_eq!(keypad.display(), "2");

        let outcome = keypad.press(Key::Equals);
        assert_eq!(
            outcome,
            KeyOutcome::Calculated {
                expression: "42 - 2".to_string(),
                result: "40".to_string(),
            }
        );
    }

    #[test]
    fn test_digit_after_result_starts_fresh() {
        let mut keypad = Keypad::new();
        type_keys(&mut keypad, "1+1=");
        type_keys(&mut keypad, "9");
        assert_eq!(keypad.expression(), "9");
        assert_eq!(keypad.display(), "9");
    }

    #[test]
    fn test_repeated_equals_is_ignored() {
        let mut keypad = Keypad::new();
        type_keys(&mut keypad, "1+1=");
        assert_eq!(keypad.press(Key::Equals), KeyOutcome::Updated);
        assert_eq!(keypad.display(), "2");
    }

    #[test]
    fn test_failure_shows_error_then_restarts() {
        let mut keypad = Keypad::new();
        let outcome = type_keys(&mut keypad, "5/0=");
        assert_eq!(outcome, KeyOutcome::Failed(EvalError::DivisionByZero));
        assert_eq!(keypad.display(), "Error");

        type_keys(&mut keypad, "3");
        assert_eq!(keypad.display(), "3");
        assert_eq!(keypad.expression(), "3");
    }

    #[test]
    fn test_empty_equals_fails() {
        let mut keypad = Keypad::new();
        assert!(matches!(
            keypad.press(Key::Equals),
            KeyOutcome::Failed(EvalError::Syntax { .. })
        ));
    }

    #[test]
    fn test_clear() {
        let mut keypad = Keypad::new();
        type_keys(&mut keypad, "(1+2");
        keypad.press(Key::Clear);
        assert_eq!(keypad.display(), "0");
        assert_eq!(keypad.expression(), "");
    }

    #[test]
    fn test_key_mapping() {
        assert_eq!(Key::from_char('×'), Some(Key::Operator(OperatorKey::Multiply)));
        assert_eq!(Key::from_char('÷'), Some(Key::Operator(OperatorKey::Divide)));
        assert_eq!(Key::from_char('7'), Some(Key::Digit(7)));
        assert_eq!(Key::from_char('x'), None);
        assert_eq!(Key::Digit(7).to_string(), "7");
        assert_eq!(Key::Equals.to_string(), "=");
    }
}
