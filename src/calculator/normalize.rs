//! Input normalization for the calculator.
//!
//! The keypad and pasted text may use typographic operator glyphs. These are
//! rewritten to the canonical ASCII operators before tokenizing.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Alternate multiplication glyphs.
    static ref MULTIPLY_GLYPHS: Regex = Regex::new(r"[×✕✖·]").unwrap();

    /// Alternate division glyphs.
    static ref DIVIDE_GLYPHS: Regex = Regex::new(r"[÷∕]").unwrap();

    /// Matches strings made only of characters the keypad can produce.
    static ref KEYPAD_CHARS: Regex = Regex::new(r"^[\d\s\.\+\-\*/%()]*$").unwrap();
}

/// Rewrite alternate operator glyphs to `*`, `/` and `-`.
pub fn normalize_glyphs(input: &str) -> String {
    let multiplied = MULTIPLY_GLYPHS.replace_all(input, "*");
    let divided = DIVIDE_GLYPHS.replace_all(&multiplied, "/");
    divided.replace('−', "-")
}

/// Check whether normalized input uses only the keypad alphabet.
///
/// This is a fast pre-check; the parser still validates structure.
pub fn is_keypad_input(input: &str) -> bool {
    KEYPAD_CHARS.is_match(&normalize_glyphs(input))
}
