//! Tokenizer and recursive-descent parser for keypad arithmetic.
//!
//! Precedence levels, tightest first:
//! - `primary`: numbers and parenthesized groups
//! - `unary`: a sign, only at the start of an expression or after `(`
//! - `term`: `*`, `/`, `%`
//! - `expr`: `+`, `-`
//!
//! Equal precedence associates to the left.

use super::evaluation::EvalError;

/// Deepest allowed parenthesis nesting.
pub const MAX_DEPTH: usize = 256;

/// Longest accepted token stream. Binary chains nest the tree one level per
/// operator, so this bounds evaluation depth for unparenthesized input.
pub const MAX_TOKENS: usize = 1024;

/// A binary arithmetic operator.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Subtract,
    Multiply,
    Divide,
    Remainder,
}

/// Parsed arithmetic expression.
#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    Number(f64),
    Negate(Box<Expr>),
    Binary {
        op: BinaryOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
}

#[derive(Clone, Debug, PartialEq)]
enum TokenKind {
    Number(f64),
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    OpenParen,
    CloseParen,
}

#[derive(Clone, Debug)]
struct Token {
    kind: TokenKind,
    position: usize,
}

fn syntax(position: usize, reason: impl Into<String>) -> EvalError {
    EvalError::Syntax {
        position,
        reason: reason.into(),
    }
}

fn tokenize(input: &str) -> Result<Vec<Token>, EvalError> {
    let mut tokens = Vec::new();
    let mut chars = input.char_indices().peekable();

    while let Some(&(position, c)) = chars.peek() {
        let kind = match c {
            c if c.is_whitespace() => {
                chars.next();
                continue;
            }
            '0'..='9' | '.' => {
                let mut end = position;
                while let Some(&(idx, d)) = chars.peek() {
                    if d.is_ascii_digit() || d == '.' {
                        end = idx + d.len_utf8();
                        chars.next();
                    } else {
                        break;
                    }
                }
                tokens.push(Token {
                    kind: TokenKind::Number(parse_number(&input[position..end], position)?),
                    position,
                });
                continue;
            }
            '+' => TokenKind::Plus,
            '-' => TokenKind::Minus,
            '*' => TokenKind::Star,
            '/' => TokenKind::Slash,
            '%' => TokenKind::Percent,
            '(' => TokenKind::OpenParen,
            ')' => TokenKind::CloseParen,
            other => return Err(syntax(position, format!("unexpected character '{}'", other))),
        };
        chars.next();
        tokens.push(Token { kind, position });
    }

    Ok(tokens)
}

/// Parse a numeric literal. Accepts `5`, `5.25`, `.5` and `5.`.
fn parse_number(text: &str, position: usize) -> Result<f64, EvalError> {
    if text.matches('.').count() > 1 {
        return Err(syntax(position, format!("malformed number '{}'", text)));
    }
    if text == "." {
        return Err(syntax(position, "decimal point without digits"));
    }

    let mut literal = String::with_capacity(text.len() + 2);
    if text.starts_with('.') {
        literal.push('0');
    }
    literal.push_str(text);
    if text.ends_with('.') {
        literal.push('0');
    }

    literal
        .parse::<f64>()
        .map_err(|_| syntax(position, format!("malformed number '{}'", text)))
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    end: usize,
    depth: usize,
}

impl Parser {
    fn peek(&self) -> Option<&TokenKind> {
        self.tokens.get(self.pos).map(|t| &t.kind)
    }

    fn position(&self) -> usize {
        self.tokens.get(self.pos).map_or(self.end, |t| t.position)
    }

    fn advance(&mut self) {
        self.pos += 1;
    }

    fn parse_expr(&mut self) -> Result<Expr, EvalError> {
        let mut lhs = self.parse_term(true)?;

        loop {
            let op = match self.peek() {
                Some(TokenKind::Plus) => BinaryOp::Add,
                Some(TokenKind::Minus) => BinaryOp::Subtract,
                _ => return Ok(lhs),
            };
            self.advance();
            let rhs = self.parse_term(false)?;
            lhs = Expr::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            };
        }
    }

    fn parse_term(&mut self, allow_sign: bool) -> Result<Expr, EvalError> {
        let mut lhs = self.parse_unary(allow_sign)?;

        loop {
            let op = match self.peek() {
                Some(TokenKind::Star) => BinaryOp::Multiply,
                Some(TokenKind::Slash) => BinaryOp::Divide,
                Some(TokenKind::Percent) => BinaryOp::Remainder,
                _ => return Ok(lhs),
            };
            self.advance();
            let rhs = self.parse_unary(false)?;
            lhs = Expr::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            };
        }
    }

    fn parse_unary(&mut self, allow_sign: bool) -> Result<Expr, EvalError> {
        let negate = match self.peek() {
            Some(TokenKind::Minus) => true,
            Some(TokenKind::Plus) => false,
            _ => return self.parse_primary(),
        };

        if !allow_sign {
            return Err(syntax(self.position(), "operator follows another operator"));
        }
        self.advance();

        let operand = self.parse_primary()?;
        if negate {
            Ok(Expr::Negate(Box::new(operand)))
        } else {
            Ok(operand)
        }
    }

    fn parse_primary(&mut self) -> Result<Expr, EvalError> {
        let position = self.position();

        match self.peek().cloned() {
            Some(TokenKind::Number(value)) => {
                self.advance();
                Ok(Expr::Number(value))
            }
            Some(TokenKind::OpenParen) => {
                self.advance();
                if self.peek() == Some(&TokenKind::CloseParen) {
                    return Err(syntax(position, "empty parentheses"));
                }
                if self.depth == MAX_DEPTH {
                    return Err(syntax(position, "expression nested too deeply"));
                }
                self.depth += 1;
                let inner = self.parse_expr()?;
                self.depth -= 1;
                match self.peek() {
                    Some(TokenKind::CloseParen) => {
                        self.advance();
                        Ok(inner)
                    }
                    Some(_) => Err(syntax(self.position(), "missing operator")),
                    None => Err(syntax(position, "unclosed '('")),
                }
            }
            Some(TokenKind::CloseParen) => Err(syntax(position, "unexpected ')'")),
            Some(_) => Err(syntax(position, "operator follows another operator")),
            None if self.tokens.is_empty() => Err(syntax(position, "empty expression")),
            None => Err(syntax(position, "expression ends with an operator")),
        }
    }
}

/// Parse a normalized expression into an AST.
pub fn parse(input: &str) -> Result<Expr, EvalError> {
    let tokens = tokenize(input)?;
    if let Some(token) = tokens.get(MAX_TOKENS) {
        return Err(syntax(token.position, "expression too long"));
    }

    let mut parser = Parser {
        tokens,
        pos: 0,
        end: input.len(),
        depth: 0,
    };

    let expr = parser.parse_expr()?;

    match parser.peek() {
        None => Ok(expr),
        Some(TokenKind::CloseParen) => Err(syntax(parser.position(), "unbalanced ')'")),
        Some(_) => Err(syntax(parser.position(), "missing operator")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn num(v: f64) -> Box<Expr> {
        Box::new(Expr::Number(v))
    }

    fn reason(input: &str) -> String {
        match parse(input) {
            Err(EvalError::Syntax { reason, .. }) => reason,
            other => panic!("expected syntax error for {:?}, got {:?}", input, other),
        }
    }

    #[test]
    fn test_precedence_shape() {
        let expr = parse("2 + 3 * 4").unwrap();
        assert_eq!(
            expr,
            Expr::Binary {
                op: BinaryOp::Add,
                lhs: num(2.0),
                rhs: Box::new(Expr::Binary {
                    op: BinaryOp::Multiply,
                    lhs: num(3.0),
                    rhs: num(4.0),
                }),
            }
        );
    }

    #[test]
    fn test_left_associative() {
        let expr = parse("8 - 3 - 2").unwrap();
        assert_eq!(
            expr,
            Expr::Binary {
                op: BinaryOp::Subtract,
                lhs: Box::new(Expr::Binary {
                    op: BinaryOp::Subtract,
                    lhs: num(8.0),
                    rhs: num(3.0),
                }),
                rhs: num(2.0),
            }
        );
    }

    #[test]
    fn test_number_forms() {
        assert_eq!(parse(".5").unwrap(), Expr::Number(0.5));
        assert_eq!(parse("5.").unwrap(), Expr::Number(5.0));
        assert_eq!(parse("  12.25 ").unwrap(), Expr::Number(12.25));
    }

    #[test]
    fn test_sign_placement() {
        assert!(parse("-5 + 3").is_ok());
        assert!(parse("2 * (-3)").is_ok());
        assert!(parse("+4").is_ok());
        assert_eq!(reason("2 * -3"), "operator follows another operator");
        assert_eq!(reason("--3"), "operator follows another operator");
    }

    #[test]
    fn test_malformed_input() {
        assert_eq!(reason(""), "empty expression");
        assert_eq!(reason("   "), "empty expression");
        assert_eq!(reason("(1 + 2"), "unclosed '('");
        assert_eq!(reason("1 + 2)"), "unbalanced ')'");
        assert_eq!(reason("1 +"), "expression ends with an operator");
        assert_eq!(reason("2 +* 3"), "operator follows another operator");
        assert_eq!(reason("()"), "empty parentheses");
        assert_eq!(reason("2 (3)"), "missing operator");
        assert_eq!(reason("2 3"), "missing operator");
        assert_eq!(reason("1.2.3"), "malformed number '1.2.3'");
        assert_eq!(reason("."), "decimal point without digits");
        assert_eq!(reason("2 ^ 3"), "unexpected character '^'");
    }

    #[test]
    fn test_nesting_limit() {
        let inside = format!("{}1{}", "(".repeat(MAX_DEPTH), ")".repeat(MAX_DEPTH));
        assert_eq!(parse(&inside).unwrap(), Expr::Number(1.0));

        let outside = format!("({})", inside);
        assert_eq!(reason(&outside), "expression nested too deeply");
    }

    #[test]
    fn test_length_limit() {
        let chain = vec!["1"; MAX_TOKENS / 2].join("+");
        assert!(parse(&chain).is_ok());

        let chain = vec!["1"; MAX_TOKENS].join("+");
        assert_eq!(reason(&chain), "expression too long");
    }

    #[test]
    fn test_error_position() {
        match parse("12 + x") {
            Err(EvalError::Syntax { position, .. }) => assert_eq!(position, 5),
            other => panic!("unexpected {:?}", other),
        }
    }
}
